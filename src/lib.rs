//! `Prompterm` - a terminal teleprompter.
//!
//! This crate renders scripts in a scrolling or notecard-style prompter view,
//! with live editing, per-project settings, and an optional mirror feed for a
//! secondary display.

// Re-export public modules for use in integration tests and as a library
pub mod app;
pub mod autoscroll;
pub mod config;
pub mod constants;
pub mod content;
pub mod error;
pub mod input;
pub mod measure;
pub mod mirror;
pub mod pagination;
pub mod presentation;
pub mod storage;
pub mod sync;
pub mod types;
pub mod ui;
