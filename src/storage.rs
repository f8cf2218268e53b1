//! Script and settings storage.
//!
//! The prompter core only depends on the two traits defined here; the
//! filesystem library below is the default implementation. Projects are
//! directories under a library root, scripts are `.html` files inside a
//! project, and the per-project settings snapshot lives in `settings.json`.

use std::path::{Path, PathBuf};

use fs_err as fs;
use tracing::debug;
use walkdir::WalkDir;

use crate::content::ScriptContent;
use crate::error::{Error, Result};
use crate::presentation::SettingsSnapshot;
use crate::types::{ProjectId, ScriptId};

/// Script content persistence contract.
pub trait ScriptStore {
    /// Fetch the current content of a script.
    fn load_script(&self, project: &ProjectId, script: &ScriptId) -> Result<ScriptContent>;

    /// Persist a script revision, replacing the stored content.
    fn save_script(
        &self,
        project: &ProjectId,
        script: &ScriptId,
        content: &ScriptContent,
    ) -> Result<()>;
}

/// Per-project presentation settings persistence contract.
pub trait SettingsStore {
    /// Load the persisted snapshot, `None` when nothing was saved yet.
    fn load_settings(&self, project: &ProjectId) -> Result<Option<SettingsSnapshot>>;

    /// Write the full snapshot, replacing the previous one.
    fn save_settings(&self, project: &ProjectId, snapshot: &SettingsSnapshot) -> Result<()>;

    /// Remove the persisted snapshot (settings reset).
    fn clear_settings(&self, project: &ProjectId) -> Result<()>;
}

/// Filename of the per-project settings snapshot.
const SETTINGS_FILE: &str = "settings.json";

/// Extension of script files.
const SCRIPT_EXT: &str = "html";

/// Filesystem-backed project library.
#[derive(Debug, Clone)]
pub struct FsLibrary {
    root: PathBuf,
}

impl FsLibrary {
    /// Open (creating if needed) a library rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Library root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List project directories in name order.
    pub fn list_projects(&self) -> Result<Vec<ProjectId>> {
        let mut projects = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| Error::storage(e.to_string()))?;
            if entry.file_type().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    projects.push(ProjectId::new(name));
                }
            }
        }
        projects.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(projects)
    }

    /// List a project's scripts in name order.
    pub fn list_scripts(&self, project: &ProjectId) -> Result<Vec<ScriptId>> {
        let dir = self.project_dir(project);
        if !dir.is_dir() {
            return Err(Error::storage_hint(
                format!("project {project} not found"),
                "Create the project first",
            ));
        }
        let mut scripts = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| Error::storage(e.to_string()))?;
            let path = entry.path();
            if entry.file_type().is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(SCRIPT_EXT)
            {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    scripts.push(ScriptId::new(stem));
                }
            }
        }
        scripts.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(scripts)
    }

    /// Create a new empty project directory.
    pub fn create_project(&self, project: &ProjectId) -> Result<()> {
        fs::create_dir_all(self.project_dir(project))?;
        debug!(%project, "created project");
        Ok(())
    }

    /// Delete a project and everything in it.
    pub fn delete_project(&self, project: &ProjectId) -> Result<()> {
        fs::remove_dir_all(self.project_dir(project))?;
        Ok(())
    }

    /// Create a new empty script in a project.
    pub fn create_script(&self, project: &ProjectId, script: &ScriptId) -> Result<()> {
        let path = self.script_path(project, script);
        if path.exists() {
            return Err(Error::storage(format!("script {script} already exists")));
        }
        fs::create_dir_all(self.project_dir(project))?;
        fs::write(path, "")?;
        Ok(())
    }

    /// Rename a script within its project.
    pub fn rename_script(&self, project: &ProjectId, from: &ScriptId, to: &ScriptId) -> Result<()> {
        let from_path = self.script_path(project, from);
        let to_path = self.script_path(project, to);
        if to_path.exists() {
            return Err(Error::storage(format!("script {to} already exists")));
        }
        fs::rename(from_path, to_path)?;
        Ok(())
    }

    /// Delete a script file.
    pub fn delete_script(&self, project: &ProjectId, script: &ScriptId) -> Result<()> {
        fs::remove_file(self.script_path(project, script))?;
        Ok(())
    }

    fn project_dir(&self, project: &ProjectId) -> PathBuf {
        self.root.join(project.as_str())
    }

    fn script_path(&self, project: &ProjectId, script: &ScriptId) -> PathBuf {
        self.project_dir(project)
            .join(format!("{}.{SCRIPT_EXT}", script.as_str()))
    }

    fn settings_path(&self, project: &ProjectId) -> PathBuf {
        self.project_dir(project).join(SETTINGS_FILE)
    }
}

impl ScriptStore for FsLibrary {
    fn load_script(&self, project: &ProjectId, script: &ScriptId) -> Result<ScriptContent> {
        let path = self.script_path(project, script);
        let markup = fs::read_to_string(&path).map_err(|e| Error::io(e, path.clone()))?;
        ScriptContent::from_markup(&markup)
            .map_err(|e| Error::parse(e.to_string(), path))
    }

    fn save_script(
        &self,
        project: &ProjectId,
        script: &ScriptId,
        content: &ScriptContent,
    ) -> Result<()> {
        let path = self.script_path(project, script);
        fs::create_dir_all(self.project_dir(project))?;
        fs::write(&path, content.to_markup()).map_err(|e| Error::io(e, path))?;
        Ok(())
    }
}

impl SettingsStore for FsLibrary {
    fn load_settings(&self, project: &ProjectId) -> Result<Option<SettingsSnapshot>> {
        let path = self.settings_path(project);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path).map_err(|e| Error::io(e, path))?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn save_settings(&self, project: &ProjectId, snapshot: &SettingsSnapshot) -> Result<()> {
        let path = self.settings_path(project);
        fs::create_dir_all(self.project_dir(project))?;
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&path, json).map_err(|e| Error::io(e, path))?;
        Ok(())
    }

    fn clear_settings(&self, project: &ProjectId) -> Result<()> {
        let path = self.settings_path(project);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| Error::io(e, path))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use tempfile::TempDir;

    fn library() -> (TempDir, FsLibrary) {
        let dir = TempDir::new().unwrap();
        let lib = FsLibrary::open(dir.path()).unwrap();
        (dir, lib)
    }

    #[test]
    fn test_script_round_trip() {
        let (_dir, lib) = library();
        let project = ProjectId::new("sermon");
        let script = ScriptId::new("sunday");
        let content = ScriptContent::from_markup("<h1>Title</h1>\n<p>Body</p>").unwrap();

        lib.save_script(&project, &script, &content).unwrap();
        let loaded = lib.load_script(&project, &script).unwrap();
        assert_eq!(loaded, content);
    }

    #[test]
    fn test_load_missing_script_fails() {
        let (_dir, lib) = library();
        let result = lib.load_script(&ProjectId::new("nope"), &ScriptId::new("missing"));
        assert!(result.is_err());
    }

    #[test]
    fn test_list_projects_and_scripts_sorted() {
        let (_dir, lib) = library();
        for name in ["zeta", "alpha"] {
            lib.create_project(&ProjectId::new(name)).unwrap();
        }
        let projects = lib.list_projects().unwrap();
        assert_eq!(projects[0].as_str(), "alpha");
        assert_eq!(projects[1].as_str(), "zeta");

        let project = ProjectId::new("alpha");
        lib.create_script(&project, &ScriptId::new("b-script")).unwrap();
        lib.create_script(&project, &ScriptId::new("a-script")).unwrap();
        let scripts = lib.list_scripts(&project).unwrap();
        assert_eq!(scripts[0].as_str(), "a-script");
    }

    #[test]
    fn test_settings_absent_then_saved_then_cleared() {
        let (_dir, lib) = library();
        let project = ProjectId::new("talk");
        lib.create_project(&project).unwrap();

        assert!(lib.load_settings(&project).unwrap().is_none());

        let snapshot = SettingsSnapshot { font_size: Some(3.0), ..Default::default() };
        lib.save_settings(&project, &snapshot).unwrap();
        let loaded = lib.load_settings(&project).unwrap().unwrap();
        assert_eq!(loaded.font_size, Some(3.0));
        assert!(loaded.speed.is_none());

        lib.clear_settings(&project).unwrap();
        assert!(lib.load_settings(&project).unwrap().is_none());
    }

    #[test]
    fn test_clear_settings_is_idempotent() {
        let (_dir, lib) = library();
        let project = ProjectId::new("talk");
        lib.create_project(&project).unwrap();
        lib.clear_settings(&project).unwrap();
        lib.clear_settings(&project).unwrap();
    }

    #[test]
    fn test_rename_script_refuses_overwrite() {
        let (_dir, lib) = library();
        let project = ProjectId::new("p");
        lib.create_script(&project, &ScriptId::new("one")).unwrap();
        lib.create_script(&project, &ScriptId::new("two")).unwrap();

        let result = lib.rename_script(&project, &ScriptId::new("one"), &ScriptId::new("two"));
        assert!(result.is_err());
    }
}
