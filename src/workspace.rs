use chrono::Local;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::WorkspaceConfig;
use crate::error::ChefError;
use crate::merge::{self, MERGED_FILE_NAME, SHOPPING_LIST_FILE_NAME};

/// The temp directory holding a run's working files, and the trash
/// directory they are archived to afterwards
#[derive(Debug, Clone)]
pub struct Workspace {
    temp_dir: PathBuf,
    trash_dir: PathBuf,
}

impl Workspace {
    pub fn new(config: &WorkspaceConfig) -> Self {
        Self {
            temp_dir: config.temp_dir.clone(),
            trash_dir: config.trash_dir.clone(),
        }
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    pub fn trash_dir(&self) -> &Path {
        &self.trash_dir
    }

    /// Create both directories if they do not exist yet
    pub fn ensure(&self) -> Result<(), ChefError> {
        for dir in [&self.temp_dir, &self.trash_dir] {
            if !dir.is_dir() {
                fs::create_dir_all(dir)?;
                info!("Created directory {}", dir.display());
            }
        }
        Ok(())
    }

    /// Move every file in the temp directory to the trash directory with a
    /// timestamp added to its name. Returns how many files were moved.
    pub fn archive(&self) -> Result<usize, ChefError> {
        if !self.temp_dir.is_dir() {
            return Ok(0);
        }
        fs::create_dir_all(&self.trash_dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.temp_dir)? {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        for source in &files {
            let target = self.archive_target(source, &timestamp);
            move_file(source, &target)?;
            debug!("Archived {} to {}", source.display(), target.display());
        }

        info!(
            "Moved {} files from {} to {}",
            files.len(),
            self.temp_dir.display(),
            self.trash_dir.display()
        );
        Ok(files.len())
    }

    /// `<stem>_<timestamp><.ext>` in the trash directory, with a counter
    /// appended to the stem when that name is taken
    fn archive_target(&self, source: &Path, timestamp: &str) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = source
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let mut target = self
            .trash_dir
            .join(format!("{}_{}{}", stem, timestamp, extension));
        let mut counter = 1;
        while target.exists() {
            target = self
                .trash_dir
                .join(format!("{}_{}_{}{}", stem, timestamp, counter, extension));
            counter += 1;
        }
        target
    }

    /// Per-recipe documents in the temp directory, in name order
    pub fn recipe_files(&self) -> Result<Vec<PathBuf>, ChefError> {
        if !self.temp_dir.is_dir() {
            return Ok(Vec::new());
        }
        merge::recipe_files(&self.temp_dir)
    }

    pub fn recipe_text_path(&self, slug: &str) -> PathBuf {
        self.temp_dir.join(format!("{}.txt", slug))
    }

    pub fn recipe_path(&self, slug: &str) -> PathBuf {
        self.temp_dir.join(format!("{}.json", slug))
    }

    pub fn merged_path(&self) -> PathBuf {
        self.temp_dir.join(MERGED_FILE_NAME)
    }

    pub fn shopping_list_path(&self) -> PathBuf {
        self.temp_dir.join(SHOPPING_LIST_FILE_NAME)
    }
}

/// Rename, or copy and delete when the directories are on different devices
fn move_file(source: &Path, target: &Path) -> Result<(), ChefError> {
    if fs::rename(source, target).is_err() {
        fs::copy(source, target)?;
        fs::remove_file(source)?;
    }
    Ok(())
}
