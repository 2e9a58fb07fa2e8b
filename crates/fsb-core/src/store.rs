use std::fs;
use std::path::PathBuf;

use log::{info, warn};
use serde::Serialize;
use walkdir::WalkDir;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::fsops::{self, CopyReport, DeleteReport, FileFailure};
use crate::game::Game;
use crate::names::{is_save_file, validate_snapshot_name};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SetupReport {
    /// Folders that did not exist before this call.
    pub created: Vec<PathBuf>,
    /// Games whose live save folder was found.
    pub detected: Vec<Game>,
    pub failed: Vec<FileFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameReport {
    pub copy: CopyReport,
    /// `None` when the old snapshot was kept because the copy had failures.
    pub delete: Option<DeleteReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Live profile folder the snapshot was restored into.
    pub target: PathBuf,
    pub copy: CopyReport,
}

/// Owns everything under the backup root. Operations are synchronous and
/// keep no state between calls.
#[derive(Debug, Clone)]
pub struct BackupStore {
    config: StoreConfig,
}

impl BackupStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Creates the backup root and one folder per game whose saves exist.
    /// Idempotent; failures are recorded and the remaining games are
    /// still processed.
    pub fn setup(&self) -> SetupReport {
        let mut report = SetupReport::default();
        let root = &self.config.backup_root;
        match fsops::ensure_dir(root) {
            Ok(true) => {
                info!("created backup root {}", root.display());
                report.created.push(root.to_path_buf());
            }
            Ok(false) => {}
            Err(e) => {
                warn!("{e}");
                report.failed.push(FileFailure {
                    path: root.to_path_buf(),
                    error: e.to_string(),
                });
            }
        }

        for game in Game::all() {
            if !self.config.source_path(game).exists() {
                continue;
            }
            report.detected.push(game);
            let dir = self.config.game_backup_dir(game);
            match fsops::ensure_dir(&dir) {
                Ok(true) => {
                    info!("created {} backup folder {}", game, dir.display());
                    report.created.push(dir);
                }
                Ok(false) => {}
                Err(e) => {
                    warn!("{e}");
                    report.failed.push(FileFailure {
                        path: dir,
                        error: e.to_string(),
                    });
                }
            }
        }
        report
    }

    pub fn list_games(&self) -> impl Iterator<Item = Game> {
        Game::all()
    }

    /// Games that currently have a backup folder, in catalog order.
    pub fn get_all_detected_games(&self) -> Vec<Game> {
        Game::all()
            .filter(|g| self.config.game_backup_dir(*g).is_dir())
            .collect()
    }

    /// Snapshot names for `game`, sorted. An error here means the backup
    /// folder could not be read, which is not the same as having none.
    pub fn get_all_backups(&self, game: Game) -> Result<Vec<String>, StoreError> {
        let dir = self.config.game_backup_dir(game);
        let mut names = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| StoreError::io(&dir, e))? {
            let entry = entry.map_err(|e| StoreError::io(&dir, e))?;
            let is_dir = entry
                .file_type()
                .map_err(|e| StoreError::io(entry.path(), e))?
                .is_dir();
            if is_dir {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Copies the live save files of `game` into snapshot `name`,
    /// creating it if needed and overwriting files it already holds.
    pub fn create_backup(&self, game: Game, name: &str) -> Result<CopyReport, StoreError> {
        validate_snapshot_name(name)?;
        let source = self.config.source_path(game);
        if !source.is_dir() {
            return Err(StoreError::SourceMissing { game, path: source });
        }
        let report = fsops::copy_matching(&source, &self.config.snapshot_dir(game, name), is_save_file)?;
        info!(
            "{} backup '{}': {} copied, {} failed",
            game,
            name,
            report.copied.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Copy-then-delete rename. Returns `None` without touching anything
    /// when `old` is not an existing snapshot or names the same folder
    /// as `new`.
    pub fn rename_backup(
        &self,
        game: Game,
        old: &str,
        new: &str,
    ) -> Result<Option<RenameReport>, StoreError> {
        validate_snapshot_name(old)?;
        validate_snapshot_name(new)?;
        let from = self.config.snapshot_dir(game, old);
        let to = self.config.snapshot_dir(game, new);
        if !from.is_dir() || old == new {
            return Ok(None);
        }
        // Names that differ only in case share a folder on case-insensitive hosts.
        if to.exists() && same_file::is_same_file(&from, &to).map_err(|e| StoreError::io(&to, e))? {
            warn!("{} backups '{}' and '{}' are the same folder", game, old, new);
            return Ok(None);
        }

        let copy = fsops::copy_matching(&from, &to, is_save_file)?;
        if !copy.is_clean() {
            warn!(
                "{} backup '{}' kept: {} file(s) failed to copy to '{}'",
                game,
                old,
                copy.failed.len(),
                new
            );
            return Ok(Some(RenameReport { copy, delete: None }));
        }
        let delete = self.delete_backup(game, old)?;
        info!("{} backup '{}' renamed to '{}'", game, old, new);
        Ok(Some(RenameReport {
            copy,
            delete: Some(delete),
        }))
    }

    pub fn delete_backup(&self, game: Game, name: &str) -> Result<DeleteReport, StoreError> {
        let dir = self.existing_snapshot(game, name)?;
        let report = fsops::remove_files(&dir)?;
        info!(
            "{} backup '{}': {} file(s) removed, folder removed: {}",
            game, name, report.removed, report.snapshot_removed
        );
        Ok(report)
    }

    /// Restores snapshot `name` into the live save profile folder of
    /// `game`: the first subfolder (in name order) of its save location
    /// not named after the game itself.
    pub fn load_backup(&self, game: Game, name: &str) -> Result<LoadReport, StoreError> {
        let snapshot = self.existing_snapshot(game, name)?;
        let target = self.find_profile_dir(game)?;
        let copy = fsops::copy_matching(&snapshot, &target, is_save_file)?;
        info!(
            "{} backup '{}' loaded into {}: {} file(s)",
            game,
            name,
            target.display(),
            copy.copied.len()
        );
        Ok(LoadReport { target, copy })
    }

    fn existing_snapshot(&self, game: Game, name: &str) -> Result<PathBuf, StoreError> {
        validate_snapshot_name(name)?;
        let dir = self.config.snapshot_dir(game, name);
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(StoreError::SnapshotNotFound {
                game,
                name: name.to_string(),
            })
        }
    }

    fn find_profile_dir(&self, game: Game) -> Result<PathBuf, StoreError> {
        let source = self.config.source_path(game);
        if !source.is_dir() {
            return Err(StoreError::SourceMissing { game, path: source });
        }
        for entry in WalkDir::new(&source).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_dir() {
                continue;
            }
            if entry.file_name() == game.canonical_name() {
                warn!("skipping {} while looking for a save profile", entry.path().display());
                continue;
            }
            return Ok(entry.into_path());
        }
        Err(StoreError::NoProfileDir { game, path: source })
    }
}
