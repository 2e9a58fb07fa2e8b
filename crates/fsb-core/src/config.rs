use std::path::PathBuf;

use crate::error::StoreError;
use crate::game::Game;

/// Folder created under the saves base to hold every backup.
pub const BACKUP_DIR_NAME: &str = "FSBackup";

/// Where backups live and where the games keep their live saves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backup_root: PathBuf,
    pub saves_base: PathBuf,
}

impl StoreConfig {
    pub fn new(backup_root: impl Into<PathBuf>, saves_base: impl Into<PathBuf>) -> Self {
        Self {
            backup_root: backup_root.into(),
            saves_base: saves_base.into(),
        }
    }

    /// Defaults: saves under the roaming application-data directory
    /// (`%APPDATA%` on Windows), backups in `FSBackup` next to them.
    pub fn from_user_dirs() -> Result<Self, StoreError> {
        let base = dirs::config_dir().ok_or(StoreError::NoUserDir)?;
        Ok(Self::new(base.join(BACKUP_DIR_NAME), base))
    }

    pub fn with_backup_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.backup_root = root.into();
        self
    }

    pub fn with_saves_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.saves_base = base.into();
        self
    }

    pub fn source_path(&self, game: Game) -> PathBuf {
        game.source_path(&self.saves_base)
    }

    pub fn game_backup_dir(&self, game: Game) -> PathBuf {
        self.backup_root.join(game.canonical_name())
    }

    pub fn snapshot_dir(&self, game: Game, name: &str) -> PathBuf {
        self.game_backup_dir(game).join(name)
    }
}
