//! fsb-core: backup store for FromSoftware save files
//!
//! Layout on disk:
//! - backup root (default `<roaming app data>/FSBackup`)
//! - one folder per detected game, named by its canonical name
//! - one folder per snapshot, holding flat copies of `*.sl2` / `*.sl2.bak`
//!
//! There is no manifest; the directory listing is the index.
//!
pub mod config;
pub mod error;
pub mod fsops;
pub mod game;
pub mod names;
pub mod store;

pub use config::StoreConfig;
pub use error::StoreError;
pub use fsops::{CopyReport, DeleteReport, FileFailure, copy_matching, remove_files};
pub use game::Game;
pub use names::{default_snapshot_name, is_save_file, validate_snapshot_name};
pub use store::{BackupStore, LoadReport, RenameReport, SetupReport};
