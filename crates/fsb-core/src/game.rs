use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::StoreError;

/// Supported games. Each one keeps its saves in a folder named after its
/// canonical name directly under the per-user roaming data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Game {
    DarkSoulsII,
    DarkSoulsIII,
    Sekiro,
    EldenRing,
}

impl Game {
    pub const ALL: [Game; 4] = [
        Game::DarkSoulsII,
        Game::DarkSoulsIII,
        Game::Sekiro,
        Game::EldenRing,
    ];

    pub fn all() -> impl Iterator<Item = Game> {
        Self::ALL.into_iter()
    }

    /// Folder name and display label.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Game::DarkSoulsII => "DarkSoulsII",
            Game::DarkSoulsIII => "DarkSoulsIII",
            Game::Sekiro => "Sekiro",
            Game::EldenRing => "EldenRing",
        }
    }

    /// Live save location of this game under `saves_base`. No I/O.
    pub fn source_path(self, saves_base: &Path) -> PathBuf {
        saves_base.join(self.canonical_name())
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

impl FromStr for Game {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Game::all()
            .find(|g| g.canonical_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| StoreError::UnknownGame(s.to_string()))
    }
}
