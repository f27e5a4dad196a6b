//! High score persistence as a small RON file.

use std::fs;
use std::io;
use std::path::PathBuf;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default location, relative to the working directory.
pub const HIGH_SCORE_PATH: &str = "high_score.ron";

/// On-disk layout.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighScoreFile {
    pub high_score: u32,
}

#[derive(Error, Debug)]
pub enum HighScoreError {
    #[error("high score file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("high score file is malformed: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("high score could not be encoded: {0}")]
    Encode(#[from] ron::Error),
}

/// Where the high score lives. `None` keeps it in memory only.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct HighScoreStore {
    pub path: Option<PathBuf>,
}

impl Default for HighScoreStore {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from(HIGH_SCORE_PATH)),
        }
    }
}

impl HighScoreStore {
    #[must_use]
    pub const fn in_memory() -> Self {
        Self { path: None }
    }

    /// Reads the stored score. A missing file is a fresh install and reads as 0.
    pub fn load(&self) -> Result<u32, HighScoreError> {
        let Some(path) = &self.path else {
            return Ok(0);
        };
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err.into()),
        };
        let file: HighScoreFile = ron::from_str(&contents)?;
        Ok(file.high_score)
    }

    pub fn save(&self, high_score: u32) -> Result<(), HighScoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let encoded = ron::ser::to_string_pretty(
            &HighScoreFile { high_score },
            ron::ser::PrettyConfig::default(),
        )?;
        fs::write(path, encoded)?;
        Ok(())
    }
}
