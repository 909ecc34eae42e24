//! Settings file (YAML).
//!
//! Holds the column mapping, the last-selected target date, the preferred
//! date display format and the source delimiter. A missing file means
//! defaults; a malformed one is an error.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{date::DisplayFormat, mapping::ColumnMapping};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Settings {
    pub mapping: ColumnMapping,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<String>,
    pub display_format: DisplayFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = read_to_string(path)?;
        serde_yaml::from_str(&raw).with_context(|| format!("Parsing settings {path:?}"))
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                debug!("No settings file supplied; using default mapping");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = serde_yaml::to_string(self).context("Serializing settings")?;
        write_string(path, &serialized)
    }

    /// The CLI flag wins over the stored target date.
    pub fn effective_target_date<'a>(&'a self, flag: Option<&'a str>) -> Option<&'a str> {
        flag.or(self.target_date.as_deref())
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    pub fn delimiter_byte(&self) -> Option<u8> {
        self.delimiter.filter(char::is_ascii).map(|c| c as u8)
    }
}

fn read_to_string(path: &Path) -> Result<String> {
    let mut file = File::open(path).with_context(|| format!("Opening settings file {path:?}"))?;
    let mut buf = String::new();
    file.read_to_string(&mut buf)
        .with_context(|| format!("Reading settings file {path:?}"))?;
    Ok(buf)
}

fn write_string(path: &Path, contents: &str) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Creating settings file {path:?}"))?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(())
}
