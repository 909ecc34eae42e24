//! Picking progress recorded outside the sheet.
//!
//! The picking workflow persists, per line identity, whether the line was
//! picked and any problem raised. Applying a [`PickingState`] is the only
//! place `completed` and `problem` change after extraction.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::order::{LineIdentity, OrderLine, ProblemStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickRecord {
    #[serde(flatten)]
    pub identity: LineIdentity,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub problem: Option<ProblemStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PickingState {
    pub records: Vec<PickRecord>,
}

impl PickingState {
    pub fn load(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Opening picking state {path:?}"))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing picking state {path:?}"))
    }

    /// Applies every record to all matching lines; returns how many lines changed.
    pub fn apply(&self, lines: &mut [OrderLine]) -> usize {
        let mut touched = 0usize;
        for record in &self.records {
            let mut matched = false;
            for line in lines.iter_mut().filter(|l| l.matches(&record.identity)) {
                matched = true;
                if line.completed != record.completed || line.problem != record.problem {
                    touched += 1;
                }
                line.completed = record.completed;
                line.problem = record.problem;
            }
            if !matched {
                warn!("Picking state for {} matches no line", record.identity);
            }
        }
        touched
    }
}
