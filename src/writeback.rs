use chrono::NaiveDateTime;
use serde::Serialize;

use crate::order::OrderLine;

pub const PACKED_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Two-column update for one source row: who packed it and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedUpdate {
    pub row_index: usize,
    /// Sheet row including the header row.
    pub sheet_row: usize,
    pub packer_name: String,
    pub packed_time: String,
}

impl PackedUpdate {
    pub fn cells(&self) -> [&str; 2] {
        [self.packer_name.as_str(), self.packed_time.as_str()]
    }
}

/// Updates for completed lines, ordered by source row with duplicates removed.
pub fn packed_updates<'a>(
    lines: impl IntoIterator<Item = &'a OrderLine>,
    packer: &str,
    packed_at: NaiveDateTime,
) -> Vec<PackedUpdate> {
    let packed_time = packed_at.format(PACKED_TIME_FORMAT).to_string();
    let mut updates = lines
        .into_iter()
        .filter(|line| line.completed)
        .map(|line| PackedUpdate {
            row_index: line.row_index,
            sheet_row: line.row_index + 1,
            packer_name: packer.trim().to_string(),
            packed_time: packed_time.clone(),
        })
        .collect::<Vec<_>>();
    updates.sort_by_key(|u| u.row_index);
    updates.dedup_by_key(|u| u.row_index);
    updates
}
