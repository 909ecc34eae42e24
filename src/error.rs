use thiserror::Error;

/// Internal invariant violations raised by the grouping engine. Dirty input
/// never produces these; they indicate a line that bypassed extraction rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GroupingError {
    #[error("line at position {position} (row {row_index}) has a blank customer name")]
    BlankCustomer { position: usize, row_index: usize },
    #[error("line at position {position} (row {row_index}) has a blank order number")]
    BlankOrderNumber { position: usize, row_index: usize },
}
