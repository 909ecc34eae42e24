//! Row extraction from a header row plus data rows.
//!
//! [`extract()`] converts raw string rows into [`OrderLine`]s using a
//! [`ColumnMapping`], optionally keeping only rows dated on a target day.
//! Dirty input never aborts the batch: every skipped row, defaulted field and
//! unresolved header is reported through [`Extraction::diagnostics`].

use std::fmt;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    date,
    fields::{
        optional_text, parse_order_value, parse_quantity, parse_remaining_stock, strip_whitespace,
    },
    mapping::{ColumnMapping, FieldKey, ResolvedColumns, resolve},
    order::{OrderLine, synthetic_customer, synthetic_order_number},
};

const DEFAULT_LOCATION: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum SkipReason {
    EmptyRow,
    /// A target date was requested but the row carries no date.
    MissingDate,
    UnparseableDate { raw: String },
    DateMismatch { date: String },
    MissingSku,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyRow => f.write_str("empty row"),
            SkipReason::MissingDate => f.write_str("no date"),
            SkipReason::UnparseableDate { raw } => write!(f, "unparseable date '{raw}'"),
            SkipReason::DateMismatch { date } => write!(f, "dated {date}"),
            SkipReason::MissingSku => f.write_str("missing SKU"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Diagnostic {
    /// The source had no data rows.
    EmptySource,
    ConfigurationGap { field: FieldKey, header: String },
    InvalidTargetDate { raw: String },
    RowSkipped { row: usize, reason: SkipReason },
    /// A field could not be interpreted and was defaulted or left unset.
    Unparseable {
        row: usize,
        field: FieldKey,
        raw: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub lines: Vec<OrderLine>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Extraction {
    pub fn skipped_rows(&self) -> impl Iterator<Item = (usize, &SkipReason)> {
        self.diagnostics.iter().filter_map(|d| match d {
            Diagnostic::RowSkipped { row, reason } => Some((*row, reason)),
            _ => None,
        })
    }

    pub fn skipped_count(&self, predicate: impl Fn(&SkipReason) -> bool) -> usize {
        self.skipped_rows().filter(|(_, r)| predicate(r)).count()
    }

    /// Aggregate messages suitable for showing to a user.
    pub fn summary(&self) -> Vec<String> {
        let mut messages = Vec::new();
        if self.diagnostics.contains(&Diagnostic::EmptySource) {
            messages.push("source has no data rows".to_string());
            return messages;
        }
        for diagnostic in &self.diagnostics {
            match diagnostic {
                Diagnostic::ConfigurationGap { field, header } => messages.push(format!(
                    "column '{header}' mapped to {field} was not found"
                )),
                Diagnostic::InvalidTargetDate { raw } => {
                    messages.push(format!("target date '{raw}' is not a recognisable date"))
                }
                _ => {}
            }
        }
        let missing_sku = self.skipped_count(|r| matches!(r, SkipReason::MissingSku));
        if missing_sku > 0 {
            messages.push(format!("{missing_sku} rows skipped due to missing SKU"));
        }
        let undated = self.skipped_count(|r| {
            matches!(
                r,
                SkipReason::MissingDate | SkipReason::UnparseableDate { .. }
            )
        });
        if undated > 0 {
            messages.push(format!("{undated} rows skipped without a usable date"));
        }
        let date_filtered = self.skipped_count(|r| {
            !matches!(r, SkipReason::EmptyRow | SkipReason::MissingSku)
        });
        if self.lines.is_empty() && date_filtered > 0 {
            messages.push("no rows matched target date".to_string());
        }
        messages
    }
}

/// Extraction stamped with the current time.
pub fn extract(
    header_row: &[String],
    data_rows: &[Vec<String>],
    mapping: &ColumnMapping,
    target_date: Option<&str>,
) -> Extraction {
    extract_at(header_row, data_rows, mapping, target_date, Utc::now())
}

pub fn extract_at(
    header_row: &[String],
    data_rows: &[Vec<String>],
    mapping: &ColumnMapping,
    target_date: Option<&str>,
    extracted_at: DateTime<Utc>,
) -> Extraction {
    let mut diagnostics = Vec::new();
    if data_rows.is_empty() {
        info!("Source contains no data rows");
        diagnostics.push(Diagnostic::EmptySource);
        return Extraction {
            lines: Vec::new(),
            diagnostics,
        };
    }

    let columns = resolve(header_row, mapping);
    for gap in columns.gaps() {
        warn!(
            "Mapped header '{}' for {} not found; treating it as unmapped",
            gap.header, gap.field
        );
        diagnostics.push(Diagnostic::ConfigurationGap {
            field: gap.field,
            header: gap.header.clone(),
        });
    }

    let target = match target_date.map(str::trim).filter(|t| !t.is_empty()) {
        Some(raw) => match date::to_canonical(raw) {
            Some(canonical) => Some(Target::Day(canonical)),
            None => {
                warn!("Target date '{raw}' could not be parsed; no rows will match");
                diagnostics.push(Diagnostic::InvalidTargetDate {
                    raw: raw.to_string(),
                });
                Some(Target::Unmatchable)
            }
        },
        None => None,
    };

    let extractor = RowExtractor {
        columns: &columns,
        target: target.as_ref(),
        extracted_at,
    };
    let mut lines = Vec::with_capacity(data_rows.len());
    for (idx, row) in data_rows.iter().enumerate() {
        let row_index = idx + 1;
        match extractor.extract_row(row_index, row, &mut diagnostics) {
            Ok(line) => lines.push(line),
            Err(reason) => {
                debug!("Skipping row {row_index}: {reason}");
                diagnostics.push(Diagnostic::RowSkipped {
                    row: row_index,
                    reason,
                });
            }
        }
    }

    info!(
        "Extracted {} order line(s) from {} row(s)",
        lines.len(),
        data_rows.len()
    );
    Extraction { lines, diagnostics }
}

enum Target {
    Day(String),
    Unmatchable,
}

struct RowExtractor<'a> {
    columns: &'a ResolvedColumns,
    target: Option<&'a Target>,
    extracted_at: DateTime<Utc>,
}

impl RowExtractor<'_> {
    fn extract_row(
        &self,
        row_index: usize,
        row: &[String],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<OrderLine, SkipReason> {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            return Err(SkipReason::EmptyRow);
        }

        let business_date = self.business_date(row)?;
        let text = |key: FieldKey| self.columns.text(row, key);

        let sku = text(FieldKey::Sku);
        if sku.is_empty() {
            return Err(SkipReason::MissingSku);
        }

        let customer_name = format!(
            "{} {}",
            text(FieldKey::CustomerFirstName),
            text(FieldKey::CustomerLastName)
        )
        .trim()
        .to_string();
        let customer_name = if customer_name.is_empty() {
            synthetic_customer(row_index)
        } else {
            customer_name
        };

        let order_number = match text(FieldKey::OrderNumber) {
            "" => synthetic_order_number(row_index),
            value => value.to_string(),
        };

        let raw_quantity = text(FieldKey::Quantity);
        let quantity = parse_quantity(raw_quantity);
        if quantity.defaulted {
            diagnostics.push(Diagnostic::Unparseable {
                row: row_index,
                field: FieldKey::Quantity,
                raw: raw_quantity.to_string(),
            });
        }

        let raw_value = text(FieldKey::OrderValue);
        let order_value = parse_order_value(raw_value);
        if order_value.is_none() && !raw_value.is_empty() {
            diagnostics.push(Diagnostic::Unparseable {
                row: row_index,
                field: FieldKey::OrderValue,
                raw: raw_value.to_string(),
            });
        }

        let raw_stock = text(FieldKey::RemainingStock);
        let remaining_stock = parse_remaining_stock(raw_stock);
        if remaining_stock.is_none() && !raw_stock.is_empty() {
            diagnostics.push(Diagnostic::Unparseable {
                row: row_index,
                field: FieldKey::RemainingStock,
                raw: raw_stock.to_string(),
            });
        }

        let location = match text(FieldKey::Location) {
            "" => DEFAULT_LOCATION.to_string(),
            value => value.to_string(),
        };

        Ok(OrderLine {
            row_index,
            order_number,
            customer_name,
            sku: sku.to_string(),
            quantity: quantity.value,
            location,
            buyer_postcode: optional_text(text(FieldKey::BuyerPostcode))
                .map(|p| strip_whitespace(&p)),
            remaining_stock,
            order_value,
            channel_type: optional_text(text(FieldKey::ChannelType)),
            channel: optional_text(text(FieldKey::Channel)),
            item_name: optional_text(text(FieldKey::ItemName)),
            notes: optional_text(text(FieldKey::Notes)),
            business_date,
            file_date: self.extracted_at,
            completed: false,
            problem: None,
        })
    }

    /// Downloaded date first, order date as fallback. Filtering applies only
    /// when a target was requested.
    fn business_date(&self, row: &[String]) -> Result<Option<String>, SkipReason> {
        let raw = match self.columns.text(row, FieldKey::FileDate) {
            "" => self.columns.text(row, FieldKey::OrderDate),
            value => value,
        };
        let canonical = date::to_canonical(raw);
        let Some(target) = self.target else {
            return Ok(canonical);
        };
        if raw.is_empty() {
            return Err(SkipReason::MissingDate);
        }
        let Some(canonical) = canonical else {
            return Err(SkipReason::UnparseableDate {
                raw: raw.to_string(),
            });
        };
        match target {
            Target::Day(day) if *day == canonical => Ok(Some(canonical)),
            _ => Err(SkipReason::DateMismatch { date: canonical }),
        }
    }
}
