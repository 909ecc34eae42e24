use std::fmt;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const SYNTHETIC_CUSTOMER_PREFIX: &str = "Customer-";
pub const SYNTHETIC_ORDER_PREFIX: &str = "Row-";

pub fn synthetic_customer(row_index: usize) -> String {
    format!("{SYNTHETIC_CUSTOMER_PREFIX}{row_index}")
}

pub fn synthetic_order_number(row_index: usize) -> String {
    format!("{SYNTHETIC_ORDER_PREFIX}{row_index}")
}

/// Problem raised by the picker against a line.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum ProblemStatus {
    OutOfStock,
    Damaged,
    NotFound,
    WrongItem,
    Other,
}

impl fmt::Display for ProblemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProblemStatus::OutOfStock => "out-of-stock",
            ProblemStatus::Damaged => "damaged",
            ProblemStatus::NotFound => "not-found",
            ProblemStatus::WrongItem => "wrong-item",
            ProblemStatus::Other => "other",
        };
        f.write_str(label)
    }
}

/// One SKU-level line of an order as read from the source sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// 1-based position among the data rows.
    pub row_index: usize,
    pub order_number: String,
    pub customer_name: String,
    pub sku: String,
    pub quantity: u32,
    pub location: String,
    pub buyer_postcode: Option<String>,
    pub remaining_stock: Option<i64>,
    pub order_value: Option<Decimal>,
    pub channel_type: Option<String>,
    pub channel: Option<String>,
    pub item_name: Option<String>,
    pub notes: Option<String>,
    /// Canonical date the row was matched on, when one was resolvable.
    pub business_date: Option<String>,
    /// When the batch was extracted; identical across a batch.
    pub file_date: DateTime<Utc>,
    pub completed: bool,
    pub problem: Option<ProblemStatus>,
}

impl OrderLine {
    pub fn has_real_customer(&self) -> bool {
        !self.customer_name.starts_with(SYNTHETIC_CUSTOMER_PREFIX)
    }

    pub fn has_real_order_number(&self) -> bool {
        !self.order_number.starts_with(SYNTHETIC_ORDER_PREFIX)
    }

    pub fn identity(&self) -> LineIdentity {
        LineIdentity {
            order_number: self.order_number.clone(),
            sku: self.sku.clone(),
            customer_name: self.customer_name.clone(),
        }
    }

    pub fn matches(&self, identity: &LineIdentity) -> bool {
        self.order_number == identity.order_number
            && self.sku == identity.sku
            && self.customer_name == identity.customer_name
    }
}

/// How selection events and picking state address a single line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineIdentity {
    pub order_number: String,
    pub sku: String,
    pub customer_name: String,
}

impl fmt::Display for LineIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {}",
            self.order_number, self.sku, self.customer_name
        )
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::line;
    use super::*;

    #[test]
    fn synthetic_prefixes_mark_placeholder_identity() {
        let placeholder = line(4, &synthetic_order_number(4), &synthetic_customer(4), "SKU");
        assert!(!placeholder.has_real_customer());
        assert!(!placeholder.has_real_order_number());

        let real = line(1, "1001", "Jane Doe", "SKU");
        assert!(real.has_real_customer());
        assert!(real.has_real_order_number());
    }

    #[test]
    fn identity_matches_on_all_three_parts() {
        let order = line(1, "1001", "Jane Doe", "MUG-01");
        let identity = order.identity();
        assert!(order.matches(&identity));
        let other = line(2, "1001", "John Doe", "MUG-01");
        assert!(!other.matches(&identity));
    }
}
