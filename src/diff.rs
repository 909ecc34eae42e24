//! Detection of genuinely new lines between two ingestion passes.
//!
//! Lines are compared by [`diff_key()`]: order number plus SKU, falling back to
//! the customer name when the SKU is blank. The key is deliberately coarse;
//! two customers sharing an order number and lacking a SKU collide.

use std::collections::HashSet;

use log::info;

use crate::order::OrderLine;

pub fn diff_key(line: &OrderLine) -> String {
    let discriminator = if line.sku.is_empty() {
        &line.customer_name
    } else {
        &line.sku
    };
    format!("{}-{}", line.order_number, discriminator)
}

/// Lines of `incoming` whose key is absent from `existing`, in incoming order.
pub fn diff_new(existing: &[OrderLine], incoming: &[OrderLine]) -> Vec<OrderLine> {
    let known = existing.iter().map(diff_key).collect::<HashSet<_>>();
    incoming
        .iter()
        .filter(|line| !known.contains(&diff_key(line)))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// `existing` followed by the new lines.
    pub lines: Vec<OrderLine>,
    pub added: Vec<OrderLine>,
}

/// Appends the genuinely new incoming lines to the existing collection.
pub fn merge_new(existing: &[OrderLine], incoming: &[OrderLine]) -> MergeOutcome {
    let added = diff_new(existing, incoming);
    info!(
        "{} of {} incoming line(s) are new against {} known line(s)",
        added.len(),
        incoming.len(),
        existing.len()
    );
    let mut lines = Vec::with_capacity(existing.len() + added.len());
    lines.extend_from_slice(existing);
    lines.extend(added.iter().cloned());
    MergeOutcome { lines, added }
}
