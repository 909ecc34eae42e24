//! Customer-level grouping of order lines for the pick list.
//!
//! Lines sharing a real customer name and postcode collapse into one group even
//! across order numbers (a merged order). Otherwise a real customer plus a real
//! order number groups the SKU lines of that order. Lines with placeholder
//! identity stay on their own.
//!
//! Groups are recomputed from scratch on every call and come back in order of
//! first appearance in the input.

use std::collections::{BTreeMap, HashMap};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    error::GroupingError,
    order::{OrderLine, ProblemStatus},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    ByCustomerPostcode { customer: String, postcode: String },
    ByCustomerOrder { customer: String, order_number: String },
    /// Input position of a line that must never be grouped.
    Unique(usize),
}

impl GroupKey {
    pub fn for_line(position: usize, line: &OrderLine) -> Result<Self, GroupingError> {
        if !line.has_real_customer() {
            return Ok(GroupKey::Unique(position));
        }
        let postcode = line
            .buyer_postcode
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());
        if postcode.is_none() && !line.has_real_order_number() {
            return Ok(GroupKey::Unique(position));
        }
        if line.customer_name.trim().is_empty() {
            return Err(GroupingError::BlankCustomer {
                position,
                row_index: line.row_index,
            });
        }
        if let Some(postcode) = postcode {
            return Ok(GroupKey::ByCustomerPostcode {
                customer: line.customer_name.clone(),
                postcode: postcode.to_string(),
            });
        }
        if line.order_number.trim().is_empty() {
            return Err(GroupingError::BlankOrderNumber {
                position,
                row_index: line.row_index,
            });
        }
        Ok(GroupKey::ByCustomerOrder {
            customer: line.customer_name.clone(),
            order_number: line.order_number.clone(),
        })
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum GroupKind {
    Merged,
    MultipleItems,
    Single,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderGroup {
    pub customer_name: String,
    /// Order number of the first contributing line.
    pub order_number: String,
    /// Distinct order numbers in first-seen order.
    pub order_numbers: Vec<String>,
    pub items: Vec<OrderLine>,
    pub total_items: u32,
    pub completed_items: u32,
    pub buyer_postcode: Option<String>,
    pub original_index: usize,
    pub is_merged_order: bool,
    pub is_multiple_items: bool,
}

impl OrderGroup {
    fn start(position: usize, line: &OrderLine) -> Self {
        Self {
            customer_name: line.customer_name.clone(),
            order_number: line.order_number.clone(),
            order_numbers: Vec::new(),
            items: Vec::new(),
            total_items: 0,
            completed_items: 0,
            buyer_postcode: line.buyer_postcode.clone(),
            original_index: position,
            is_merged_order: false,
            is_multiple_items: false,
        }
    }

    fn push(&mut self, line: &OrderLine) {
        if !self.order_numbers.contains(&line.order_number) {
            self.order_numbers.push(line.order_number.clone());
        }
        self.total_items = self.total_items.saturating_add(line.quantity);
        if line.completed {
            self.completed_items = self.completed_items.saturating_add(line.quantity);
        }
        self.items.push(line.clone());
    }

    fn classify(mut self) -> Self {
        self.is_merged_order = self.order_numbers.len() >= 2;
        self.is_multiple_items = !self.is_merged_order && self.items.len() >= 2;
        self
    }

    pub fn kind(&self) -> GroupKind {
        if self.is_merged_order {
            GroupKind::Merged
        } else if self.is_multiple_items {
            GroupKind::MultipleItems
        } else {
            GroupKind::Single
        }
    }

    pub fn is_completed(&self) -> bool {
        self.total_items > 0 && self.completed_items == self.total_items
    }

    pub fn has_problem(&self) -> bool {
        self.items.iter().any(|item| item.problem.is_some())
    }

    pub fn has_status(&self, status: ProblemStatus) -> bool {
        self.items.iter().any(|item| item.problem == Some(status))
    }
}

pub fn group(orders: &[OrderLine]) -> Result<Vec<OrderGroup>, GroupingError> {
    let accumulated = orders.iter().enumerate().try_fold(
        HashMap::<GroupKey, OrderGroup>::new(),
        |mut groups, (position, line)| {
            let key = GroupKey::for_line(position, line)?;
            groups
                .entry(key)
                .or_insert_with(|| OrderGroup::start(position, line))
                .push(line);
            Ok::<_, GroupingError>(groups)
        },
    )?;
    let mut groups = accumulated
        .into_values()
        .map(OrderGroup::classify)
        .collect::<Vec<_>>();
    groups.sort_by_key(|g| g.original_index);
    Ok(groups)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionFilter {
    #[default]
    Any,
    Completed,
    Incomplete,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProblemFilter {
    #[default]
    Any,
    WithProblems,
    WithoutProblems,
    /// Any item carries one of these statuses.
    AnyOf(Vec<ProblemStatus>),
}

/// Independent axes combined with AND. An empty `kinds` list admits every kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupFilter {
    pub completion: CompletionFilter,
    pub kinds: Vec<GroupKind>,
    pub problems: ProblemFilter,
}

impl GroupFilter {
    pub fn matches(&self, group: &OrderGroup) -> bool {
        let completion = match self.completion {
            CompletionFilter::Any => true,
            CompletionFilter::Completed => group.is_completed(),
            CompletionFilter::Incomplete => !group.is_completed(),
        };
        let kind = self.kinds.is_empty() || self.kinds.contains(&group.kind());
        let problems = match &self.problems {
            ProblemFilter::Any => true,
            ProblemFilter::WithProblems => group.has_problem(),
            ProblemFilter::WithoutProblems => !group.has_problem(),
            ProblemFilter::AnyOf(statuses) => statuses.iter().any(|s| group.has_status(*s)),
        };
        completion && kind && problems
    }
}

pub fn filter<'a>(groups: &'a [OrderGroup], predicate: &GroupFilter) -> Vec<&'a OrderGroup> {
    groups.iter().filter(|g| predicate.matches(g)).collect()
}

/// Cardinalities over the full grouped set, before any filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCounts {
    pub groups: usize,
    pub lines: usize,
    pub completed: usize,
    pub incomplete: usize,
    pub merged: usize,
    pub multiple_items: usize,
    pub single: usize,
    pub with_problems: usize,
    pub by_status: BTreeMap<ProblemStatus, usize>,
    pub total_items: u64,
    pub completed_items: u64,
}

pub fn counts(groups: &[OrderGroup]) -> GroupCounts {
    groups.iter().fold(GroupCounts::default(), |mut acc, g| {
        acc.groups += 1;
        acc.lines += g.items.len();
        if g.is_completed() {
            acc.completed += 1;
        } else {
            acc.incomplete += 1;
        }
        match g.kind() {
            GroupKind::Merged => acc.merged += 1,
            GroupKind::MultipleItems => acc.multiple_items += 1,
            GroupKind::Single => acc.single += 1,
        }
        if g.has_problem() {
            acc.with_problems += 1;
        }
        let mut statuses = g.items.iter().filter_map(|i| i.problem).collect::<Vec<_>>();
        statuses.sort();
        statuses.dedup();
        for status in statuses {
            *acc.by_status.entry(status).or_insert(0) += 1;
        }
        acc.total_items += u64::from(g.total_items);
        acc.completed_items += u64::from(g.completed_items);
        acc
    })
}
