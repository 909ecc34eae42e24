//! Logical field keys and header resolution.
//!
//! A [`ColumnMapping`] names, for each [`FieldKey`], the header text the
//! source sheet is expected to carry. [`resolve()`] turns it into column
//! indices for one concrete header row. Entries whose header cannot be found
//! are reported as [`ConfigurationGap`]s and treated as unmapped.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    OrderNumber,
    CustomerFirstName,
    CustomerLastName,
    Sku,
    Quantity,
    Location,
    BuyerPostcode,
    RemainingStock,
    OrderValue,
    ChannelType,
    Channel,
    ItemName,
    Notes,
    FileDate,
    OrderDate,
    PackagingType,
    Weight,
    PackerName,
    PackedTime,
}

impl FieldKey {
    /// Resolution order. Never sort by header position.
    pub const ALL: [FieldKey; 19] = [
        FieldKey::OrderNumber,
        FieldKey::CustomerFirstName,
        FieldKey::CustomerLastName,
        FieldKey::Sku,
        FieldKey::Quantity,
        FieldKey::Location,
        FieldKey::BuyerPostcode,
        FieldKey::RemainingStock,
        FieldKey::OrderValue,
        FieldKey::ChannelType,
        FieldKey::Channel,
        FieldKey::ItemName,
        FieldKey::Notes,
        FieldKey::FileDate,
        FieldKey::OrderDate,
        FieldKey::PackagingType,
        FieldKey::Weight,
        FieldKey::PackerName,
        FieldKey::PackedTime,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::OrderNumber => "orderNumber",
            FieldKey::CustomerFirstName => "customerFirstName",
            FieldKey::CustomerLastName => "customerLastName",
            FieldKey::Sku => "sku",
            FieldKey::Quantity => "quantity",
            FieldKey::Location => "location",
            FieldKey::BuyerPostcode => "buyerPostcode",
            FieldKey::RemainingStock => "remainingStock",
            FieldKey::OrderValue => "orderValue",
            FieldKey::ChannelType => "channelType",
            FieldKey::Channel => "channel",
            FieldKey::ItemName => "itemName",
            FieldKey::Notes => "notes",
            FieldKey::FileDate => "fileDate",
            FieldKey::OrderDate => "orderDate",
            FieldKey::PackagingType => "packagingType",
            FieldKey::Weight => "weight",
            FieldKey::PackerName => "packerName",
            FieldKey::PackedTime => "packedTime",
        }
    }

    fn default_header(self) -> &'static str {
        match self {
            FieldKey::OrderNumber => "Order Number",
            FieldKey::CustomerFirstName => "First Name",
            FieldKey::CustomerLastName => "Last Name",
            FieldKey::Sku => "SKU",
            FieldKey::Quantity => "Quantity",
            FieldKey::Location => "Location",
            FieldKey::BuyerPostcode => "Postcode",
            FieldKey::RemainingStock => "Stock Remaining",
            FieldKey::OrderValue => "Order Value",
            FieldKey::ChannelType => "Channel Type",
            FieldKey::Channel => "Channel",
            FieldKey::ItemName => "Item Name",
            FieldKey::Notes => "Notes",
            FieldKey::FileDate => "Downloaded Date",
            FieldKey::OrderDate => "Order Date",
            FieldKey::PackagingType => "Packaging Type",
            FieldKey::Weight => "Weight",
            FieldKey::PackerName => "Packer",
            FieldKey::PackedTime => "Packed Time",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field key to expected header text. Blank values count as unmapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    fields: BTreeMap<FieldKey, String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        FieldKey::ALL
            .iter()
            .map(|key| (*key, key.default_header()))
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(FieldKey, S)> for ColumnMapping {
    fn from_iter<I: IntoIterator<Item = (FieldKey, S)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(key, header)| (key, header.into()))
                .collect(),
        }
    }
}

impl ColumnMapping {
    pub fn empty() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: FieldKey, header: impl Into<String>) -> Self {
        self.fields.insert(key, header.into());
        self
    }

    /// Expected header for `key`, `None` when unmapped or blank.
    pub fn header(&self, key: FieldKey) -> Option<&str> {
        self.fields
            .get(&key)
            .map(|h| h.trim())
            .filter(|h| !h.is_empty())
    }
}

/// A mapped header missing from the actual header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationGap {
    pub field: FieldKey,
    pub header: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedColumns {
    indices: BTreeMap<FieldKey, usize>,
    gaps: Vec<ConfigurationGap>,
}

impl ResolvedColumns {
    pub fn index(&self, key: FieldKey) -> Option<usize> {
        self.indices.get(&key).copied()
    }

    pub fn is_mapped(&self, key: FieldKey) -> bool {
        self.indices.contains_key(&key)
    }

    pub fn indices(&self) -> &BTreeMap<FieldKey, usize> {
        &self.indices
    }

    pub fn gaps(&self) -> &[ConfigurationGap] {
        &self.gaps
    }

    /// Trimmed cell text for `key`; empty when unmapped or the row is short.
    pub fn text<'a>(&self, row: &'a [String], key: FieldKey) -> &'a str {
        self.index(key)
            .and_then(|idx| row.get(idx))
            .map(|cell| cell.trim())
            .unwrap_or("")
    }
}

pub fn resolve(header_row: &[String], mapping: &ColumnMapping) -> ResolvedColumns {
    let normalized = header_row
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect::<Vec<_>>();
    let mut resolved = ResolvedColumns::default();
    for key in FieldKey::ALL {
        let Some(expected) = mapping.header(key) else {
            continue;
        };
        let needle = expected.to_lowercase();
        match normalized.iter().position(|h| *h == needle) {
            Some(idx) => {
                resolved.indices.insert(key, idx);
            }
            None => resolved.gaps.push(ConfigurationGap {
                field: key,
                header: expected.to_string(),
            }),
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolves_case_insensitively_with_trimming() {
        let mapping = ColumnMapping::empty()
            .with(FieldKey::Sku, "  sku ")
            .with(FieldKey::OrderNumber, "ORDER NUMBER");
        let resolved = resolve(&headers(&["Order Number ", "Sku", "Qty"]), &mapping);
        assert_eq!(resolved.index(FieldKey::OrderNumber), Some(0));
        assert_eq!(resolved.index(FieldKey::Sku), Some(1));
        assert!(resolved.gaps().is_empty());
    }

    #[test]
    fn first_matching_header_wins() {
        let mapping = ColumnMapping::empty().with(FieldKey::Notes, "Notes");
        let resolved = resolve(&headers(&["notes", "Notes"]), &mapping);
        assert_eq!(resolved.index(FieldKey::Notes), Some(0));
    }

    #[test]
    fn blank_entries_are_unmapped_and_missing_headers_are_gaps() {
        let mapping = ColumnMapping::empty()
            .with(FieldKey::Location, "   ")
            .with(FieldKey::Channel, "Marketplace");
        let resolved = resolve(&headers(&["Location", "Channel"]), &mapping);
        assert!(!resolved.is_mapped(FieldKey::Location));
        assert!(!resolved.is_mapped(FieldKey::Channel));
        assert_eq!(
            resolved.gaps(),
            &[ConfigurationGap {
                field: FieldKey::Channel,
                header: "Marketplace".to_string(),
            }]
        );
    }

    #[test]
    fn text_handles_short_rows() {
        let mapping = ColumnMapping::empty().with(FieldKey::Notes, "Notes");
        let resolved = resolve(&headers(&["SKU", "Notes"]), &mapping);
        let short = vec!["A1".to_string()];
        assert_eq!(resolved.text(&short, FieldKey::Notes), "");
        assert_eq!(resolved.text(&short, FieldKey::Sku), "");
    }

    #[test]
    fn default_mapping_covers_every_key() {
        let mapping = ColumnMapping::default();
        for key in FieldKey::ALL {
            assert!(mapping.header(key).is_some(), "{key} has no default header");
        }
    }
}
