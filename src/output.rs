//! Rendering of extracted lines, groups, counts and write-back updates.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use itertools::Itertools;
use serde::Serialize;

use crate::{
    date::{self, DisplayFormat},
    group::{GroupCounts, GroupKind, OrderGroup},
    io_utils,
    order::OrderLine,
    table::{Align, render_table},
    writeback::PackedUpdate,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Table,
    Json,
}

const LINE_COLUMNS: [&str; 15] = [
    "rowIndex",
    "orderNumber",
    "customerName",
    "sku",
    "quantity",
    "location",
    "buyerPostcode",
    "remainingStock",
    "orderValue",
    "channelType",
    "channel",
    "itemName",
    "notes",
    "businessDate",
    "fileDate",
];

fn line_cells(line: &OrderLine, display: DisplayFormat) -> Vec<String> {
    let optional = |value: &Option<String>| value.clone().unwrap_or_default();
    vec![
        line.row_index.to_string(),
        line.order_number.clone(),
        line.customer_name.clone(),
        line.sku.clone(),
        line.quantity.to_string(),
        line.location.clone(),
        optional(&line.buyer_postcode),
        line.remaining_stock.map(|s| s.to_string()).unwrap_or_default(),
        line.order_value.map(|v| v.to_string()).unwrap_or_default(),
        optional(&line.channel_type),
        optional(&line.channel),
        optional(&line.item_name),
        optional(&line.notes),
        line.business_date
            .as_deref()
            .map(|d| date::to_display(d, display))
            .unwrap_or_default(),
        line.file_date.to_rfc3339(),
    ]
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn write_json<T: Serialize + ?Sized>(output: Option<&Path>, value: &T) -> Result<()> {
    let mut writer = io_utils::open_writer(output)?;
    serde_json::to_writer_pretty(&mut writer, value).context("Writing JSON output")?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

fn write_text(output: Option<&Path>, text: &str) -> Result<()> {
    let mut writer = io_utils::open_writer(output)?;
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    Ok(())
}

pub fn write_lines(
    lines: &[OrderLine],
    format: OutputFormat,
    output: Option<&Path>,
    delimiter: u8,
    display: DisplayFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(output, lines),
        OutputFormat::Table => {
            let rows = lines
                .iter()
                .map(|line| line_cells(line, display))
                .collect::<Vec<_>>();
            let mut aligns = vec![Align::Left; LINE_COLUMNS.len()];
            aligns[0] = Align::Right;
            aligns[4] = Align::Right;
            write_text(output, &render_table(&owned(&LINE_COLUMNS), &rows, &aligns))
        }
        OutputFormat::Csv => {
            let mut writer = io_utils::open_csv_writer(output, delimiter)?;
            writer.write_record(LINE_COLUMNS)?;
            for line in lines {
                writer
                    .write_record(line_cells(line, display))
                    .with_context(|| format!("Writing row {}", line.row_index))?;
            }
            writer.flush().context("Flushing CSV output")?;
            Ok(())
        }
    }
}

fn kind_label(kind: GroupKind) -> &'static str {
    match kind {
        GroupKind::Merged => "merged",
        GroupKind::MultipleItems => "multiple-items",
        GroupKind::Single => "single",
    }
}

pub fn render_groups(groups: &[&OrderGroup]) -> String {
    let headers = owned(&[
        "#", "customer", "orders", "kind", "picked", "postcode", "skus", "problems",
    ]);
    let rows = groups
        .iter()
        .enumerate()
        .map(|(idx, group)| {
            vec![
                (idx + 1).to_string(),
                group.customer_name.clone(),
                group.order_numbers.join(", "),
                kind_label(group.kind()).to_string(),
                format!("{}/{}", group.completed_items, group.total_items),
                group.buyer_postcode.clone().unwrap_or_default(),
                group
                    .items
                    .iter()
                    .map(|item| format!("{} x{}", item.sku, item.quantity))
                    .join(", "),
                group
                    .items
                    .iter()
                    .filter_map(|item| item.problem)
                    .unique()
                    .join(", "),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&headers, &rows, &[Align::Right, Align::Left, Align::Left, Align::Left, Align::Right])
}

pub fn render_counts(counts: &GroupCounts) -> String {
    let mut rows = vec![
        ("groups", counts.groups),
        ("lines", counts.lines),
        ("completed", counts.completed),
        ("incomplete", counts.incomplete),
        ("merged", counts.merged),
        ("multiple-items", counts.multiple_items),
        ("single", counts.single),
        ("with-problems", counts.with_problems),
    ]
    .into_iter()
    .map(|(name, value)| vec![name.to_string(), value.to_string()])
    .collect::<Vec<_>>();
    for (status, value) in &counts.by_status {
        rows.push(vec![format!("status:{status}"), value.to_string()]);
    }
    rows.push(vec!["items".to_string(), counts.total_items.to_string()]);
    rows.push(vec![
        "items-picked".to_string(),
        counts.completed_items.to_string(),
    ]);
    render_table(&owned(&["count", "value"]), &rows, &[Align::Left, Align::Right])
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupReport<'a> {
    groups: &'a [&'a OrderGroup],
    counts: &'a GroupCounts,
}

pub fn write_groups(
    groups: &[&OrderGroup],
    counts: &GroupCounts,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(output, &GroupReport { groups, counts }),
        OutputFormat::Table | OutputFormat::Csv => {
            let text = format!("{}\n{}", render_groups(groups), render_counts(counts));
            write_text(output, &text)
        }
    }
}

pub fn write_updates(
    updates: &[PackedUpdate],
    path: &Path,
    packer_header: &str,
    packed_time_header: &str,
) -> Result<()> {
    let mut writer = io_utils::open_csv_writer(Some(path), b',')?;
    writer.write_record(["sheetRow", packer_header, packed_time_header])?;
    for update in updates {
        let [packer, packed_time] = update.cells();
        writer.write_record([update.sheet_row.to_string().as_str(), packer, packed_time])?;
    }
    writer
        .flush()
        .with_context(|| format!("Writing updates to {path:?}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{counts, group};
    use crate::order::fixtures::line;

    #[test]
    fn group_table_lists_orders_and_pick_progress() {
        let mut first = line(1, "1001", "Jane Doe", "MUG");
        first.buyer_postcode = Some("AB12CD".to_string());
        first.completed = true;
        let mut second = line(2, "1002", "Jane Doe", "CUP");
        second.buyer_postcode = Some("AB12CD".to_string());
        let groups = group(&[first, second]).unwrap();
        let refs = groups.iter().collect::<Vec<_>>();
        let rendered = render_groups(&refs);
        assert!(rendered.contains("1001, 1002"));
        assert!(rendered.contains("merged"));
        assert!(rendered.contains("1/2"));
        assert!(rendered.contains("MUG x1, CUP x1"));

        let summary = render_counts(&counts(&groups));
        assert!(summary.contains("merged"));
        assert!(summary.lines().any(|l| l.starts_with("groups") && l.ends_with('1')));
    }
}
