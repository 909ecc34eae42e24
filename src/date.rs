//! Ambiguous date normalization.
//!
//! Source sheets carry dates as `NUM SEP NUM SEP NUM` with no fixed ordering.
//! [`parse()`] infers the year from whichever outer component exceeds 1000 and,
//! when the year comes last, orders the remaining pair by which side can only
//! be a day. Genuinely ambiguous pairs resolve day-first.
//!
//! Every operation degrades instead of failing: unparseable input yields
//! `None`, and [`compare()`] treats it as equal to anything.

use std::{cmp::Ordering, sync::OnceLock};

use chrono::NaiveDate;
use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

const YEAR_THRESHOLD: u32 = 1000;

/// Component order detected while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateLayout {
    YearMonthDay,
    DayMonthYear,
    MonthDayYear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParsedDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub layout: DateLayout,
}

impl ParsedDate {
    /// Range and calendar check; leap years included.
    pub fn is_valid(&self) -> bool {
        (MIN_YEAR..=MAX_YEAR).contains(&self.year)
            && (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && NaiveDate::from_ymd_opt(self.year, self.month, self.day).is_some()
    }

    pub fn canonical(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum DisplayFormat {
    /// YYYY-MM-DD
    #[default]
    Iso,
    /// DD/MM/YYYY
    DayFirst,
    /// DD-MM-YYYY
    DayFirstDashed,
    /// YYYY/MM/DD
    YearFirstSlashed,
}

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,4})([/-])(\d{1,4})([/-])(\d{1,4})$").expect("date pattern is valid")
    })
}

pub fn parse(text: &str) -> Option<ParsedDate> {
    let captures = date_pattern().captures(text.trim())?;
    let separator = captures[2].chars().next()?;
    if captures[4].chars().next()? != separator {
        return None;
    }
    let first: u32 = captures[1].parse().ok()?;
    let second: u32 = captures[3].parse().ok()?;
    let third: u32 = captures[5].parse().ok()?;

    let (year, month, day, layout) = if first > YEAR_THRESHOLD {
        (first, second, third, DateLayout::YearMonthDay)
    } else if third > YEAR_THRESHOLD {
        if first > 12 {
            (third, second, first, DateLayout::DayMonthYear)
        } else if second > 12 {
            (third, first, second, DateLayout::MonthDayYear)
        } else {
            (third, second, first, DateLayout::DayMonthYear)
        }
    } else {
        return None;
    };

    let parsed = ParsedDate {
        year: i32::try_from(year).ok()?,
        month,
        day,
        layout,
    };
    parsed.is_valid().then_some(parsed)
}

pub fn to_canonical(text: &str) -> Option<String> {
    parse(text).map(|parsed| parsed.canonical())
}

/// Renders a date in `format`. Input that cannot be canonicalised is returned as-is.
pub fn to_display(text: &str, format: DisplayFormat) -> String {
    let Some(parsed) = parse(text) else {
        return text.to_string();
    };
    let ParsedDate {
        year, month, day, ..
    } = parsed;
    match format {
        DisplayFormat::Iso => parsed.canonical(),
        DisplayFormat::DayFirst => format!("{day:02}/{month:02}/{year:04}"),
        DisplayFormat::DayFirstDashed => format!("{day:02}-{month:02}-{year:04}"),
        DisplayFormat::YearFirstSlashed => format!("{year:04}/{month:02}/{day:02}"),
    }
}

pub fn compare(a: &str, b: &str) -> Ordering {
    match (to_canonical(a), to_canonical(b)) {
        (Some(left), Some(right)) => left.cmp(&right),
        _ => Ordering::Equal,
    }
}

/// Stable chronological sort. Unparseable entries compare equal to every
/// other entry, so where they land depends on their neighbours.
///
/// `compare` is not a total order once unparseable values are involved and
/// `slice::sort_by` may panic on such comparators.
pub fn sort<S: AsRef<str>>(dates: &[S], descending: bool) -> Vec<String> {
    let mut sorted = dates
        .iter()
        .map(|d| d.as_ref().to_string())
        .collect::<Vec<_>>();
    let out_of_order = |left: &str, right: &str| {
        let ordering = compare(left, right);
        if descending {
            ordering == Ordering::Less
        } else {
            ordering == Ordering::Greater
        }
    };
    for idx in 1..sorted.len() {
        let mut pos = idx;
        while pos > 0 && out_of_order(&sorted[pos - 1], &sorted[pos]) {
            sorted.swap(pos - 1, pos);
            pos -= 1;
        }
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(text: &str) -> (i32, u32, u32) {
        let parsed = parse(text).unwrap_or_else(|| panic!("{text} should parse"));
        (parsed.year, parsed.month, parsed.day)
    }

    #[test]
    fn year_first_keeps_textual_month_day_order() {
        assert_eq!(ymd("2024-03-09"), (2024, 3, 9));
        assert_eq!(ymd("2024/3/9"), (2024, 3, 9));
        assert_eq!(parse("2024-03-09").unwrap().layout, DateLayout::YearMonthDay);
    }

    #[test]
    fn year_last_picks_day_from_the_large_component() {
        assert_eq!(ymd("25/12/2023"), (2023, 12, 25));
        assert_eq!(ymd("12/25/2023"), (2023, 12, 25));
        assert_eq!(parse("12/25/2023").unwrap().layout, DateLayout::MonthDayYear);
    }

    #[test]
    fn ambiguous_pair_defaults_to_day_first() {
        assert_eq!(ymd("05/07/2024"), (2024, 7, 5));
        assert_eq!(ymd("1-2-2024"), (2024, 2, 1));
    }

    #[test]
    fn rejects_mixed_separators_and_bad_shapes() {
        assert!(parse("2024-03/09").is_none());
        assert!(parse("2024.03.09").is_none());
        assert!(parse("12/05/24").is_none());
        assert!(parse("20240-1-1").is_none());
        assert!(parse("").is_none());
        assert!(parse("not-a-date").is_none());
    }

    #[test]
    fn validates_calendar_and_year_range() {
        assert!(parse("2024-02-29").is_some());
        assert!(parse("2023-02-29").is_none());
        assert!(parse("31/04/2024").is_none());
        assert!(parse("2024-13-01").is_none());
        assert!(parse("2024-00-10").is_none());
        assert!(parse("1899-12-31").is_none());
        assert!(parse("2101-01-01").is_none());
        assert!(parse("13/13/2024").is_none());
    }

    #[test]
    fn display_formats_render_zero_padded() {
        assert_eq!(to_display("2024-7-5", DisplayFormat::DayFirst), "05/07/2024");
        assert_eq!(to_display("5/7/2024", DisplayFormat::DayFirstDashed), "05-07-2024");
        assert_eq!(to_display("5/7/2024", DisplayFormat::YearFirstSlashed), "2024/07/05");
        assert_eq!(to_display("5/7/2024", DisplayFormat::Iso), "2024-07-05");
        assert_eq!(to_display("tomorrow", DisplayFormat::DayFirst), "tomorrow");
    }

    #[test]
    fn compare_degrades_to_equal_for_unparseable() {
        assert_eq!(compare("01/02/2024", "2024-01-31"), Ordering::Greater);
        assert_eq!(compare("2024-01-31", "2024/01/31"), Ordering::Equal);
        assert_eq!(compare("garbage", "2024-01-31"), Ordering::Equal);
    }

    #[test]
    fn sort_orders_chronologically() {
        let dates = ["10/01/2024", "2023-12-31", "2024/01/02"];
        assert_eq!(
            sort(&dates, false),
            vec!["2023-12-31", "2024/01/02", "10/01/2024"]
        );
        assert_eq!(
            sort(&dates, true),
            vec!["10/01/2024", "2024/01/02", "2023-12-31"]
        );
    }
}
