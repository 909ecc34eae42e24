#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use order_intake::order::OrderLine;
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Sheet export using the default mapping's header text.
pub const ORDERS_SHEET: &str = "\
Order Number,First Name,Last Name,SKU,Quantity,Location,Postcode,Order Value,Downloaded Date
1001,Jane,Doe,MUG-01,2,A1,AB1 2CD,£12.50,05/07/2024
1002,Jane,Doe,CUP-02,1,A2,AB12CD,$4.00,2024-07-05
2001,Sam,Roe,MUG-01,,B1,,N/A,5/7/2024
,,,PLATE-03,3,,,,05-07-2024
2002,Ann,Lee,,1,C1,,,05/07/2024
3001,Tom,Fox,BOWL-04,1,D1,,,06/07/2024
";

pub fn line(row_index: usize, order: &str, customer: &str, sku: &str) -> OrderLine {
    OrderLine {
        row_index,
        order_number: order.to_string(),
        customer_name: customer.to_string(),
        sku: sku.to_string(),
        quantity: 1,
        location: "Unknown".to_string(),
        buyer_postcode: None,
        remaining_stock: None,
        order_value: None,
        channel_type: None,
        channel: None,
        item_name: None,
        notes: None,
        business_date: None,
        file_date: Utc.with_ymd_and_hms(2024, 7, 5, 9, 0, 0).unwrap(),
        completed: false,
        problem: None,
    }
}
