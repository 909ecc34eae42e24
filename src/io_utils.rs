//! I/O utilities for reading source sheets and writing results.
//!
//! - **Delimiter resolution**: explicit flag, then settings, then the file
//!   extension (`.tsv` → tab, otherwise comma).
//! - **Encoding**: input decoding via `encoding_rs`, defaulting to UTF-8.
//! - **Source tables**: [`read_table()`] loads a header row plus data rows;
//!   ragged rows are accepted as-is because sheet exports trim trailing blanks.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};
use log::debug;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

/// Header row plus data rows, as supplied by a spreadsheet export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_csv_reader_from_path(path: &Path, delimiter: u8) -> Result<csv::Reader<Box<dyn Read>>> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    Ok(open_csv_reader(reader, delimiter))
}

pub fn open_writer(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(std::io::stdout()),
    })
}

pub fn open_csv_writer(path: Option<&Path>, delimiter: u8) -> Result<csv::Writer<Box<dyn Write>>> {
    let writer = open_writer(path)?;
    let mut builder = csv::WriterBuilder::new();
    builder.delimiter(delimiter).double_quote(true);
    Ok(builder.from_writer(writer))
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

/// First record is the header; an entirely empty input yields an empty table.
///
/// Blank lines are kept as empty rows so positions line up with sheet rows.
/// The csv reader skips them, so they are recovered from the newlines each
/// read consumed beyond the record's own terminator and quoted line breaks.
/// A final record without a trailing newline that follows blank lines is
/// counted one short.
pub fn read_table_from<R: Read>(
    reader: &mut csv::Reader<R>,
    encoding: &'static Encoding,
) -> Result<SourceTable> {
    let mut record = csv::ByteRecord::new();
    if !reader
        .read_byte_record(&mut record)
        .context("Reading header row")?
    {
        return Ok(SourceTable::default());
    }
    let header = decode_record(&record, encoding)?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut line = reader.position().line();
    while reader
        .read_byte_record(&mut record)
        .with_context(|| format!("Reading row {}", rows.len() + 2))?
    {
        let consumed = reader.position().line() - line;
        line = reader.position().line();
        let quoted_breaks = record.iter().flatten().filter(|&&b| b == b'\n').count() as u64;
        let blank = consumed.saturating_sub(quoted_breaks + 1);
        rows.extend((0..blank).map(|_| Vec::new()));
        let cells = decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {}", rows.len() + 2))?;
        rows.push(cells);
    }
    Ok(SourceTable { header, rows })
}

pub fn read_table(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<SourceTable> {
    let mut reader = open_csv_reader_from_path(path, delimiter)?;
    let table = read_table_from(&mut reader, encoding)
        .with_context(|| format!("Reading source table {path:?}"))?;
    debug!(
        "Loaded {} header cell(s) and {} data row(s) from {:?}",
        table.header.len(),
        table.rows.len(),
        path
    );
    Ok(table)
}
