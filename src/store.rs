//! Persisted table of discovered track links.
//!
//! A flat CSV file with a `Title,Link` header, one record per distinct
//! link. The file is read fully, merged in memory, and rewritten wholesale;
//! there is no appending and no concurrent-writer protection (single
//! process, single run).

use std::fmt;
use std::fs;
use std::path::Path;

const HEADER: &str = "Title,Link";

#[derive(Clone, Debug, PartialEq)]
pub struct LinkRecord {
    pub title: String,
    pub link: String,
}

impl LinkRecord {
    pub fn new(title: &str, link: &str) -> Self {
        LinkRecord {
            title: String::from(title),
            link: String::from(link),
        }
    }
}

/// The existing table could not be used: the caller should warn loudly and
/// treat the prior as empty, since saving will discard whatever was there.
#[derive(Debug)]
pub struct ReadFault(pub String);

impl fmt::Display for ReadFault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "link table unreadable: {}", self.0)
    }
}

impl std::error::Error for ReadFault {}

/// Load all records. A missing file is an empty prior, not a fault;
/// an unreadable or structurally broken file is a [`ReadFault`].
pub fn load(path: &Path) -> Result<Vec<LinkRecord>, ReadFault> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ReadFault(e.to_string())),
    };

    let mut rows = parse_csv(&contents).map_err(ReadFault)?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let header = rows.remove(0);
    if header.len() < 2 || header[0] != "Title" || header[1] != "Link" {
        return Err(ReadFault(format!("unexpected header: {}", header.join(","))));
    }

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        if row.len() < 2 {
            return Err(ReadFault(format!("row {} has {} fields", i + 2, row.len())));
        }
        if row[1].is_empty() {
            continue; // a title without a link is useless
        }
        records.push(LinkRecord::new(&row[0], &row[1]));
    }
    Ok(records)
}

/// Rewrite the whole table.
pub fn save(path: &Path, records: &[LinkRecord]) -> crate::types::UnitResult {
    if let Some(parent) = path.parent() {
        crate::util::guarantee_dir_path(parent.to_path_buf())?;
    }

    let mut out = String::from(HEADER);
    out.push('\n');
    for record in records {
        out.push_str(&quote(&record.title));
        out.push(',');
        out.push_str(&quote(&record.link));
        out.push('\n');
    }
    fs::write(path, out)?;
    Ok(())
}

/// Merge freshly scraped records into the existing table.
///
/// Fresh records are logically newer: when a link appears in both sets the
/// fresh title wins (last-write-wins by position; no timestamps exist).
/// Order is the first-occurrence order of each kept link across
/// existing-then-fresh. Idempotent.
///
/// Returns the merged records and how many links are new.
pub fn merge(
    existing: &[LinkRecord],
    fresh: &[LinkRecord],
) -> (Vec<LinkRecord>, usize) {
    let mut merged: Vec<LinkRecord> = Vec::with_capacity(existing.len() + fresh.len());
    for record in existing.iter().chain(fresh.iter()) {
        if let Some(slot) = merged.iter_mut().find(|r| r.link == record.link) {
            slot.title = record.title.clone();
        } else {
            merged.push(record.clone());
        }
    }
    // saturating: a prior table with duplicate links shrinks on merge
    let added = merged.len().saturating_sub(existing.len());
    (merged, added)
}

fn quote(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        String::from(field)
    }
}

/// Minimal quote-aware CSV reader: `"` opens a quoted field, `""` inside it
/// is a literal quote, newlines inside quotes belong to the field.
fn parse_csv(contents: &str) -> Result<Vec<Vec<String>>, String> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = contents.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => in_quotes = true,
            '"' => return Err(String::from("stray quote inside unquoted field")),
            ',' => {
                row.push(std::mem::take(&mut field));
                // keep building the current row
            }
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(std::mem::take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(String::from("unterminated quoted field"));
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    Ok(rows)
}
