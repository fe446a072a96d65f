//! Swapped region discovery from `/proc/<pid>/smaps`
//!
//! Each mapping in smaps starts with a header line such as
//! `00400000-00452000 r-xp 00000000 08:02 173521 /usr/bin/dbus-daemon`, followed by
//! `Key: value` attribute lines. The `Swap:` attribute tells how much of the mapping
//! currently lives in swap. Only mappings with a non-zero `Swap:` are kept.

use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::domain::{Region, ScanError};

/// Mapping bounds taken from a header line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingHeader {
    pub start: u64,
    pub end: u64,
}

/// One classified smaps line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line {
    /// A well-formed mapping header
    Header(MappingHeader),
    /// Something shaped like a header whose fields do not parse
    BadHeader,
    /// `Swap: <n> kB`, converted to bytes (0 when the number is malformed)
    Swap(u64),
    /// Any other attribute line
    Other,
}

/// Scan the descriptor at `path` into swapped regions, in file order
///
/// # Errors
/// Returns [`ScanError`] if the file cannot be opened or a read fails midway
pub fn scan_smaps(path: &Path) -> Result<Vec<Region>, ScanError> {
    let file =
        File::open(path).map_err(|source| ScanError::Open { path: path.to_path_buf(), source })?;

    let regions = parse_smaps(BufReader::new(file))
        .map_err(|source| ScanError::Read { path: path.to_path_buf(), source })?;

    debug!("{}: {} swapped regions", path.display(), regions.len());
    Ok(regions)
}

/// Parse smaps content from any buffered reader
///
/// # Errors
/// Propagates read errors from `reader`
pub fn parse_smaps<R: BufRead>(reader: R) -> std::io::Result<Vec<Region>> {
    let mut regions = Vec::new();
    // Mapping opened by the most recent header; `None` after a malformed header
    // or once its swap figure has been consumed.
    let mut current: Option<MappingHeader> = None;

    for line in reader.lines() {
        let line = line?;
        match classify(&line) {
            Line::Header(header) => current = Some(header),
            Line::BadHeader => {
                debug!("skipping malformed mapping header: {line}");
                current = None;
            }
            Line::Swap(bytes) => {
                if let Some(header) = current.take() {
                    if bytes > 0 {
                        regions.push(Region::new(header.start, header.end, bytes));
                    }
                }
            }
            Line::Other => {}
        }
    }

    Ok(regions)
}

fn classify(line: &str) -> Line {
    let mut fields = line.split_whitespace();
    let Some(first) = fields.next() else {
        return Line::Other;
    };

    // Attribute keys always end in ':'
    if let Some(key) = first.strip_suffix(':') {
        return if key == "Swap" { Line::Swap(parse_swap_kb(fields)) } else { Line::Other };
    }

    if !first.contains('-') {
        return Line::Other;
    }

    match parse_header(first, fields.next()) {
        Some(header) => Line::Header(header),
        None => Line::BadHeader,
    }
}

/// Parse `<start-hex>-<end-hex>` plus the 4-character permission field
///
/// Returns `None` when either address is malformed or the range is empty.
fn parse_header(range: &str, perms: Option<&str>) -> Option<MappingHeader> {
    let perms = perms?;
    if perms.len() != 4 || !perms.chars().all(|c| matches!(c, 'r' | 'w' | 'x' | 'p' | 's' | '-')) {
        return None;
    }

    let (start, end) = range.split_once('-')?;
    let start = u64::from_str_radix(start, 16).ok()?;
    let end = u64::from_str_radix(end, 16).ok()?;
    (start < end).then_some(MappingHeader { start, end })
}

/// Parse the value of a `Swap:` line into bytes
///
/// Anything other than `<decimal> kB` yields 0, which disqualifies the mapping.
fn parse_swap_kb<'a>(mut fields: impl Iterator<Item = &'a str>) -> u64 {
    let (Some(value), Some("kB")) = (fields.next(), fields.next()) else {
        return 0;
    };
    value.parse::<u64>().ok().and_then(|kb| kb.checked_mul(1024)).unwrap_or(0)
}
