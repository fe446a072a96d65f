//! Run report export
//!
//! Writes a [`RunReport`] as pretty-printed JSON so a run can be inspected or
//! compared after the fact.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::report::RunReport;

/// Serialize `report` to `writer`
///
/// # Errors
/// Returns an error if serialization or the write fails
pub fn write_report<W: Write>(report: &RunReport, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, report).context("Failed to serialize run report")?;
    writeln!(writer)?;
    writer.flush().context("Failed to flush run report")?;
    Ok(())
}

/// Write `report` to a file at `path`, replacing any existing file
///
/// # Errors
/// Returns an error if the file cannot be created or written
pub fn save_report(report: &RunReport, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create report file {}", path.display()))?;
    write_report(report, BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Pid, Region, SplitThreshold};
    use crate::report::{Outcome, OutcomeCounts, RegionEvent};
    use crate::split::SplitStats;
    use std::time::Duration;

    fn sample_report() -> RunReport {
        let region = Region::new(0x1000, 0x2000, 4096);
        RunReport {
            pid: Pid(4321),
            dry_run: false,
            workers: 2,
            split_threshold: SplitThreshold::default(),
            swapped_bytes: 4096,
            scanned_regions: 1,
            split: SplitStats { initial: 1, broken: 0, children: 0, skipped: 1 },
            expected_bytes: 4096,
            eligible_regions: 1,
            recovered_bytes: 0,
            unrecovered_bytes: 4096,
            outcomes: OutcomeCounts { ok: 0, warn: 1, err: 0, noop: 0 },
            events: vec![RegionEvent {
                worker: 1,
                region,
                outcome: Outcome::Warn { failed: 1, attempted: 1 },
            }],
            elapsed: Duration::from_millis(1500),
        }
    }

    #[test]
    fn test_report_json_structure() {
        let mut buffer = Vec::new();
        write_report(&sample_report(), &mut buffer).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&buffer).expect("Invalid JSON");
        assert_eq!(parsed["pid"], 4321);
        assert_eq!(parsed["split_threshold"], 65536);
        assert_eq!(parsed["elapsed"], 1.5);
        assert_eq!(parsed["events"][0]["outcome"]["kind"], "warn");
        assert_eq!(parsed["events"][0]["outcome"]["failed"], 1);
        assert_eq!(parsed["events"][0]["region"]["offset"], 4096);
    }

    #[test]
    fn test_save_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        save_report(&sample_report(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"unrecovered_bytes\": 4096"));
    }
}
