use deswap::domain::{Pid, ScanError, SplitThreshold, TargetProcess};
use deswap::report::Outcome;
use deswap::yank::{swap_in, ProcMem, RunConfig};
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};

/// Three swapped mappings plus one with nothing in swap
const SMAPS: &str = "\
00001000-00003000 r-xp 00000000 08:02 173521 /usr/bin/fake
Size:                  8 kB
Rss:                   0 kB
Swap:                  8 kB
SwapPss:               8 kB
VmFlags: rd ex mr mw me dw
00004000-00005000 rw-p 00000000 00:00 0
Size:                  4 kB
Swap:                  0 kB
00008000-0001a000 rw-p 00000000 00:00 0                                  [heap]
Size:                 72 kB
Swap:                 72 kB
00020000-00021000 rw-s 00000000 00:05 12                                 /dev/shm/fake
Size:                  4 kB
Swap:                  4 kB
";

struct Fixture {
    _dir: TempDir,
    target: TargetProcess,
}

fn fixture(smaps: &str, mem_len: usize) -> Fixture {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let smaps_path = dir.path().join("smaps");
    let mem_path = dir.path().join("mem");
    std::fs::write(&smaps_path, smaps).unwrap();
    std::fs::write(&mem_path, vec![0x5a; mem_len]).unwrap();
    Fixture { target: TargetProcess::from_paths(Pid(1), smaps_path, mem_path), _dir: dir }
}

fn config(workers: usize, split: u64) -> RunConfig {
    let mut config = RunConfig::new(workers, SplitThreshold::new(split).unwrap(), false).unwrap();
    config.page_size = NonZeroUsize::new(4096).unwrap();
    config
}

fn dry_run_config(workers: usize, split: u64) -> RunConfig {
    RunConfig { dry_run: true, ..config(workers, split) }
}

#[test]
fn test_full_run_recovers_every_swapped_byte() {
    let fx = fixture(SMAPS, 0x40000);
    let source = ProcMem::for_target(&fx.target);

    let report = swap_in(&fx.target, &source, &config(2, 16 * 1024), |_| {}).unwrap();

    assert_eq!(report.scanned_regions, 3);
    assert_eq!(report.swapped_bytes, (8 + 72 + 4) * 1024);
    // The 72 kB heap is split into 16 kB children: 4 full plus an 8 kB tail
    assert_eq!(report.split.broken, 1);
    assert_eq!(report.split.children, 5);
    assert_eq!(report.eligible_regions, 7);
    assert_eq!(report.expected_bytes, (8 + 72 + 4) * 1024);
    assert_eq!(report.recovered_bytes, report.expected_bytes);
    assert_eq!(report.outcomes.ok, 7);
    assert!(report.verify().is_ok());
}

#[test]
fn test_worker_count_does_not_change_totals() {
    let fx = fixture(SMAPS, 0x40000);
    let source = ProcMem::for_target(&fx.target);

    let single = swap_in(&fx.target, &source, &config(1, 4096), |_| {}).unwrap();
    let many = swap_in(&fx.target, &source, &config(8, 4096), |_| {}).unwrap();

    assert_eq!(single.recovered_bytes, many.recovered_bytes);
    assert_eq!(single.expected_bytes, many.expected_bytes);

    let mut single_offsets: Vec<u64> = single.events.iter().map(|e| e.region.offset).collect();
    let mut many_offsets: Vec<u64> = many.events.iter().map(|e| e.region.offset).collect();
    single_offsets.sort_unstable();
    many_offsets.sort_unstable();
    assert_eq!(single_offsets, many_offsets);
}

#[test]
fn test_dry_run_touches_no_memory() {
    let fx = fixture(SMAPS, 0);
    // Nothing exists at this path; any open would turn into an ERR outcome
    let source = ProcMem::new(fx.target.mem_path().join("missing"));

    let mut observed = 0;
    let report = swap_in(&fx.target, &source, &dry_run_config(4, 0), |_| observed += 1).unwrap();

    assert_eq!(observed, 3);
    assert_eq!(report.recovered_bytes, 0);
    assert!(report.events.iter().all(|e| e.outcome == Outcome::NoOp));
    assert!(report.verify().is_ok());
}

#[test]
fn test_unreadable_memory_fails_consistency_check() {
    let fx = fixture(SMAPS, 0);
    let source = ProcMem::new(Path::new("/nonexistent/deswap/mem"));

    let report = swap_in(&fx.target, &source, &config(2, 0), |_| {}).unwrap();

    assert_eq!(report.outcomes.err, 3);
    assert_eq!(report.unrecovered_bytes, report.expected_bytes);
    let err = report.verify().unwrap_err();
    assert_eq!(err.shortfall(), (8 + 72 + 4) * 1024);
    assert!(err.to_string().contains("read-diff: 84 kB"));
}

#[test]
fn test_no_swapped_regions_is_an_empty_success() {
    let smaps = "\
00400000-00401000 r-xp 00000000 00:00 0
Swap: 0 kB
00600000-00601000 rw-p 00000000 00:00 0
Swap: 0 kB
";
    let fx = fixture(smaps, 0);
    let source = ProcMem::for_target(&fx.target);

    let report = swap_in(&fx.target, &source, &config(8, 65536), |_| {}).unwrap();
    assert_eq!(report.expected_bytes, 0);
    assert_eq!(report.recovered_bytes, 0);
    assert!(report.events.is_empty());
    assert!(report.verify().is_ok());
}

#[test]
fn test_missing_descriptor_is_a_scan_error() {
    let mem = NamedTempFile::new().unwrap();
    let target = TargetProcess::from_paths(Pid(1), "/nonexistent/deswap/smaps", mem.path());
    let source = ProcMem::for_target(&target);

    let result = swap_in(&target, &source, &config(1, 0), |_| {});
    assert!(matches!(result, Err(ScanError::Open { .. })));
}

#[test]
fn test_memory_shorter_than_region_is_not_a_failure() {
    // End of stream mid-region ends the read loop without counting failures
    let mut smaps = NamedTempFile::new().unwrap();
    write!(smaps, "00001000-00009000 rw-p 00000000 00:00 0\nSwap: 32 kB\n").unwrap();
    let mut mem = NamedTempFile::new().unwrap();
    mem.write_all(&[0u8; 0x2000]).unwrap();

    let target = TargetProcess::from_paths(Pid(1), smaps.path(), mem.path());
    let report = swap_in(&target, &ProcMem::for_target(&target), &config(1, 0), |_| {}).unwrap();

    assert_eq!(report.events.len(), 1);
    assert_eq!(report.events[0].outcome, Outcome::Ok { chunks: 1 });
    assert!(report.verify().is_ok());
}

#[test]
fn test_dry_run_against_own_process() {
    // Live /proc check; how much of us is swapped depends on the host
    let target = TargetProcess::new(Pid(std::process::id()));
    let report = deswap::deswap(&target, &dry_run_config(2, 65536), |_| {});

    #[cfg(target_os = "linux")]
    {
        let report = report.expect("Dry run over our own process should succeed");
        assert_eq!(report.outcomes.noop, report.eligible_regions);
    }
    #[cfg(not(target_os = "linux"))]
    assert!(report.is_err());
}
