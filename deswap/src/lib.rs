//! # deswap - Bring swapped-out memory back into RAM
//!
//! deswap forces the kernel to fault a process's swapped-out pages back in by
//! reading them through `/proc/<pid>/mem`, at the ranges `/proc/<pid>/smaps`
//! reports as swapped. It does not change memory contents and does not pin the
//! pages afterwards; the kernel is free to evict them again.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────┐
//! │  /proc/<pid>/smaps   │
//! └──────────┬───────────┘
//!            ▼
//! ┌──────────────────────┐   ┌──────────────────────┐
//! │   Scanner (smaps)    │──▶│   Splitter (split)   │
//! └──────────────────────┘   └──────────┬───────────┘
//!                                       ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Swap-in engine (yank)                │
//! │  dispatcher ══▶ worker 0..N ──▶ /proc/<pid>/mem reads   │
//! │                     │                                   │
//! │                     ▼                                   │
//! │                aggregator ──▶ RunReport                 │
//! └─────────────────────────────────────────────────────────┘
//!            │                          │
//!            ▼                          ▼
//! ┌──────────────────────┐   ┌──────────────────────┐
//! │  display (terminal)  │   │   export (JSON)      │
//! └──────────────────────┘   └──────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`smaps`]: parse the mapping descriptor into swapped [`domain::Region`]s
//! - [`split`]: break regions above the split threshold into bounded children
//! - [`yank`]: dispatcher, worker pool and byte accounting
//! - [`report`]: per-region outcomes and the final run report
//! - [`display`], [`export`], [`units`]: rendering and persistence
//! - [`cli`], [`preflight`], [`process_lookup`]: the command-line front end
//! - [`domain`]: core types and errors
//!
//! ## Typical Usage
//!
//! ```bash
//! # Swap in a process with four parallel readers
//! sudo deswap --pid <PID> -j 4
//!
//! # See what would be read, region by region, without touching memory
//! sudo deswap my-app --dry-run -v
//! ```

pub mod cli;
pub mod display;
pub mod domain;
pub mod export;
pub mod preflight;
pub mod process_lookup;
pub mod report;
pub mod smaps;
pub mod split;
pub mod units;
pub mod yank;

pub use yank::{deswap, prepare, swap_in, RunConfig};
