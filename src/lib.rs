//! Structured model of `git diff --word-diff=porcelain` output.
//!
//! [`parse_diff`] turns the raw text into one [`FileDiff`] per path. Each
//! hunk carries two reconstructions of its word-level fragments: merged
//! lines (both sides on one record) and paired lines (one record per side,
//! matched up for side-by-side display).

pub mod app;
pub mod config;
pub mod git;
pub mod logging;

pub use git::{
    parse_diff, DiffError, FileDiff, FileDiffs, FileInfo, HeaderMeta, Hunk, HunkHeader,
    MergedLine, PairedLine, SplitSideLine,
};
