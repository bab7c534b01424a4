mod args;
mod diff;
mod error;
mod fingerprint;
mod merged;
mod split;
mod status;

pub use args::{word_diff_args, DiffOptions};
pub(crate) use diff::serialize_entries;
pub use diff::{
    parse_diff, parse_file_block, parse_file_info, parse_header_meta, parse_hunk,
    parse_hunk_header, split_file_blocks, FileDiff, FileDiffs, FileInfo, HeaderMeta, HeaderRanges,
    Hunk, HunkHeader, FILE_SEPARATOR, HUNK_MARKER, HUNK_SEPARATOR,
};
pub use error::{DiffError, Result};
pub use fingerprint::diff_hash;
pub use merged::{merge_lines, MergedLine};
pub use split::{pair_lines, PairedLine, Side, SideSplitter, SplitSideLine};
pub use status::FileStatus;
