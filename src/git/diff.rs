use super::error::{DiffError, Result};
use super::merged::{merge_lines, MergedLine};
use super::split::{pair_lines, PairedLine, Side};
use super::status::FileStatus;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Separates one file's block from the next in `git diff` output
pub const FILE_SEPARATOR: &str = "diff --git ";
/// Separates hunks inside a file block; the leading newline belongs to the previous hunk
pub const HUNK_SEPARATOR: &str = "\n@@";
pub const HUNK_MARKER: &str = "@@";

// ── Fragment markers ──

/// Leading character of a porcelain fragment line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marker {
    Context,
    Remove,
    Add,
    /// `~`, ends a logical source line
    Terminator,
    /// Anything else, e.g. `\ No newline at end of file`
    Other,
}

impl Marker {
    /// Marker of a fragment, `None` for an empty fragment
    pub(crate) fn of(fragment: &str) -> Option<Marker> {
        let marker = match fragment.as_bytes().first()? {
            b' ' => Marker::Context,
            b'-' => Marker::Remove,
            b'+' => Marker::Add,
            b'~' => Marker::Terminator,
            _ => Marker::Other,
        };
        Some(marker)
    }
}

// ── Model ──

/// One side's starting line number and span, from a `-a,b` / `+c,d` token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct HeaderMeta {
    pub from: usize,
    pub length: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct HeaderRanges {
    pub remove: HeaderMeta,
    pub add: HeaderMeta,
}

impl HeaderRanges {
    pub fn side(&self, side: Side) -> HeaderMeta {
        match side {
            Side::Remove => self.remove,
            Side::Add => self.add,
        }
    }
}

/// Parsed `@@ -a,b +c,d @@ title` line
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct HunkHeader {
    pub meta: HeaderRanges,
    /// Trailing context snippet, empty when git printed none
    pub title: String,
}

impl fmt::Display for HunkHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let HeaderRanges { remove, add } = self.meta;
        write!(
            f,
            "@@ -{},{} +{},{} @@",
            remove.from, remove.length, add.from, add.length
        )?;
        if !self.title.is_empty() {
            write!(f, " {}", self.title)?;
        }
        Ok(())
    }
}

/// Lines of a file block before its first hunk, kept verbatim
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct FileInfo {
    /// Raw `a/...` token
    pub path_a: String,
    /// Raw `b/...` token
    pub path_b: String,
    /// Second line: index, mode change, rename similarity...
    pub meta: String,
    pub legend: Vec<String>,
}

impl FileInfo {
    /// Map key for this file: `path_a` without its `a/` prefix
    pub fn path_key(&self) -> &str {
        let mut chars = self.path_a.chars();
        chars.next();
        chars.next();
        chars.as_str()
    }

    pub fn status(&self) -> FileStatus {
        FileStatus::detect(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Hunk {
    pub header: HunkHeader,
    pub merged_lines: Vec<MergedLine>,
    pub paired_lines: Vec<PairedLine>,
}

impl Hunk {
    /// Logical lines with an add side. Counted on the merged records, which
    /// keep every fragment even where the paired rows drop a trailing run.
    pub fn adds(&self) -> usize {
        self.merged_lines.iter().filter(|line| line.is_add).count()
    }

    /// Logical lines with a remove side
    pub fn dels(&self) -> usize {
        self.merged_lines.iter().filter(|line| line.is_remove).count()
    }
}

/// A file with its parsed hunks
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct FileDiff {
    pub info: FileInfo,
    pub hunks: Vec<Hunk>,
}

impl FileDiff {
    pub fn adds(&self) -> usize {
        self.hunks.iter().map(Hunk::adds).sum()
    }

    pub fn dels(&self) -> usize {
        self.hunks.iter().map(Hunk::dels).sum()
    }
}

/// Path → `FileDiff`, in order of first appearance.
///
/// Inserting a path that is already present replaces its diff but keeps the
/// original position, so a repeated path resolves to its last block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDiffs {
    entries: Vec<(String, FileDiff)>,
    index: HashMap<String, usize>,
}

impl FileDiffs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the replaced diff when `path` was already present
    pub fn insert(&mut self, path: String, file: FileDiff) -> Option<FileDiff> {
        if let Some(&idx) = self.index.get(&path) {
            return Some(std::mem::replace(&mut self.entries[idx].1, file));
        }
        self.index.insert(path.clone(), self.entries.len());
        self.entries.push((path, file));
        None
    }

    pub fn get(&self, path: &str) -> Option<&FileDiff> {
        self.index.get(path).map(|&idx| &self.entries[idx].1)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileDiff)> {
        self.entries.iter().map(|(path, file)| (path.as_str(), file))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(path, _)| path.as_str())
    }
}

impl FromIterator<(String, FileDiff)> for FileDiffs {
    fn from_iter<I: IntoIterator<Item = (String, FileDiff)>>(iter: I) -> Self {
        let mut files = FileDiffs::new();
        for (path, file) in iter {
            files.insert(path, file);
        }
        files
    }
}

impl IntoIterator for FileDiffs {
    type Item = (String, FileDiff);
    type IntoIter = std::vec::IntoIter<(String, FileDiff)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for FileDiffs {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serialize_entries(serializer, self.entries.iter().map(|(path, file)| (path, file)))
    }
}

/// Serialize key/value pairs as a map in iteration order
pub(crate) fn serialize_entries<S, K, V, I>(
    serializer: S,
    entries: I,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
    K: Serialize,
    V: Serialize,
    I: ExactSizeIterator<Item = (K, V)>,
{
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (key, value) in entries {
        map.serialize_entry(&key, &value)?;
    }
    map.end()
}

// ── Block splitting ──

/// Parse the full stdout of `git diff --word-diff=porcelain` into per-file diffs.
///
/// Fails on the first malformed file block; nothing is returned for the
/// blocks that parsed before it.
pub fn parse_diff(raw: &str) -> Result<FileDiffs> {
    let mut files = FileDiffs::new();

    for block in split_file_blocks(raw) {
        let file = parse_file_block(block)?;
        let path = file.info.path_key().to_string();
        log::debug!("parsed {} with {} hunk(s)", path, file.hunks.len());
        if files.insert(path, file).is_some() {
            log::debug!("repeated file block replaced an earlier one");
        }
    }

    Ok(files)
}

/// Split raw output into per-file blocks, each without its `diff --git ` prefix
pub fn split_file_blocks(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(FILE_SEPARATOR).filter(|block| !block.is_empty())
}

/// Parse one file block: file info followed by zero or more hunks
pub fn parse_file_block(block: &str) -> Result<FileDiff> {
    let mut parts = block.split(HUNK_SEPARATOR);
    let info = parse_file_info(parts.next().unwrap_or_default())?;

    let hunks = parts
        .map(|part| parse_hunk(&format!("{HUNK_MARKER}{part}")))
        .collect::<Result<Vec<_>>>()?;

    Ok(FileDiff { info, hunks })
}

/// Parse the text before a file's first hunk
pub fn parse_file_info(block: &str) -> Result<FileInfo> {
    let mut lines = block.split('\n');
    let paths = lines.next().unwrap_or_default();

    let mut tokens = paths.split_whitespace();
    let (Some(path_a), Some(path_b)) = (tokens.next(), tokens.next()) else {
        return Err(DiffError::malformed(format!(
            "expected two path tokens, got {paths:?}"
        )));
    };

    Ok(FileInfo {
        path_a: path_a.to_string(),
        path_b: path_b.to_string(),
        meta: lines.next().unwrap_or_default().to_string(),
        legend: lines.map(str::to_string).collect(),
    })
}

/// Parse one hunk block starting with its `@@` header line
pub fn parse_hunk(block: &str) -> Result<Hunk> {
    let mut lines = block.split('\n');
    let header = parse_hunk_header(lines.next().unwrap_or_default())?;
    let fragments: Vec<&str> = lines.collect();

    log::debug!("hunk {} with {} fragment(s)", header, fragments.len());

    Ok(Hunk {
        merged_lines: merge_lines(&fragments, &header),
        paired_lines: pair_lines(&fragments, &header),
        header,
    })
}

/// Parse a hunk header like "@@ -10,4 +10,15 @@ fn foo()".
///
/// The leading `@@` is optional so callers may pass the line with or
/// without it.
pub fn parse_hunk_header(line: &str) -> Result<HunkHeader> {
    let line = line.trim();
    let line = line.strip_prefix(HUNK_MARKER).unwrap_or(line).trim_start();

    let (ranges, title) = match line.split_once(" @@ ") {
        Some((ranges, title)) => (ranges, title),
        None => (line.strip_suffix(HUNK_MARKER).unwrap_or(line), ""),
    };

    let mut tokens = ranges.split_whitespace();
    let (Some(remove), Some(add), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(DiffError::malformed(format!(
            "expected two hunk ranges, got {ranges:?}"
        )));
    };

    Ok(HunkHeader {
        meta: HeaderRanges {
            remove: parse_header_meta(remove)?,
            add: parse_header_meta(add)?,
        },
        title: title.to_string(),
    })
}

/// Parse "-start,length" or "+start,length"; the sign character is dropped
pub fn parse_header_meta(token: &str) -> Result<HeaderMeta> {
    let mut chars = token.chars();
    chars.next();
    let body = chars.as_str();

    let (from, length) = body
        .split_once(',')
        .ok_or_else(|| DiffError::malformed(format!("hunk range {token:?} has no comma")))?;

    let number = |part: &str| {
        part.parse::<usize>().map_err(|_| {
            DiffError::malformed(format!("hunk range {token:?} has non-numeric part {part:?}"))
        })
    };

    Ok(HeaderMeta {
        from: number(from)?,
        length: number(length)?,
    })
}
