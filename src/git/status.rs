use super::diff::FileInfo;
use serde::Serialize;

/// File change status, read from a file block's extended header lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "from", rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed(String), // old path
    Copied(String),  // source path
}

impl FileStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            FileStatus::Added => "+",
            FileStatus::Modified => "~",
            FileStatus::Deleted => "-",
            FileStatus::Renamed(_) => "R",
            FileStatus::Copied(_) => "C",
        }
    }

    /// Scan the meta line and legend; the verbatim fields are left untouched
    pub fn detect(info: &FileInfo) -> FileStatus {
        let lines = std::iter::once(info.meta.as_str()).chain(info.legend.iter().map(String::as_str));

        for line in lines {
            if line.starts_with("new file mode") {
                return FileStatus::Added;
            }
            if line.starts_with("deleted file mode") {
                return FileStatus::Deleted;
            }
            if let Some(old_path) = line.strip_prefix("rename from ") {
                return FileStatus::Renamed(old_path.to_string());
            }
            if let Some(source) = line.strip_prefix("copy from ") {
                return FileStatus::Copied(source.to_string());
            }
        }

        FileStatus::Modified
    }
}
