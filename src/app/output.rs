use crate::git::{
    serialize_entries, FileDiffs, FileInfo, FileStatus, Hunk, HunkHeader, MergedLine, PairedLine,
};
use anyhow::Result;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Which line models to include for each hunk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Merged,
    Split,
    #[default]
    Both,
}

impl OutputMode {
    fn merged(self) -> bool {
        matches!(self, OutputMode::Merged | OutputMode::Both)
    }

    fn split(self) -> bool {
        matches!(self, OutputMode::Split | OutputMode::Both)
    }
}

#[derive(Serialize)]
struct HunkView<'a> {
    header: &'a HunkHeader,
    #[serde(skip_serializing_if = "Option::is_none")]
    merged_lines: Option<&'a [MergedLine]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    paired_lines: Option<&'a [PairedLine]>,
}

impl<'a> HunkView<'a> {
    fn new(hunk: &'a Hunk, mode: OutputMode) -> Self {
        Self {
            header: &hunk.header,
            merged_lines: mode.merged().then_some(hunk.merged_lines.as_slice()),
            paired_lines: mode.split().then_some(hunk.paired_lines.as_slice()),
        }
    }
}

#[derive(Serialize)]
struct FileView<'a> {
    info: &'a FileInfo,
    status: FileStatus,
    adds: usize,
    dels: usize,
    hunks: Vec<HunkView<'a>>,
}

/// Keeps the path order of `FileDiffs` in the emitted object
struct FilesView<'a>(Vec<(&'a str, FileView<'a>)>);

impl Serialize for FilesView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serialize_entries(serializer, self.0.iter().map(|(path, file)| (path, file)))
    }
}

#[derive(Serialize)]
struct Report<'a> {
    diff_hash: &'a str,
    files: FilesView<'a>,
}

/// Render parsed files as the `pdiff parse` JSON document
pub fn render_json(
    diff_hash: &str,
    files: &FileDiffs,
    mode: OutputMode,
    pretty: bool,
) -> Result<String> {
    let files = FilesView(
        files
            .iter()
            .map(|(path, file)| {
                let view = FileView {
                    info: &file.info,
                    status: file.info.status(),
                    adds: file.adds(),
                    dels: file.dels(),
                    hunks: file.hunks.iter().map(|h| HunkView::new(h, mode)).collect(),
                };
                (path, view)
            })
            .collect(),
    );
    let report = Report { diff_hash, files };

    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::parse_diff;
    use serde_json::Value;

    const RAW: &str = "diff --git a/z.rs b/z.rs
new file mode 100644
index 0000000..1111111
--- /dev/null
+++ b/z.rs
@@ -0,0 +1,1 @@
+fn z() {}
~
diff --git a/a.rs b/a.rs
index 2222222..3333333 100644
--- a/a.rs
+++ b/a.rs
@@ -3,2 +3,2 @@ mod a
 let x =
-1
+2
~
 tail
~
";

    fn render(mode: OutputMode) -> Value {
        let files = parse_diff(RAW).unwrap();
        let json = render_json("abc", &files, mode, false).unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_both_mode_has_both_models() {
        let value = render(OutputMode::Both);
        let hunk = &value["files"]["a.rs"]["hunks"][0];
        assert!(hunk.get("merged_lines").is_some());
        assert!(hunk.get("paired_lines").is_some());
        assert_eq!(hunk["header"]["meta"]["remove"]["from"], 3);
        assert_eq!(hunk["header"]["title"], "mod a");
        assert_eq!(value["diff_hash"], "abc");
    }

    #[test]
    fn test_merged_mode_omits_paired_lines() {
        let value = render(OutputMode::Merged);
        let hunk = &value["files"]["a.rs"]["hunks"][0];
        assert!(hunk.get("paired_lines").is_none());
        assert_eq!(hunk["merged_lines"][0]["remove_line_no"], 3);
    }

    #[test]
    fn test_split_mode_omits_merged_lines() {
        let value = render(OutputMode::Split);
        let hunk = &value["files"]["z.rs"]["hunks"][0];
        assert!(hunk.get("merged_lines").is_none());
        assert_eq!(hunk["paired_lines"][0]["remove"], Value::Null);
        assert_eq!(hunk["paired_lines"][0]["add"]["line_no"], 1);
    }

    #[test]
    fn test_file_summary_fields() {
        let value = render(OutputMode::Both);
        assert_eq!(value["files"]["z.rs"]["status"]["kind"], "added");
        assert_eq!(value["files"]["z.rs"]["adds"], 1);
        assert_eq!(value["files"]["a.rs"]["status"]["kind"], "modified");
        assert_eq!(value["files"]["a.rs"]["dels"], 1);
    }

    #[test]
    fn test_paths_keep_input_order() {
        let files = parse_diff(RAW).unwrap();
        let json = render_json("abc", &files, OutputMode::Both, true).unwrap();
        assert!(json.find("\"z.rs\"").unwrap() < json.find("\"a.rs\"").unwrap());
    }
}
