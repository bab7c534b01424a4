use super::diff::{HunkHeader, Marker};
use serde::Serialize;

/// Which half of the side-by-side view a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Remove,
    Add,
}

impl Side {
    fn own(self) -> Marker {
        match self {
            Side::Remove => Marker::Remove,
            Side::Add => Marker::Add,
        }
    }

    fn other(self) -> Marker {
        match self {
            Side::Remove => Marker::Add,
            Side::Add => Marker::Remove,
        }
    }
}

/// One reconstructed line on a single side
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SplitSideLine {
    pub chunks: Vec<String>,
    pub line_no: usize,
    /// Holds at least one fragment of this side's own marker
    pub changed: bool,
}

impl SplitSideLine {
    fn new(line_no: usize) -> Self {
        Self {
            chunks: Vec::new(),
            line_no,
            changed: false,
        }
    }
}

/// One row of the side-by-side model; at least one side is present
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairedLine {
    pub remove: Option<SplitSideLine>,
    pub add: Option<SplitSideLine>,
}

/// Whether a `~` between `prev` and `next` closes the current line on `side`.
///
/// `None` stands for "no fragment there" (start or end of the hunk). Some of
/// these combinations never occur in well-formed git output.
pub(crate) fn closes_line(side: Side, prev: Option<Marker>, next: Option<Marker>) -> bool {
    let own = side.own();
    let is_own_or_context = |marker: Marker| marker == own || marker == Marker::Context;

    match (prev, next) {
        (Some(prev), None) => is_own_or_context(prev) || prev == Marker::Terminator,
        (Some(prev), Some(next)) if is_own_or_context(prev) => {
            is_own_or_context(next) || next == Marker::Terminator
        }
        (Some(Marker::Terminator), Some(next)) => is_own_or_context(next),
        (Some(prev), Some(Marker::Context)) => prev == side.other(),
        _ => false,
    }
}

/// Walks a hunk's fragments for one side, emitting each line as it closes
pub struct SideSplitter<'a> {
    side: Side,
    from: usize,
    fragments: &'a [&'a str],
    current: SplitSideLine,
    emitted: usize,
}

impl<'a> SideSplitter<'a> {
    pub fn new(side: Side, header: &HunkHeader, fragments: &'a [&'a str]) -> Self {
        let from = header.meta.side(side).from;
        Self {
            side,
            from,
            fragments,
            current: SplitSideLine::new(from),
            emitted: 0,
        }
    }

    fn marker_at(&self, index: Option<usize>) -> Option<Marker> {
        index
            .and_then(|idx| self.fragments.get(idx))
            .and_then(|fragment| Marker::of(fragment))
    }

    /// Feed the fragment at `index`; returns the line it closed, if any
    pub fn advance(&mut self, index: usize) -> Option<SplitSideLine> {
        let fragment = *self.fragments.get(index)?;

        match Marker::of(fragment) {
            Some(Marker::Context) => self.current.chunks.push(fragment.to_string()),
            Some(marker) if marker == self.side.own() => {
                self.current.chunks.push(fragment.to_string());
                self.current.changed = true;
            }
            Some(Marker::Terminator) => {
                let prev = self.marker_at(index.checked_sub(1));
                let next = self.marker_at(index.checked_add(1));

                if closes_line(self.side, prev, next) {
                    self.emitted += 1;
                    let next_line =
                        SplitSideLine::new(self.from.saturating_add(self.emitted));
                    let closed = std::mem::replace(&mut self.current, next_line);
                    log::trace!(
                        "{:?} line {} closed at fragment {}",
                        self.side,
                        closed.line_no,
                        index
                    );
                    return Some(closed);
                }
                log::trace!("{:?} line continues past fragment {}", self.side, index);
            }
            _ => {}
        }

        None
    }
}

/// Build the side-by-side rows for one hunk.
///
/// Both sides walk the same fragments independently; a row is emitted at
/// every index where either side closed a line.
pub fn pair_lines(fragments: &[&str], header: &HunkHeader) -> Vec<PairedLine> {
    let fragments: Vec<&str> = fragments
        .iter()
        .copied()
        .filter(|fragment| !fragment.is_empty())
        .collect();

    let mut removes = SideSplitter::new(Side::Remove, header, &fragments);
    let mut adds = SideSplitter::new(Side::Add, header, &fragments);
    let mut paired = Vec::new();

    for index in 0..fragments.len() {
        let remove = removes.advance(index);
        let add = adds.advance(index);
        if remove.is_some() || add.is_some() {
            paired.push(PairedLine { remove, add });
        }
    }

    paired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{merge_lines, HeaderMeta, HeaderRanges};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn header(remove_from: usize, add_from: usize) -> HunkHeader {
        HunkHeader {
            meta: HeaderRanges {
                remove: HeaderMeta { from: remove_from, length: 0 },
                add: HeaderMeta { from: add_from, length: 0 },
            },
            title: String::new(),
        }
    }

    fn line(chunks: &[&str], line_no: usize, changed: bool) -> SplitSideLine {
        SplitSideLine {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            line_no,
            changed,
        }
    }

    // ── Boundary table ──

    #[test]
    fn test_closes_after_own_or_context() {
        use Marker::*;
        for side in [Side::Remove, Side::Add] {
            let own = side.own();
            for prev in [own, Context] {
                for next in [Some(own), Some(Context), Some(Terminator), None] {
                    assert!(closes_line(side, Some(prev), next), "{side:?} {prev:?} {next:?}");
                }
                assert!(!closes_line(side, Some(prev), Some(side.other())));
            }
        }
    }

    #[test]
    fn test_closes_after_terminator() {
        use Marker::*;
        let side = Side::Remove;
        assert!(closes_line(side, Some(Terminator), Some(Remove)));
        assert!(closes_line(side, Some(Terminator), Some(Context)));
        assert!(closes_line(side, Some(Terminator), None));
        assert!(!closes_line(side, Some(Terminator), Some(Terminator)));
        assert!(!closes_line(side, Some(Terminator), Some(Add)));
    }

    #[test]
    fn test_other_side_only_closes_before_context() {
        use Marker::*;
        assert!(closes_line(Side::Remove, Some(Add), Some(Context)));
        assert!(!closes_line(Side::Remove, Some(Add), Some(Add)));
        assert!(!closes_line(Side::Remove, Some(Add), Some(Remove)));
        assert!(!closes_line(Side::Remove, Some(Add), Some(Terminator)));
        assert!(!closes_line(Side::Remove, Some(Add), None));
        assert!(closes_line(Side::Add, Some(Remove), Some(Context)));
    }

    #[test]
    fn test_start_of_hunk_and_unknown_markers_never_close() {
        use Marker::*;
        assert!(!closes_line(Side::Add, None, Some(Context)));
        assert!(!closes_line(Side::Add, None, None));
        assert!(!closes_line(Side::Add, Some(Other), Some(Context)));
    }

    // ── Pairing ──

    #[test]
    fn test_context_rows_pair_both_sides() {
        let rows = pair_lines(&[" a", "~", " b", "~", ""], &header(3, 7));
        assert_eq!(
            rows,
            vec![
                PairedLine {
                    remove: Some(line(&[" a"], 3, false)),
                    add: Some(line(&[" a"], 7, false)),
                },
                PairedLine {
                    remove: Some(line(&[" b"], 4, false)),
                    add: Some(line(&[" b"], 8, false)),
                },
            ]
        );
    }

    #[test]
    fn test_word_change_splits_into_one_row() {
        let rows = pair_lines(&[" x = ", "-1", "+2", "~", " y", "~"], &header(1, 1));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].remove, Some(line(&[" x = ", "-1"], 1, true)));
        assert_eq!(rows[0].add, Some(line(&[" x = ", "+2"], 1, true)));
    }

    #[test]
    fn test_pure_additions_leave_remove_side_absent() {
        let rows = pair_lines(&["+a", "~", "+b", "~"], &header(0, 1));
        assert_eq!(
            rows,
            vec![
                PairedLine {
                    remove: None,
                    add: Some(line(&["+a"], 1, true)),
                },
                PairedLine {
                    remove: None,
                    add: Some(line(&["+b"], 2, true)),
                },
            ]
        );
    }

    #[test]
    fn test_pure_removals_then_context() {
        let rows = pair_lines(&["-a", "~", "-b", "~", " c", "~"], &header(5, 5));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].remove, Some(line(&["-a"], 5, true)));
        assert_eq!(rows[0].add, None);
        assert_eq!(rows[1].remove, Some(line(&["-b"], 6, true)));
        // The removed block ends before context, so the add side gets a blank filler
        assert_eq!(rows[1].add, Some(line(&[], 5, false)));
        assert_eq!(rows[2].remove, Some(line(&[" c"], 7, false)));
        assert_eq!(rows[2].add, Some(line(&[" c"], 6, false)));
    }

    #[test]
    fn test_trailing_word_change_drops_remove_run() {
        // Nothing follows the last terminator, so the remove side never closes
        let rows = pair_lines(&[" keep", "~", "-x", "+y", "~"], &header(1, 1));
        assert_eq!(
            rows,
            vec![
                PairedLine {
                    remove: Some(line(&[" keep"], 1, false)),
                    add: None,
                },
                PairedLine {
                    remove: None,
                    add: Some(line(&[" keep", "+y"], 1, true)),
                },
            ]
        );
        assert!(rows
            .iter()
            .filter_map(|row| row.remove.as_ref())
            .all(|side| !side.chunks.iter().any(|c| c == "-x")));
    }

    #[test]
    fn test_line_numbers_saturate_at_max() {
        let rows = pair_lines(&[" a", "~", " b", "~"], &header(usize::MAX, usize::MAX));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].remove, Some(line(&[" b"], usize::MAX, false)));
        assert_eq!(rows[1].add, Some(line(&[" b"], usize::MAX, false)));
    }

    #[test]
    fn test_remove_side_stays_open_across_added_line() {
        let rows = pair_lines(&[" keep", "~", "+new", "~", " tail", "~"], &header(1, 1));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].remove, None);
        assert_eq!(rows[0].add, Some(line(&[" keep"], 1, false)));
        assert_eq!(rows[1].remove, Some(line(&[" keep"], 1, false)));
        assert_eq!(rows[1].add, Some(line(&["+new"], 2, true)));
        assert_eq!(rows[2].remove, Some(line(&[" tail"], 2, false)));
        assert_eq!(rows[2].add, Some(line(&[" tail"], 3, false)));
    }

    #[test]
    fn test_empty_fragments_are_skipped() {
        let with_blanks = pair_lines(&[" a", "", "~", ""], &header(1, 1));
        let without = pair_lines(&[" a", "~"], &header(1, 1));
        assert_eq!(with_blanks, without);
    }

    #[test]
    fn test_advance_past_end_is_none() {
        let fragments = [" a", "~"];
        let hunk_header = header(1, 1);
        let mut splitter = SideSplitter::new(Side::Add, &hunk_header, &fragments);
        assert_eq!(splitter.advance(0), None);
        assert_eq!(splitter.advance(1), Some(line(&[" a"], 1, false)));
        assert_eq!(splitter.advance(2), None);
    }

    // ── Properties ──

    /// Logical lines that always end in context so every change is flushed
    fn hunk_fragments() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(
            (
                prop::option::of("[a-z]{1,6}"),
                prop::option::of("[a-z]{1,6}"),
                prop::option::of("[a-z]{1,6}"),
            ),
            1..10,
        )
        .prop_map(|lines| {
            let mut fragments = Vec::new();
            for (idx, (context, remove, add)) in lines.into_iter().enumerate() {
                if let Some(word) = context {
                    fragments.push(format!(" {word}{idx}"));
                }
                if let Some(word) = remove {
                    fragments.push(format!("-{word}{idx}"));
                }
                if let Some(word) = add {
                    fragments.push(format!("+{word}{idx}"));
                }
                fragments.push("~".to_string());
            }
            fragments.push(" tail".to_string());
            fragments.push("~".to_string());
            fragments
        })
    }

    proptest! {
        #[test]
        fn prop_split_and_merged_agree_on_changes(fragments in hunk_fragments()) {
            let mut with_tail = fragments.clone();
            with_tail.push(String::new());
            let fragments: Vec<&str> = with_tail.iter().map(String::as_str).collect();
            let hunk_header = header(1, 1);

            let merged = merge_lines(&fragments, &hunk_header);
            let rows = pair_lines(&fragments, &hunk_header);

            for (side, marker) in [(Side::Remove, '-'), (Side::Add, '+')] {
                let from_merged: BTreeSet<&str> = merged
                    .iter()
                    .flat_map(|l| l.chunks.iter().map(String::as_str))
                    .filter(|c| c.starts_with(marker))
                    .collect();
                let from_split: BTreeSet<&str> = rows
                    .iter()
                    .filter_map(|row| match side {
                        Side::Remove => row.remove.as_ref(),
                        Side::Add => row.add.as_ref(),
                    })
                    .filter(|l| l.changed)
                    .flat_map(|l| l.chunks.iter().map(String::as_str))
                    .filter(|c| c.starts_with(marker))
                    .collect();
                prop_assert_eq!(from_merged, from_split);
            }
        }

        #[test]
        fn prop_side_line_numbers_increase(fragments in hunk_fragments()) {
            let fragments: Vec<&str> = fragments.iter().map(String::as_str).collect();
            let rows = pair_lines(&fragments, &header(10, 20));

            let removes: Vec<usize> = rows.iter().filter_map(|r| r.remove.as_ref()).map(|l| l.line_no).collect();
            let adds: Vec<usize> = rows.iter().filter_map(|r| r.add.as_ref()).map(|l| l.line_no).collect();
            prop_assert!(removes.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(adds.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(removes.first().map_or(true, |&n| n == 10));
            prop_assert!(adds.first().map_or(true, |&n| n == 20));
        }

        #[test]
        fn prop_every_row_has_a_side(fragments in hunk_fragments()) {
            let fragments: Vec<&str> = fragments.iter().map(String::as_str).collect();
            for row in pair_lines(&fragments, &header(1, 1)) {
                prop_assert!(row.remove.is_some() || row.add.is_some());
            }
        }
    }
}
