use super::diff::{HunkHeader, Marker};
use serde::Serialize;

/// One logical line carrying both sides of a hunk.
///
/// A line flagged both `is_remove` and `is_add` is an in-place word change.
/// Line numbers are only set for the side(s) the line carries. A line that
/// only picks up its add side after it was numbered takes the add counter
/// value from when it was opened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergedLine {
    /// Raw marker-prefixed fragments, in the order they were attached
    pub chunks: Vec<String>,
    pub remove_line_no: Option<usize>,
    pub add_line_no: Option<usize>,
    pub is_remove: bool,
    pub is_add: bool,
    pub is_context: bool,
}

impl MergedLine {
    fn is_blank(&self) -> bool {
        !self.is_remove && !self.is_add && !self.is_context
    }

    fn last_marker(&self) -> Option<Marker> {
        self.chunks.last().and_then(|chunk| Marker::of(chunk))
    }
}

/// Running counters and accumulator for one hunk.
///
/// The last element of `lines` is always the line still being built.
/// `add_seeds[i]` is the add counter at the moment `lines[i]` was opened.
struct MergeState {
    lines: Vec<MergedLine>,
    add_seeds: Vec<usize>,
    remove_no: usize,
    add_no: usize,
    /// Index of the line that most recently received context
    context_anchor: usize,
}

impl MergeState {
    fn new(header: &HunkHeader) -> Self {
        Self {
            lines: Vec::new(),
            add_seeds: Vec::new(),
            remove_no: header.meta.remove.from,
            add_no: header.meta.add.from,
            context_anchor: 0,
        }
    }

    fn open_line(&mut self) {
        self.lines.push(MergedLine::default());
        self.add_seeds.push(self.add_no);
    }

    fn current_index(&mut self) -> usize {
        if self.lines.is_empty() {
            self.open_line();
        }
        self.lines.len() - 1
    }

    fn push_context(&mut self, fragment: &str) {
        let idx = self.current_index();
        let line = &mut self.lines[idx];
        line.chunks.push(fragment.to_string());
        line.is_context = true;
        self.context_anchor = idx;
    }

    fn push_remove(&mut self, fragment: &str) {
        let idx = self.current_index();
        let line = &mut self.lines[idx];
        line.chunks.push(fragment.to_string());
        line.is_remove = true;
    }

    /// An add run directly after a remove run is git's pre-empted word
    /// substitution: it belongs with the last context, not the current line.
    fn push_add(&mut self, fragment: &str) {
        let idx = self.current_index();
        let target = if self.lines[idx].last_marker() == Some(Marker::Remove) {
            self.context_anchor
        } else {
            idx
        };
        let line = &mut self.lines[target];
        line.chunks.push(fragment.to_string());
        line.is_add = true;
        if target < idx && line.add_line_no.is_none() {
            line.add_line_no = Some(self.add_seeds[target]);
        }
    }

    fn terminate(&mut self) {
        let idx = self.current_index();
        let previous = idx
            .checked_sub(1)
            .map(|prev| (self.lines[prev].is_remove, self.lines[prev].is_add));
        let line = &mut self.lines[idx];

        if line.is_blank() {
            // An empty logical line continues whichever side(s) the line before it was on
            if let Some((was_remove, was_add)) = previous {
                if was_add {
                    line.is_add = true;
                    line.add_line_no = Some(self.add_no);
                    self.add_no = self.add_no.saturating_add(1);
                }
                if was_remove {
                    line.is_remove = true;
                    line.remove_line_no = Some(self.remove_no);
                    self.remove_no = self.remove_no.saturating_add(1);
                }
            }
        } else {
            if line.is_remove || line.is_context {
                line.remove_line_no = Some(self.remove_no);
                self.remove_no = self.remove_no.saturating_add(1);
            }
            if line.is_add || line.is_context {
                line.add_line_no = Some(self.add_no);
                self.add_no = self.add_no.saturating_add(1);
            }
        }

        self.open_line();
    }

    /// Close out the line in progress: an unterminated line with content is
    /// numbered as if terminated, an empty one is dropped.
    fn finish(mut self) -> Vec<MergedLine> {
        if self.lines.last().is_some_and(|last| !last.chunks.is_empty()) {
            self.terminate();
        }
        self.lines.pop();
        self.lines
    }
}

/// Rebuild one record per logical line from a hunk's fragments.
///
/// The final fragment is the empty tail left by splitting on newlines and is
/// not read.
pub fn merge_lines(fragments: &[&str], header: &HunkHeader) -> Vec<MergedLine> {
    let Some((_, body)) = fragments.split_last() else {
        return Vec::new();
    };

    let mut state = MergeState::new(header);
    for fragment in body {
        match Marker::of(fragment) {
            Some(Marker::Context) => state.push_context(fragment),
            Some(Marker::Remove) => state.push_remove(fragment),
            Some(Marker::Add) => state.push_add(fragment),
            Some(Marker::Terminator) => state.terminate(),
            Some(Marker::Other) | None => {}
        }
    }

    state.finish()
}
