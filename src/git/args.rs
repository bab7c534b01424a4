/// What the caller wants diffed; mirrors the flags passed to `git diff`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffOptions {
    pub commits: Vec<String>,
    pub paths: Vec<String>,
    /// Diff the index instead of the working tree
    pub cached: bool,
}

/// Arguments (after `git`) for the word-diff invocation this crate parses.
///
/// The parser never spawns git; whoever runs this command hands its stdout
/// to [`parse_diff`](super::parse_diff).
pub fn word_diff_args(options: &DiffOptions) -> Vec<String> {
    let mut args = vec!["diff".to_string(), "--word-diff=porcelain".to_string()];
    if options.cached {
        args.push("--cached".to_string());
    }
    args.extend(options.commits.iter().filter(|c| !c.is_empty()).cloned());
    args.push("--".to_string());
    args.extend(options.paths.iter().filter(|p| !p.is_empty()).cloned());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        assert_eq!(
            word_diff_args(&DiffOptions::default()),
            vec!["diff", "--word-diff=porcelain", "--"]
        );
    }

    #[test]
    fn test_cached_with_commits_and_paths() {
        let options = DiffOptions {
            commits: vec!["main".into(), "HEAD".into()],
            paths: vec!["src/".into(), "".into()],
            cached: true,
        };
        assert_eq!(
            word_diff_args(&options),
            vec!["diff", "--word-diff=porcelain", "--cached", "main", "HEAD", "--", "src/"]
        );
    }
}
