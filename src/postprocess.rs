//! Line-based repairs applied to rendered Jira markup.
//!
//! Each pass recomputes its own "inside `{code}`" state from the top of the
//! text. A line containing `{code}` closes a block; only otherwise can a line
//! containing `{code` open one.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fence {
    Open,
    Close,
}

fn fence_marker(line: &str) -> Option<Fence> {
    if line.contains("{code}") {
        Some(Fence::Close)
    } else if line.contains("{code") {
        Some(Fence::Open)
    } else {
        None
    }
}

/// Pass A. Strip `# ` from fence lines and the leading `#` from every line
/// inside a code block.
pub fn strip_comment_markers(text: &str) -> String {
    let mut in_code = false;
    text.split('\n')
        .map(|line| match fence_marker(line) {
            Some(fence) => {
                in_code = fence == Fence::Open;
                line.replace("# ", "")
            }
            None if in_code => line.strip_prefix('#').unwrap_or(line).to_string(),
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pass B. Escape `__` as `\_\_` on every line outside a code block.
pub fn escape_underscores(text: &str) -> String {
    let mut in_code = false;
    text.split('\n')
        .map(|line| match fence_marker(line) {
            Some(Fence::Open) => {
                in_code = true;
                line.to_string()
            }
            // `{{code}}` on a prose line closes nothing.
            Some(Fence::Close) if in_code => {
                in_code = false;
                line.to_string()
            }
            None if in_code => line.to_string(),
            Some(Fence::Close) | None => line.replace("__", r"\_\_"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Both passes, A before B.
pub fn run(text: &str) -> String {
    let text = strip_comment_markers(text);
    escape_underscores(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPEN: &str = "{code:language=bash|borderStyle=solid|theme=RDark|linenumbers=true|collapse=false}";

    #[test]
    fn test_fence_classification() {
        assert_eq!(fence_marker(OPEN), Some(Fence::Open));
        assert_eq!(fence_marker("{code}"), Some(Fence::Close));
        assert_eq!(fence_marker("plain"), None);
    }

    #[test]
    fn test_strip_inside_code() {
        let text = format!("{}\n# comment\necho hi\n#!/bin/sh\n{{code}}\n", OPEN);
        let expected = format!("{}\n comment\necho hi\n!/bin/sh\n{{code}}\n", OPEN);
        assert_eq!(strip_comment_markers(&text), expected);
    }

    #[test]
    fn test_strip_leaves_outside_alone() {
        let text = "# not code\nh1. Title";
        assert_eq!(strip_comment_markers(text), text);
    }

    #[test]
    fn test_strip_only_first_char() {
        let text = format!("{}\n## two\n{{code}}", OPEN);
        let expected = format!("{}\n# two\n{{code}}", OPEN);
        assert_eq!(strip_comment_markers(&text), expected);
    }

    #[test]
    fn test_close_is_not_reopened() {
        // After `{code}` the block is closed; a following `#` line is outside.
        let text = format!("{}\nx\n{{code}}\n# after", OPEN);
        assert!(strip_comment_markers(&text).ends_with("{code}\n# after"));
    }

    #[test]
    fn test_fence_line_cleanup() {
        assert_eq!(strip_comment_markers("# {code}"), "{code}");
    }

    #[test]
    fn test_escape_outside_code() {
        assert_eq!(escape_underscores("my__key"), r"my\_\_key");
        assert_eq!(escape_underscores("{{a__b}}"), r"{{a\_\_b}}");
    }

    #[test]
    fn test_escape_skips_code() {
        let text = format!("a__b\n{}\nx__y\n{{code}}\nc__d", OPEN);
        let expected = format!("a\\_\\_b\n{}\nx__y\n{{code}}\nc\\_\\_d", OPEN);
        assert_eq!(escape_underscores(&text), expected);
    }

    #[test]
    fn test_escape_line_with_inline_code_word() {
        assert_eq!(
            escape_underscores("{{code}} and my__key"),
            r"{{code}} and my\_\_key"
        );
    }

    #[test]
    fn test_escape_after_closed_block() {
        let text = format!("{}\nx__y\n{{code}}\n{{{{code}}}} a__b", OPEN);
        let expected = format!("{}\nx__y\n{{code}}\n{{{{code}}}} a\\_\\_b", OPEN);
        assert_eq!(escape_underscores(&text), expected);
    }

    #[test]
    fn test_escape_already_escaped() {
        let text = r"\_\_bold\_\_";
        assert_eq!(escape_underscores(text), text);
    }

    #[test]
    fn test_trailing_newline_preserved() {
        assert_eq!(run("a\n\n"), "a\n\n");
        assert_eq!(run(""), "");
    }

    #[test]
    fn test_run_order() {
        let text = format!("{}\n#__x\n{{code}}\n__y", OPEN);
        let expected = format!("{}\n__x\n{{code}}\n\\_\\_y", OPEN);
        assert_eq!(run(&text), expected);
    }
}
