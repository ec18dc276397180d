//! `<$>[kind] ... <$>` note blocks.
//!
//! A note opens with `<$>[kind]` at the start of a line and closes at the
//! first later `<$>` that ends a line; both may share a line. Each note is
//! rewritten to a `<div class="kind">` with the body left as markdown, so
//! block-level HTML must be enabled for the div to survive rendering.
//! Notes never open inside fenced code and unclosed notes are left as-is.

use std::borrow::Cow;
use std::fmt::Write as _;

use super::fence::{FenceState, advance_fence_state};

const MARKER: &str = "<$>";

/// Rewrite every note block in `input`.
pub fn rewrite_notes(input: &str) -> Cow<'_, str> {
    if !input.contains("<$>[") {
        return Cow::Borrowed(input);
    }

    let lines: Vec<&str> = input.lines().collect();
    let mut output = String::with_capacity(input.len() + 32);
    let mut fence_state = FenceState::default();
    let mut rewritten = 0usize;
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];
        let outcome = advance_fence_state(line, fence_state);
        fence_state = outcome.next_state;

        if !outcome.in_fence
            && let Some((kind, rest)) = parse_opening(line)
            && let Some((body, consumed)) = collect_body(rest, &lines[index + 1..])
        {
            write!(output, "<div class=\"{kind}\">\n\n{body}\n\n</div>\n").ok();
            rewritten += 1;
            index += 1 + consumed;
            continue;
        }

        output.push_str(line);
        output.push('\n');
        index += 1;
    }

    if rewritten == 0 {
        return Cow::Borrowed(input);
    }
    if !input.ends_with('\n') {
        output.pop();
    }
    log::trace!("rewrote {rewritten} note blocks");
    Cow::Owned(output)
}

fn parse_opening(line: &str) -> Option<(&str, &str)> {
    let after = line.trim_start().strip_prefix("<$>[")?;
    let close = after.find(']')?;
    let kind = &after[..close];
    let valid = !kind.is_empty()
        && kind
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then(|| (kind, &after[close + 1..]))
}

/// Body text plus the number of following lines the note consumed.
fn collect_body(first: &str, following: &[&str]) -> Option<(String, usize)> {
    if let Some(inner) = first.trim_end().strip_suffix(MARKER) {
        return Some((inner.trim().to_string(), 0));
    }

    let mut body = first.trim().to_string();
    for (offset, line) in following.iter().enumerate() {
        let trimmed = line.trim_end();
        if let Some(inner) = trimmed.strip_suffix(MARKER) {
            let inner = inner.trim_end();
            if !inner.is_empty() {
                push_line(&mut body, inner);
            }
            return Some((body.trim_end().to_string(), offset + 1));
        }
        push_line(&mut body, line);
    }
    None
}

fn push_line(body: &mut String, line: &str) {
    if !body.is_empty() {
        body.push('\n');
    }
    body.push_str(line);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_single_line_note() {
        let out = rewrite_notes("<$>[note] **Note:** read this. <$>");
        assert_eq!(out, "<div class=\"note\">\n\n**Note:** read this.\n\n</div>");
    }

    #[test]
    fn rewrites_multi_line_note() {
        let input = "Intro\n<$>[warning]\n**Warning:** careful.\nStill careful.\n<$>\nOutro\n";
        assert_eq!(
            rewrite_notes(input),
            "Intro\n<div class=\"warning\">\n\n**Warning:** careful.\nStill careful.\n\n</div>\nOutro\n"
        );
    }

    #[test]
    fn closing_marker_may_trail_content() {
        let out = rewrite_notes("<$>[info]\nbody <$>");
        assert_eq!(out, "<div class=\"info\">\n\nbody\n\n</div>");
    }

    #[test]
    fn leaves_unclosed_note_alone() {
        let input = "<$>[note]\nnever closed";
        assert!(matches!(rewrite_notes(input), Cow::Borrowed(_)));
    }

    #[test]
    fn skips_fenced_code() {
        let input = "```\n<$>[note] inside <$>\n```";
        assert_eq!(rewrite_notes(input), input);
    }

    #[test]
    fn rejects_odd_kinds() {
        let input = "<$>[no te] x <$>";
        assert_eq!(rewrite_notes(input), input);
    }

    #[test]
    fn untouched_input_is_borrowed() {
        assert!(matches!(rewrite_notes("plain text"), Cow::Borrowed(_)));
    }
}
