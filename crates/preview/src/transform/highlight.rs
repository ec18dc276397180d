//! `<^>text<^>` inline highlights.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

use super::fence::{FenceState, advance_fence_state};

static HIGHLIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\^>(.+?)<\^>").expect("highlight regex"));

/// Rewrite `<^>text<^>` outside fenced code to `<span class="highlight">`.
///
/// Needs inline HTML enabled to render.
pub fn rewrite_highlights(input: &str) -> Cow<'_, str> {
    if !input.contains("<^>") {
        return Cow::Borrowed(input);
    }

    let mut fence_state = FenceState::default();
    let mut changed = false;
    let mut output = String::with_capacity(input.len() + 32);

    for line in input.split_inclusive('\n') {
        let outcome = advance_fence_state(line.trim_end_matches(['\r', '\n']), fence_state);
        fence_state = outcome.next_state;

        if outcome.in_fence {
            output.push_str(line);
            continue;
        }
        match HIGHLIGHT.replace_all(line, |caps: &Captures<'_>| {
            format!("<span class=\"highlight\">{}</span>", &caps[1])
        }) {
            Cow::Borrowed(same) => output.push_str(same),
            Cow::Owned(replaced) => {
                changed = true;
                output.push_str(&replaced);
            }
        }
    }

    if changed {
        Cow::Owned(output)
    } else {
        Cow::Borrowed(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_highlighted_text() {
        assert_eq!(
            rewrite_highlights("Set <^>port<^> and <^>host<^>.\n"),
            "Set <span class=\"highlight\">port</span> and <span class=\"highlight\">host</span>.\n"
        );
    }

    #[test]
    fn needs_both_markers_on_one_line() {
        let input = "open <^>\nclose <^>";
        assert!(matches!(rewrite_highlights(input), Cow::Borrowed(_)));
    }

    #[test]
    fn ignores_fenced_code() {
        let input = "~~~\n<^>x<^>\n~~~\n<^>y<^>";
        assert_eq!(
            rewrite_highlights(input),
            "~~~\n<^>x<^>\n~~~\n<span class=\"highlight\">y</span>"
        );
    }
}
