//! Fenced code block tracking so source rewrites leave code untouched.

/// Fence state carried from one line to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FenceState {
    /// Marker of the open fence (`` ` `` or `~`), if any.
    pub marker: Option<char>,
    /// Marker run length of the opening line.
    pub run: usize,
}

impl FenceState {
    /// Whether a fence is open.
    pub fn is_open(&self) -> bool {
        self.marker.is_some()
    }
}

/// Result of feeding one line to [`advance_fence_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineOutcome {
    /// State for the next line.
    pub next_state: FenceState,
    /// Whether this line is part of a fence, delimiters included.
    pub in_fence: bool,
}

/// Advance fence state over a single line.
pub fn advance_fence_state(line: &str, state: FenceState) -> LineOutcome {
    let indent = leading_spaces(line);
    if indent > 3 {
        return LineOutcome {
            next_state: state,
            in_fence: state.is_open(),
        };
    }
    let after_indent = &line[indent..];

    match state.marker {
        None => match marker_run(after_indent) {
            // Backtick fences may not carry backticks in their info string.
            Some((marker, run))
                if marker == '~' || !after_indent[run..].contains('`') =>
            {
                LineOutcome {
                    next_state: FenceState {
                        marker: Some(marker),
                        run,
                    },
                    in_fence: true,
                }
            }
            _ => LineOutcome {
                next_state: state,
                in_fence: false,
            },
        },
        Some(open) => {
            let closes = matches!(
                marker_run(after_indent),
                Some((marker, run))
                    if marker == open
                        && run >= state.run
                        && after_indent[run..].trim().is_empty()
            );
            LineOutcome {
                next_state: if closes { FenceState::default() } else { state },
                in_fence: true,
            }
        }
    }
}

fn leading_spaces(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b' ').count()
}

fn marker_run(after_indent: &str) -> Option<(char, usize)> {
    let first = after_indent.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }
    let run = after_indent.chars().take_while(|c| *c == first).count();
    (run >= 3).then_some((first, run))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(lines: &[&str]) -> Vec<bool> {
        let mut state = FenceState::default();
        lines
            .iter()
            .map(|line| {
                let outcome = advance_fence_state(line, state);
                state = outcome.next_state;
                outcome.in_fence
            })
            .collect()
    }

    #[test]
    fn opens_and_closes_backtick_fence() {
        assert_eq!(
            walk(&["text", "```js", "code", "```", "after"]),
            vec![false, true, true, true, false]
        );
    }

    #[test]
    fn closing_run_must_match_marker_and_length() {
        assert_eq!(
            walk(&["````", "```", "~~~~", "````", "x"]),
            vec![true, true, true, true, false]
        );
    }

    #[test]
    fn closing_fence_takes_no_info_string() {
        assert_eq!(walk(&["~~~", "~~~ js", "~~~"]), vec![true, true, true]);
    }

    #[test]
    fn deep_indent_is_not_a_fence() {
        assert_eq!(walk(&["    ```", "text"]), vec![false, false]);
    }

    #[test]
    fn two_markers_do_not_open() {
        assert_eq!(walk(&["``", "text"]), vec![false, false]);
    }

    #[test]
    fn inline_backticks_do_not_open() {
        assert_eq!(walk(&["``` a ` b", "text"]), vec![false, false]);
    }
}
