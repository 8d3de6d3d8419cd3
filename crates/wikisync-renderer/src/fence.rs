//! Fenced code block detection for the line pass.
//!
//! `:::` lines inside a fence are code, so the callout scanner asks the
//! tracker before treating a line as a marker.

/// What a line did to the fence state.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum FenceMarker {
    /// Opened a fence; carries the first word of the info string.
    Open { language: Option<String> },
    Close,
}

/// Line-by-line fence state.
///
/// A fence is three or more backticks or tildes. It closes on a line of the
/// same character, at least as long, with nothing else after it.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    /// Character and run length of the open fence.
    open: Option<(char, usize)>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Feed the next line; returns a marker when it opens or closes a fence.
    pub(crate) fn update(&mut self, line: &str) -> Option<FenceMarker> {
        let line = line.trim_start();
        let (ch, run) = fence_run(line)?;
        let rest = &line[run..];

        if let Some((open_ch, open_run)) = self.open {
            if ch != open_ch || run < open_run || !rest.trim().is_empty() {
                return None;
            }
            self.open = None;
            return Some(FenceMarker::Close);
        }

        let info = rest.trim();
        if ch == '`' && info.contains('`') {
            return None;
        }
        self.open = Some((ch, run));
        Some(FenceMarker::Open {
            language: info.split_whitespace().next().map(str::to_owned),
        })
    }
}

/// Leading run of backticks or tildes, when it is long enough to be a fence.
///
/// The run length is in bytes; both fence characters are ASCII.
fn fence_run(line: &str) -> Option<(char, usize)> {
    let ch = line.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let run = line.len() - line.trim_start_matches(ch).len();
    (run >= 3).then_some((ch, run))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(language: Option<&str>) -> Option<FenceMarker> {
        Some(FenceMarker::Open {
            language: language.map(ToOwned::to_owned),
        })
    }

    #[test]
    fn test_backtick_fence() {
        let mut fences = FenceTracker::new();
        assert!(!fences.in_fence());

        assert_eq!(fences.update("```rust"), open(Some("rust")));
        assert!(fences.in_fence());
        assert_eq!(fences.update("fn main() {}"), None);
        assert_eq!(fences.update("```"), Some(FenceMarker::Close));
        assert!(!fences.in_fence());
    }

    #[test]
    fn test_tilde_fence_without_language() {
        let mut fences = FenceTracker::new();
        assert_eq!(fences.update("~~~"), open(None));
        assert_eq!(fences.update("```"), None);
        assert_eq!(fences.update("~~~"), Some(FenceMarker::Close));
    }

    #[test]
    fn test_info_string_keeps_first_word() {
        let mut fences = FenceTracker::new();
        assert_eq!(
            fences.update("```  python title=\"x.py\""),
            open(Some("python"))
        );
    }

    #[test]
    fn test_longer_closing_fence() {
        let mut fences = FenceTracker::new();
        fences.update("```");
        assert_eq!(fences.update("`````"), Some(FenceMarker::Close));
    }

    #[test]
    fn test_shorter_fence_not_closing() {
        let mut fences = FenceTracker::new();
        fences.update("````");
        assert_eq!(fences.update("```"), None);
        assert!(fences.in_fence());
    }

    #[test]
    fn test_closing_fence_with_text_is_content() {
        let mut fences = FenceTracker::new();
        fences.update("```");
        assert_eq!(fences.update("``` not a close"), None);
        assert!(fences.in_fence());
    }

    #[test]
    fn test_two_backticks_not_fence() {
        let mut fences = FenceTracker::new();
        assert_eq!(fences.update("``code``"), None);
        assert!(!fences.in_fence());
    }

    #[test]
    fn test_backtick_in_info_string_not_fence() {
        let mut fences = FenceTracker::new();
        assert_eq!(fences.update("``` a`b"), None);
        assert!(!fences.in_fence());
    }

    #[test]
    fn test_indented_fence() {
        let mut fences = FenceTracker::new();
        assert_eq!(fences.update("    ```js"), open(Some("js")));
        assert_eq!(fences.update("  ```"), Some(FenceMarker::Close));
    }
}
