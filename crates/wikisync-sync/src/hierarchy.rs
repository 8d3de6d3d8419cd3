//! Page hierarchy from document filenames.
//!
//! A filename stem lists page titles from the outermost ancestor to the
//! document itself, separated by `_`. In every segment after the first,
//! `-` stands for a space:
//!
//! ```text
//! BCP_Data-Platform_Databricks-01052025.txt
//!  -> ["BCP", "Data Platform", "Databricks 01052025"]
//! ```

use wikisync_config::HierarchyConfig;

use crate::error::HierarchyError;

/// Ordered page titles, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HierarchyChain {
    titles: Vec<String>,
}

impl HierarchyChain {
    /// All titles, outermost first.
    #[must_use]
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    /// Titles of the pages above the document.
    #[must_use]
    pub fn ancestors(&self) -> &[String] {
        &self.titles[..self.titles.len() - 1]
    }

    /// Title of the document's own page.
    #[must_use]
    pub fn leaf(&self) -> &str {
        &self.titles[self.titles.len() - 1]
    }

    /// Number of levels.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.titles.len()
    }
}

/// Derives a [`HierarchyChain`] from a filename.
#[derive(Debug, Clone)]
pub struct HierarchyParser {
    extensions: Vec<String>,
    min_depth: usize,
    max_depth: Option<usize>,
}

impl HierarchyParser {
    /// Create a parser.
    ///
    /// `extensions` are stripped from filenames before splitting (lowercase,
    /// without the dot). `min_depth` must be at least 2.
    #[must_use]
    pub fn new(extensions: Vec<String>, min_depth: usize, max_depth: Option<usize>) -> Self {
        Self {
            extensions,
            min_depth: min_depth.max(2),
            max_depth,
        }
    }

    /// Create a parser from the `[hierarchy]` section and the document
    /// extensions.
    #[must_use]
    pub fn from_config(config: &HierarchyConfig, extensions: &[String]) -> Self {
        Self::new(extensions.to_vec(), config.min_depth, config.max_depth)
    }

    /// Parse a filename (without directories) into a hierarchy chain.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::Malformed`] when the stem has fewer segments
    /// than the minimum depth and [`HierarchyError::EmptySegment`] when a
    /// segment is empty.
    pub fn parse(&self, filename: &str) -> Result<HierarchyChain, HierarchyError> {
        let stem = self.strip_extension(filename);
        let segments: Vec<&str> = stem.split('_').collect();

        if segments.len() < self.min_depth {
            return Err(HierarchyError::Malformed {
                filename: filename.to_owned(),
                found: segments.len(),
                required: self.min_depth,
            });
        }
        if let Some(index) = segments.iter().position(|s| s.trim().is_empty()) {
            return Err(HierarchyError::EmptySegment {
                filename: filename.to_owned(),
                position: index + 1,
            });
        }

        let depth = self
            .max_depth
            .map_or(segments.len(), |max| segments.len().min(max));
        let titles = segments[..depth]
            .iter()
            .enumerate()
            .map(|(index, segment)| {
                if index == 0 {
                    (*segment).to_owned()
                } else {
                    segment.replace('-', " ")
                }
            })
            .collect();

        Ok(HierarchyChain { titles })
    }

    fn strip_extension<'a>(&self, filename: &'a str) -> &'a str {
        match filename.rsplit_once('.') {
            Some((stem, ext))
                if self
                    .extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext)) =>
            {
                stem
            }
            _ => filename,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parser() -> HierarchyParser {
        HierarchyParser::new(vec!["md".to_owned(), "txt".to_owned()], 2, None)
    }

    fn titles(chain: &HierarchyChain) -> Vec<&str> {
        chain.titles().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_three_level_example() {
        let chain = parser()
            .parse("BCP_Data-Platform_Databricks-01052025.txt")
            .unwrap();
        assert_eq!(titles(&chain), ["BCP", "Data Platform", "Databricks 01052025"]);
        assert_eq!(chain.ancestors(), ["BCP", "Data Platform"]);
        assert_eq!(chain.leaf(), "Databricks 01052025");
        assert_eq!(chain.depth(), 3);
    }

    #[test]
    fn test_first_segment_verbatim() {
        let chain = parser().parse("ops-team_Run-Book.md").unwrap();
        assert_eq!(titles(&chain), ["ops-team", "Run Book"]);
    }

    #[test]
    fn test_two_levels() {
        let chain = parser().parse("HR_Holidays.md").unwrap();
        assert_eq!(chain.ancestors(), ["HR"]);
        assert_eq!(chain.leaf(), "Holidays");
    }

    #[test]
    fn test_n_levels() {
        let chain = parser().parse("A_B_C_D-E.md").unwrap();
        assert_eq!(titles(&chain), ["A", "B", "C", "D E"]);
    }

    #[test]
    fn test_max_depth_ignores_extra_segments() {
        let parser = HierarchyParser::new(vec!["md".to_owned()], 2, Some(3));
        let chain = parser.parse("A_B_C_D.md").unwrap();
        assert_eq!(titles(&chain), ["A", "B", "C"]);
    }

    #[test]
    fn test_single_segment_is_malformed() {
        assert_eq!(
            parser().parse("single-segment.md"),
            Err(HierarchyError::Malformed {
                filename: "single-segment.md".to_owned(),
                found: 1,
                required: 2,
            })
        );
    }

    #[test]
    fn test_min_depth_three() {
        let parser = HierarchyParser::new(vec!["md".to_owned()], 3, None);
        assert!(matches!(
            parser.parse("A_B.md"),
            Err(HierarchyError::Malformed { found: 2, required: 3, .. })
        ));
        assert!(parser.parse("A_B_C.md").is_ok());
    }

    #[test]
    fn test_empty_segment() {
        assert_eq!(
            parser().parse("A__B.md"),
            Err(HierarchyError::EmptySegment {
                filename: "A__B.md".to_owned(),
                position: 2,
            })
        );
        assert!(matches!(
            parser().parse("A_B_.md"),
            Err(HierarchyError::EmptySegment { position: 3, .. })
        ));
    }

    #[test]
    fn test_only_known_extensions_stripped() {
        let chain = parser().parse("A_v1.2").unwrap();
        assert_eq!(chain.leaf(), "v1.2");

        let chain = parser().parse("A_Notes.MD").unwrap();
        assert_eq!(chain.leaf(), "Notes");
    }

    #[test]
    fn test_min_depth_never_below_two() {
        let parser = HierarchyParser::new(vec!["md".to_owned()], 1, None);
        assert!(parser.parse("Solo.md").is_err());
    }
}
