//! Link reference definitions shared across the whole document.
//!
//! The markdown between extracted blocks is parsed chunk by chunk, so a
//! `[text][label]` link and its `[label]: url` definition can end up in
//! different parses. Definitions are collected from every chunk first and
//! offered back to the parser for references it cannot resolve locally.

use std::collections::HashMap;

use pulldown_cmark::{CowStr, Options, Parser};

/// Destination and title of a link reference definition.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Definition {
    dest: String,
    title: String,
}

/// Reference definitions keyed by normalized label.
#[derive(Debug, Default)]
pub(crate) struct LinkReferences {
    definitions: HashMap<String, Definition>,
}

impl LinkReferences {
    /// Record the definitions found in a markdown chunk.
    ///
    /// The first definition of a label wins, in document order.
    pub(crate) fn collect(&mut self, markdown: &str, options: Options) {
        let parser = Parser::new_ext(markdown, options);
        for (label, def) in parser.reference_definitions().iter() {
            self.definitions
                .entry(normalize(label))
                .or_insert_with(|| Definition {
                    dest: def.dest.as_ref().to_owned(),
                    title: def.title.as_deref().unwrap_or_default().to_owned(),
                });
        }
    }

    /// Destination and title for a label, in the form the parser's broken
    /// link callback returns.
    pub(crate) fn resolve<'a>(&self, label: &str) -> Option<(CowStr<'a>, CowStr<'a>)> {
        let def = self.definitions.get(&normalize(label))?;
        Some((def.dest.clone().into(), def.title.clone().into()))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Labels match case-insensitively with whitespace runs collapsed.
fn normalize(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
