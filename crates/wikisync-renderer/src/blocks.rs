//! Block extraction pass.
//!
//! Splits a document into top-level code fences, callouts and the markdown
//! between them before any markdown parsing happens. Callout syntax:
//!
//! ```text
//! ::: warning Optional title
//! Body in **markdown**.
//! :::
//! ```
//!
//! Three or more colons open or close a callout. Callouts nest; a body is
//! kept as raw text and split again when it is converted.

use crate::backend::PanelKind;
use crate::error::ConversionError;
use crate::fence::{FenceMarker, FenceTracker};

/// Top-level block of a document.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Block {
    /// Markdown between extracted blocks.
    Markdown(String),
    /// Unindented fenced code block with a verbatim body.
    Code {
        language: Option<String>,
        body: String,
    },
    /// Callout with its raw body text.
    Callout {
        kind: PanelKind,
        title: Option<String>,
        body: String,
        /// Line number of the first body line in the whole document.
        body_line: usize,
    },
}

/// Split `text` into blocks.
///
/// `first_line` is the 1-based line number of the first line of `text`
/// within the document, used for error positions.
pub(crate) fn split_blocks(text: &str, first_line: usize) -> Result<Vec<Block>, ConversionError> {
    let mut blocks = Vec::new();
    let mut markdown: Vec<&str> = Vec::new();
    let mut fence = FenceTracker::new();
    let mut lines = text.lines().enumerate();

    while let Some((index, line)) = lines.next() {
        match fence.update(line) {
            Some(FenceMarker::Open { language }) if !line.starts_with(char::is_whitespace) => {
                flush_markdown(&mut markdown, &mut blocks);
                let mut body: Vec<&str> = Vec::new();
                for (_, code_line) in lines.by_ref() {
                    if fence.update(code_line).is_some() {
                        break;
                    }
                    body.push(code_line);
                }
                blocks.push(Block::Code {
                    language,
                    body: body.join("\n"),
                });
            }
            // Indented fences (list items, blockquotes) stay with the markdown
            Some(_) => markdown.push(line),
            None if fence.in_fence() => markdown.push(line),
            None => {
                let Some((kind, title)) = parse_callout_open(line) else {
                    markdown.push(line);
                    continue;
                };
                flush_markdown(&mut markdown, &mut blocks);
                let body = collect_callout_body(&mut lines).ok_or(
                    ConversionError::UnclosedCallout {
                        kind,
                        line: first_line + index,
                    },
                )?;
                blocks.push(Block::Callout {
                    kind,
                    title,
                    body,
                    body_line: first_line + index + 1,
                });
            }
        }
    }

    flush_markdown(&mut markdown, &mut blocks);
    Ok(blocks)
}

/// Consume lines up to the closer matching an already consumed opener.
///
/// Returns the body between them, or `None` when the input ends first.
fn collect_callout_body<'a, I>(lines: &mut I) -> Option<String>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut depth = 0usize;
    let mut fence = FenceTracker::new();
    let mut body: Vec<&str> = Vec::new();

    for (_, line) in lines {
        if fence.update(line).is_some() || fence.in_fence() {
            body.push(line);
            continue;
        }
        if parse_callout_open(line).is_some() {
            depth += 1;
        } else if is_callout_close(line) {
            if depth == 0 {
                return Some(body.join("\n"));
            }
            depth -= 1;
        }
        body.push(line);
    }

    None
}

fn flush_markdown(markdown: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if markdown.iter().any(|line| !line.trim().is_empty()) {
        blocks.push(Block::Markdown(markdown.join("\n")));
    }
    markdown.clear();
}

/// Parse a callout opener line: `:::` (or longer), a known kind, and an
/// optional title.
///
/// Openers with an unknown kind return `None` and are treated as text.
fn parse_callout_open(line: &str) -> Option<(PanelKind, Option<String>)> {
    let marker = block_marker(line)?;
    let colons = marker.chars().take_while(|&c| c == ':').count();
    if colons < 3 {
        return None;
    }

    let rest = marker[colons..].trim_start();
    let (name, title) = match rest.split_once(char::is_whitespace) {
        Some((name, title)) => (name, title.trim()),
        None => (rest, ""),
    };
    let kind = PanelKind::parse(name)?;
    let title = (!title.is_empty()).then(|| title.to_owned());
    Some((kind, title))
}

/// Check if a line consists only of three or more colons.
fn is_callout_close(line: &str) -> bool {
    block_marker(line)
        .is_some_and(|marker| marker.len() >= 3 && marker.chars().all(|c| c == ':'))
}

/// Line content when it can start a block: at most three leading spaces.
///
/// Deeper indentation is an indented code block, where `:::` is code.
fn block_marker(line: &str) -> Option<&str> {
    let content = line.trim_start_matches(' ');
    let indent = line.len() - content.len();
    if indent > 3 || content.starts_with('\t') {
        return None;
    }
    Some(content.trim_end())
}
