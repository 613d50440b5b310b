//! Character-level text diff used to show how a local file differs from the
//! server copy.

use console::style;
use dissimilar::Chunk;

/// Which side a piece of text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Present in both.
    Equal,
    /// Only in the old (local) text.
    Delete,
    /// Only in the new (remote) text.
    Insert,
}

/// A run of text with one change kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub change: Change,
    pub text: String,
}

impl From<Chunk<'_>> for Span {
    fn from(chunk: Chunk<'_>) -> Self {
        let (change, text) = match chunk {
            Chunk::Equal(text) => (Change::Equal, text),
            Chunk::Delete(text) => (Change::Delete, text),
            Chunk::Insert(text) => (Change::Insert, text),
        };
        Span {
            change,
            text: text.to_string(),
        }
    }
}

/// How deletions and insertions are marked when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    /// Red deletions, green insertions.
    Color,
    /// `[-deleted-]` and `{+inserted+}` markers.
    Plain,
}

/// Compute the edit script between `old` and `new`, with semantic cleanup
/// so changes line up with words where possible.
pub fn diff(old: &str, new: &str) -> Vec<Span> {
    dissimilar::diff(old, new).into_iter().map(Span::from).collect()
}

/// Render spans as a single string with deletions and insertions marked.
pub fn render(spans: &[Span], palette: Palette) -> String {
    let mut out = String::new();
    for span in spans {
        match (span.change, palette) {
            (Change::Equal, _) => out.push_str(&span.text),
            (Change::Delete, Palette::Color) => {
                out.push_str(&style(&span.text).red().force_styling(true).to_string())
            }
            (Change::Insert, Palette::Color) => {
                out.push_str(&style(&span.text).green().force_styling(true).to_string())
            }
            (Change::Delete, Palette::Plain) => {
                out.push_str("[-");
                out.push_str(&span.text);
                out.push_str("-]");
            }
            (Change::Insert, Palette::Plain) => {
                out.push_str("{+");
                out.push_str(&span.text);
                out.push_str("+}");
            }
        }
    }
    out
}

/// Diff and render, colouring when the terminal supports it.
pub fn pretty_diff(old: &str, new: &str) -> String {
    let palette = if console::colors_enabled() {
        Palette::Color
    } else {
        Palette::Plain
    };
    render(&diff(old, new), palette)
}
