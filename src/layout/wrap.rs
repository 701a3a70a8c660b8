//! Greedy word wrapping against a text measurer

use crate::io::configuration::ELLIPSIS;

/// Measures rendered text width in pixels
pub trait TextMeasure {
    /// Width in pixels of `text` drawn on a single line
    fn text_width(&self, text: &str) -> u32;
}

/// Fixed advance per character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonospaceMeasure {
    /// Horizontal advance of every character
    pub advance: u32,
}

impl TextMeasure for MonospaceMeasure {
    fn text_width(&self, text: &str) -> u32 {
        (text.chars().count() as u32).saturating_mul(self.advance)
    }
}

impl<M: TextMeasure + ?Sized> TextMeasure for &M {
    fn text_width(&self, text: &str) -> u32 {
        (**self).text_width(text)
    }
}

/// Split `text` into lines no wider than `max_width`
///
/// Paragraphs split on `\n`; an empty paragraph becomes an empty line. Words
/// are never broken, so a word wider than `max_width` gets its own line.
pub fn wrap_text(text: &str, max_width: u32, measure: &impl TextMeasure) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut words = paragraph.split_whitespace();
        let Some(first) = words.next() else {
            lines.push(String::new());
            continue;
        };

        let mut current = first.to_string();
        for word in words {
            let candidate = format!("{current} {word}");
            if measure.text_width(&candidate) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        lines.push(current);
    }

    lines
}

/// Keep at most `max_chars` characters, appending an ellipsis when cut
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str(ELLIPSIS);
    cut
}
