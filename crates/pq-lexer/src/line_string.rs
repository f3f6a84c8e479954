use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

use pq_common::position::{GraphemePosition, LinePosition};

/// A single line of source text with both directions of the byte-offset ↔
/// grapheme-index map precomputed.
///
/// All positions the toolchain stores are byte offsets; grapheme columns
/// exist only so error messages can report the column an editor shows.
/// Construction walks the line once; lookups are O(1) afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineString {
    text: String,
    /// Byte offset where each grapheme starts, with a trailing entry for the
    /// end of the line.
    grapheme_starts: Vec<u32>,
    /// Grapheme index for every byte offset `0..=len`. Offsets inside a
    /// multi-byte grapheme map to the grapheme they fall within.
    grapheme_at_code_unit: Vec<u32>,
}

impl LineString {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut grapheme_starts = Vec::new();
        let mut grapheme_at_code_unit = vec![0u32; text.len() + 1];

        for (grapheme_index, (byte_offset, grapheme)) in
            text.grapheme_indices(true).enumerate()
        {
            grapheme_starts.push(byte_offset as u32);
            for covered in byte_offset..byte_offset + grapheme.len() {
                grapheme_at_code_unit[covered] = grapheme_index as u32;
            }
        }
        grapheme_starts.push(text.len() as u32);
        grapheme_at_code_unit[text.len()] = (grapheme_starts.len() - 1) as u32;

        Self {
            text,
            grapheme_starts,
            grapheme_at_code_unit,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Line length in bytes.
    pub fn len_code_units(&self) -> u32 {
        self.text.len() as u32
    }

    pub fn num_graphemes(&self) -> u32 {
        (self.grapheme_starts.len() - 1) as u32
    }

    /// The grapheme column a byte offset falls in.
    ///
    /// # Panics
    ///
    /// Panics if `code_unit` is past the end of the line.
    pub fn grapheme_index_at(&self, code_unit: u32) -> u32 {
        self.grapheme_at_code_unit[code_unit as usize]
    }

    /// The byte offset a grapheme starts at.
    ///
    /// # Panics
    ///
    /// Panics if `grapheme_index` is past the number of graphemes.
    pub fn code_unit_at_grapheme(&self, grapheme_index: u32) -> u32 {
        self.grapheme_starts[grapheme_index as usize]
    }

    /// Both coordinates of a byte offset within this line.
    pub fn line_position(&self, code_unit: u32) -> LinePosition {
        LinePosition {
            code_unit,
            column_grapheme: self.grapheme_index_at(code_unit),
        }
    }

    /// The user-facing position of a byte offset within this line.
    pub fn grapheme_position(&self, line_number: u32, line_code_unit: u32) -> GraphemePosition {
        GraphemePosition {
            line_number,
            line_code_unit,
            column_grapheme: self.grapheme_index_at(line_code_unit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_maps_are_identity() {
        let line = LineString::new("let x = 1");
        assert_eq!(line.len_code_units(), 9);
        assert_eq!(line.num_graphemes(), 9);
        assert_eq!(line.grapheme_index_at(4), 4);
        assert_eq!(line.code_unit_at_grapheme(4), 4);
    }

    #[test]
    fn multibyte_graphemes_share_a_column() {
        // "é" as e + combining acute is one grapheme over three bytes.
        let line = LineString::new("e\u{0301}x");
        assert_eq!(line.len_code_units(), 4);
        assert_eq!(line.num_graphemes(), 2);
        assert_eq!(line.grapheme_index_at(0), 0);
        assert_eq!(line.grapheme_index_at(1), 0);
        assert_eq!(line.grapheme_index_at(2), 0);
        assert_eq!(line.grapheme_index_at(3), 1);
        assert_eq!(line.code_unit_at_grapheme(1), 3);
    }

    #[test]
    fn end_of_line_is_a_valid_position() {
        let line = LineString::new("ab");
        assert_eq!(line.grapheme_index_at(2), 2);
        assert_eq!(line.code_unit_at_grapheme(2), 2);
    }

    #[test]
    fn empty_line() {
        let line = LineString::new("");
        assert_eq!(line.len_code_units(), 0);
        assert_eq!(line.num_graphemes(), 0);
        assert_eq!(line.grapheme_index_at(0), 0);
    }

    #[test]
    fn grapheme_position_reports_editor_column() {
        let line = LineString::new("e\u{0301}x");
        let position = line.grapheme_position(2, 3);
        assert_eq!(position.line_number, 2);
        assert_eq!(position.line_code_unit, 3);
        assert_eq!(position.column_grapheme, 1);
        assert_eq!(line.line_position(3).column_grapheme, 1);
    }
}
