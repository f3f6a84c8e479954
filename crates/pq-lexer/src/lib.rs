//! Incremental line-oriented lexer for the Power Query / M language.
//!
//! The unit of work is a single logical line. Tokens may span lines
//! (multiline comments, strings, quoted identifiers); the mode a line ends
//! in seeds the next line, so editing one line only re-lexes the lines whose
//! seed actually changed. [`LexerSnapshot`] freezes a [`State`] into the
//! flat token stream the parser consumes.

mod cursor;
pub mod error;
mod lex;
mod line_string;
mod snapshot;

use rustc_hash::FxHashMap;
use serde::Serialize;

use pq_common::partial::PartialResult;
use pq_common::position::Position;
use pq_common::settings::LexSettings;
use pq_common::token::LineToken;

pub use error::LexError;
pub use lex::LineMode;
pub use line_string::LineString;
pub use snapshot::LexerSnapshot;

use error::{BadLineNumberKind, BadRangeKind};

/// A span between two cursor positions, used by [`State::update_range`].
/// The end is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

/// One line of the document and what lexing it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Line {
    /// Created but not lexed yet. Only exists transiently inside an update.
    Untouched {
        line_string: LineString,
        mode_start: LineMode,
    },
    /// Lexed clean.
    Touched {
        line_string: LineString,
        mode_start: LineMode,
        mode_end: LineMode,
        tokens: Vec<LineToken>,
    },
    /// Some tokens were produced before the line failed.
    TouchedWithError {
        line_string: LineString,
        mode_start: LineMode,
        mode_end: LineMode,
        tokens: Vec<LineToken>,
        error: LexError,
    },
    /// Nothing on the line lexed.
    Error {
        line_string: LineString,
        mode_start: LineMode,
        mode_end: LineMode,
        error: LexError,
    },
}

impl Line {
    pub fn line_string(&self) -> &LineString {
        match self {
            Self::Untouched { line_string, .. }
            | Self::Touched { line_string, .. }
            | Self::TouchedWithError { line_string, .. }
            | Self::Error { line_string, .. } => line_string,
        }
    }

    pub fn mode_start(&self) -> LineMode {
        match self {
            Self::Untouched { mode_start, .. }
            | Self::Touched { mode_start, .. }
            | Self::TouchedWithError { mode_start, .. }
            | Self::Error { mode_start, .. } => *mode_start,
        }
    }

    /// The mode this line leaves the lexer in, which seeds the next line.
    pub fn mode_end(&self) -> LineMode {
        match self {
            // An untouched line has not moved the mode yet.
            Self::Untouched { mode_start, .. } => *mode_start,
            Self::Touched { mode_end, .. }
            | Self::TouchedWithError { mode_end, .. }
            | Self::Error { mode_end, .. } => *mode_end,
        }
    }

    pub fn tokens(&self) -> &[LineToken] {
        match self {
            Self::Untouched { .. } | Self::Error { .. } => &[],
            Self::Touched { tokens, .. } | Self::TouchedWithError { tokens, .. } => tokens,
        }
    }

    pub fn error(&self) -> Option<&LexError> {
        match self {
            Self::Untouched { .. } | Self::Touched { .. } => None,
            Self::TouchedWithError { error, .. } | Self::Error { error, .. } => Some(error),
        }
    }
}

/// The lexed document: one [`Line`] per logical line plus the separator the
/// document was split on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct State {
    lines: Vec<Line>,
    separator: String,
}

/// Lex a document from scratch.
pub fn lex(settings: &LexSettings, text: &str) -> State {
    let lines = text
        .split(settings.separator.as_str())
        .map(|line_text| Line::Untouched {
            line_string: LineString::new(line_text),
            mode_start: LineMode::Default,
        })
        .collect();
    let mut state = State {
        lines,
        separator: settings.separator.clone(),
    };
    state.relex(0);
    state
}

impl State {
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Append one line to the end of the document and lex it, seeded with
    /// the last line's end mode.
    pub fn append_line(&mut self, text: &str) {
        let index = self.lines.len();
        self.lines.push(Line::Untouched {
            line_string: LineString::new(text),
            mode_start: LineMode::Default,
        });
        self.relex(index);
    }

    /// Replace one line's text, then re-lex it and every following line
    /// whose seed mode changes.
    pub fn update_line(&mut self, line_number: u32, text: &str) -> Result<(), LexError> {
        let index = line_number as usize;
        if index >= self.lines.len() {
            return Err(LexError::BadLineNumber {
                kind: BadLineNumberKind::GreaterThanNumLines,
                line_number,
                num_lines: self.lines.len() as u32,
            });
        }
        let line = &self.lines[index];
        if let Some(error) = line.error() {
            if line.line_string().text() == text {
                return Err(LexError::BadState {
                    inner: Box::new(error.clone()),
                });
            }
        }

        self.lines[index] = Line::Untouched {
            line_string: LineString::new(text),
            mode_start: LineMode::Default,
        };
        self.relex(index);
        Ok(())
    }

    /// Splice `text` over `range`, which may span lines, then re-lex from
    /// the first affected line.
    pub fn update_range(&mut self, range: Range, text: &str) -> Result<(), LexError> {
        self.check_range(&range)?;
        let start_index = range.start.line_number as usize;
        let end_index = range.end.line_number as usize;

        let prefix = &self.lines[start_index].line_string().text()
            [..range.start.line_code_unit as usize];
        let suffix =
            &self.lines[end_index].line_string().text()[range.end.line_code_unit as usize..];
        let combined = format!("{prefix}{text}{suffix}");

        let replacement: Vec<Line> = combined
            .split(self.separator.as_str())
            .map(|line_text| Line::Untouched {
                line_string: LineString::new(line_text),
                mode_start: LineMode::Default,
            })
            .collect();
        self.lines.splice(start_index..=end_index, replacement);
        self.relex(start_index);
        Ok(())
    }

    /// Every line currently holding an error, keyed by line number.
    pub fn error_lines(&self) -> FxHashMap<u32, &LexError> {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(index, line)| line.error().map(|error| (index as u32, error)))
            .collect()
    }

    fn check_range(&self, range: &Range) -> Result<(), LexError> {
        let num_lines = self.lines.len() as u32;
        let bad = |kind| LexError::BadRange {
            kind,
            range: *range,
        };

        if range.start.line_number > range.end.line_number {
            return Err(bad(BadRangeKind::LineNumberStartGreaterThanLineNumberEnd));
        }
        if range.start.line_number >= num_lines {
            return Err(bad(BadRangeKind::LineNumberStartGreaterThanNumLines));
        }
        if range.end.line_number >= num_lines {
            return Err(bad(BadRangeKind::LineNumberEndGreaterThanNumLines));
        }
        let start_line = self.lines[range.start.line_number as usize].line_string();
        let end_line = self.lines[range.end.line_number as usize].line_string();
        if range.start.line_code_unit > start_line.len_code_units() {
            return Err(bad(BadRangeKind::CodeUnitStartGreaterThanLineLength));
        }
        if range.end.line_code_unit > end_line.len_code_units() {
            return Err(bad(BadRangeKind::CodeUnitEndGreaterThanLineLength));
        }
        if range.start.line_number == range.end.line_number
            && range.start.line_code_unit > range.end.line_code_unit
        {
            return Err(bad(
                BadRangeKind::SameLineCodeUnitStartGreaterThanCodeUnitEnd,
            ));
        }
        Ok(())
    }

    /// Re-lex from `from` to the fixpoint: an already-lexed line whose seed
    /// mode comes out unchanged stops the cascade.
    fn relex(&mut self, from: usize) {
        let mut mode = if from == 0 {
            LineMode::Default
        } else {
            self.lines[from - 1].mode_end()
        };

        for index in from..self.lines.len() {
            let untouched = matches!(self.lines[index], Line::Untouched { .. });
            if index > from && !untouched && self.lines[index].mode_start() == mode {
                break;
            }
            let line_string = self.lines[index].line_string().clone();
            self.lines[index] = tokenize(line_string, index as u32, mode);
            mode = self.lines[index].mode_end();
        }
    }
}

fn tokenize(line_string: LineString, line_number: u32, mode_start: LineMode) -> Line {
    match lex::read_line(&line_string, line_number, mode_start) {
        PartialResult::Ok(read) => Line::Touched {
            line_string,
            mode_start,
            mode_end: read.mode_end,
            tokens: read.tokens,
        },
        PartialResult::Partial { value, error } => Line::TouchedWithError {
            line_string,
            mode_start,
            mode_end: value.mode_end,
            tokens: value.tokens,
            error,
        },
        PartialResult::Err(error) => Line::Error {
            line_string,
            mode_start,
            mode_end: LineMode::Default,
            error,
        },
    }
}
