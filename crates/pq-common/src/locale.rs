//! Localization catalog for user-facing messages.
//!
//! Every message the toolchain shows a user is looked up by error code in a
//! [`LocaleCatalog`]. The catalog is injected read-only data: hosts supply
//! their own translations keyed by the same codes, or fall back to the
//! built-in `en-US` table.

use rustc_hash::FxHashMap;

use crate::token::TokenKind;

/// The locale every catalog defaults to.
pub const DEFAULT_LOCALE: &str = "en-US";

const EN_US: &[(&str, &str)] = &[
    ("error_common_invariantError", "invariant violated: {reason}"),
    ("error_common_unknown", "unknown error: {error}"),
    ("error_lex_lineNumber_lessThanZero", "line number {lineNumber} is less than zero"),
    (
        "error_lex_lineNumber_greaterThanNumLines",
        "line number {lineNumber} is greater than the number of lines ({numLines})",
    ),
    (
        "error_lex_badRange_sameLine_codeUnitStartGreaterThanCodeUnitEnd",
        "the range starts after it ends on line {lineNumber}",
    ),
    (
        "error_lex_badRange_lineNumberStart_greaterThanLineNumberEnd",
        "the range's start line {lineNumberStart} is after its end line {lineNumberEnd}",
    ),
    (
        "error_lex_badRange_lineNumberStart_lessThanZero",
        "the range's start line {lineNumberStart} is less than zero",
    ),
    (
        "error_lex_badRange_lineNumberStart_greaterThanNumLines",
        "the range's start line {lineNumberStart} is past the last line",
    ),
    (
        "error_lex_badRange_lineNumberEnd_greaterThanNumLines",
        "the range's end line {lineNumberEnd} is past the last line",
    ),
    (
        "error_lex_badRange_codeUnitStart_greaterThanLineLength",
        "the range's start offset is past the end of line {lineNumber}",
    ),
    (
        "error_lex_badRange_codeUnitEnd_greaterThanLineLength",
        "the range's end offset is past the end of line {lineNumber}",
    ),
    ("error_lex_badState", "the line already failed to lex: {error}"),
    ("error_lex_endOfStream", "no more tokens to read"),
    ("error_lex_errorLineMap", "one or more lines failed to lex: {lines}"),
    (
        "error_lex_expectedHexLiteral",
        "expected a hex literal on line {lineNumber}, column {column}",
    ),
    (
        "error_lex_expectedKeywordOrIdentifier",
        "expected a keyword or identifier on line {lineNumber}, column {column}",
    ),
    (
        "error_lex_expectedNumericLiteral",
        "expected a numeric literal on line {lineNumber}, column {column}",
    ),
    (
        "error_lex_unexpectedEof",
        "the line ended unexpectedly on line {lineNumber}, column {column}",
    ),
    (
        "error_lex_unexpectedRead",
        "unexpected character on line {lineNumber}, column {column}",
    ),
    (
        "error_lex_unterminatedMultilineToken_comment",
        "a multiline comment starting on line {lineNumber} is never closed",
    ),
    (
        "error_lex_unterminatedMultilineToken_quotedIdentifier",
        "a quoted identifier starting on line {lineNumber} is never closed",
    ),
    (
        "error_lex_unterminatedMultilineToken_string",
        "a string starting on line {lineNumber} is never closed",
    ),
    (
        "error_parse_csvContinuation_danglingComma",
        "a comma cannot be followed by the end of the list",
    ),
    (
        "error_parse_csvContinuation_letExpression",
        "a comma cannot be followed by the keyword in",
    ),
    (
        "error_parse_expectedAnyTokenKind",
        "expected one of {expected}, found {found}",
    ),
    ("error_parse_expectedTokenKind", "expected {expected}, found {found}"),
    (
        "error_parse_expectedGeneralizedIdentifier",
        "expected a field name, found {found}",
    ),
    ("error_parse_invalidPrimitiveType", "{found} is not a primitive type"),
    (
        "error_parse_requiredParameterAfterOptional",
        "a required parameter cannot follow an optional parameter",
    ),
    ("error_parse_unterminatedBracket", "the bracket opened here is never closed"),
    (
        "error_parse_unterminatedParenthesis",
        "the parenthesis opened here is never closed",
    ),
    ("error_parse_unusedTokensRemain", "parsing finished with tokens left over"),
    ("tokenKind_equal", "an equals sign"),
    ("tokenKind_fatArrow", "a function arrow"),
    ("tokenKind_identifier", "an identifier"),
    ("tokenKind_leftParenthesis", "an opening parenthesis"),
    ("tokenKind_rightBrace", "a closing brace"),
    ("tokenKind_rightBracket", "a closing bracket"),
    ("tokenKind_rightParenthesis", "a closing parenthesis"),
    ("tokenKind_semicolon", "a semicolon"),
    ("tokenKind_endOfStream", "the end of the document"),
];

/// A read-only error-code → message-template mapping.
///
/// Templates use `{name}` placeholders filled in by [`LocaleCatalog::format`].
#[derive(Debug, Clone)]
pub struct LocaleCatalog {
    locale: String,
    entries: FxHashMap<String, String>,
}

impl LocaleCatalog {
    /// Build a catalog from caller-supplied entries.
    pub fn new(locale: impl Into<String>, entries: FxHashMap<String, String>) -> Self {
        Self {
            locale: locale.into(),
            entries,
        }
    }

    /// The built-in `en-US` catalog.
    pub fn en_us() -> Self {
        let entries = EN_US
            .iter()
            .map(|(code, template)| (code.to_string(), template.to_string()))
            .collect();
        Self::new(DEFAULT_LOCALE, entries)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// The raw template for a code, falling back to the code itself so a
    /// missing translation still produces something traceable.
    pub fn get<'a>(&'a self, code: &'a str) -> &'a str {
        self.entries.get(code).map(String::as_str).unwrap_or(code)
    }

    /// Look up a template and substitute `{name}` placeholders.
    pub fn format(&self, code: &str, args: &[(&str, &str)]) -> String {
        let mut out = self.get(code).to_string();
        for (name, value) in args {
            out = out.replace(&format!("{{{name}}}"), value);
        }
        out
    }

    /// The display name of a token kind, for use inside error messages.
    pub fn token_kind_name(&self, kind: TokenKind) -> String {
        let code = match kind {
            TokenKind::Equal => "tokenKind_equal",
            TokenKind::FatArrow => "tokenKind_fatArrow",
            TokenKind::Identifier => "tokenKind_identifier",
            TokenKind::LeftParenthesis => "tokenKind_leftParenthesis",
            TokenKind::RightBrace => "tokenKind_rightBrace",
            TokenKind::RightBracket => "tokenKind_rightBracket",
            TokenKind::RightParenthesis => "tokenKind_rightParenthesis",
            TokenKind::Semicolon => "tokenKind_semicolon",
            _ => return format!("{kind:?}"),
        };
        self.get(code).to_string()
    }
}

impl Default for LocaleCatalog {
    fn default() -> Self {
        Self::en_us()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_substitutes_placeholders() {
        let catalog = LocaleCatalog::en_us();
        assert_eq!(
            catalog.format(
                "error_lex_expectedHexLiteral",
                &[("lineNumber", "3"), ("column", "7")],
            ),
            "expected a hex literal on line 3, column 7"
        );
    }

    #[test]
    fn missing_code_falls_back_to_the_code() {
        let catalog = LocaleCatalog::en_us();
        assert_eq!(catalog.get("error_no_such_code"), "error_no_such_code");
    }

    #[test]
    fn caller_supplied_entries_win() {
        let mut entries = FxHashMap::default();
        entries.insert(
            "error_lex_endOfStream".to_string(),
            "plus de jetons".to_string(),
        );
        let catalog = LocaleCatalog::new("fr-FR", entries);
        assert_eq!(catalog.get("error_lex_endOfStream"), "plus de jetons");
        assert_eq!(catalog.locale(), "fr-FR");
    }

    #[test]
    fn token_kind_names() {
        let catalog = LocaleCatalog::en_us();
        assert_eq!(
            catalog.token_kind_name(TokenKind::RightParenthesis),
            "a closing parenthesis"
        );
        // Kinds without a dedicated entry fall back to the debug name.
        assert_eq!(catalog.token_kind_name(TokenKind::KeywordAnd), "KeywordAnd");
    }
}
