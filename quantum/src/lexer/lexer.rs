// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{error::Error, fmt::Display, str::CharIndices};

use strum::AsRefStr;
use thiserror::Error;

use crate::{FileLocation, Keyword, Punctuator, QString, Slice, SourceCode, TemplateStringToken, Token, TokenKind};

use super::layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InterpolationStyle {
    /// `` `a ${b} c` ``
    DollarBrace,

    /// `f"a {b} c"`
    Brace,
}

pub struct Lexer<'source_code> {
    input: &'source_code SourceCode,
    chars: CharIndices<'source_code>,

    current: Option<(FileLocation, char)>,
    line: usize,
    column: usize,
    previous_produces_value: bool,
}

impl<'source_code> Lexer<'source_code> {
    pub fn new(input: &'source_code SourceCode) -> Self {
        Self {
            input,
            chars: input.char_indices(),
            current: None,
            line: 0,
            column: 0,
            previous_produces_value: false,
        }
    }

    /// Produces the full token stream, including layout tokens and the
    /// terminating [`TokenKind::EndOfFile`].
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }

        let end = self.current_location();
        tokens.push(Token {
            kind: TokenKind::EndOfFile,
            text: QString::empty(),
            begin: end,
            end,
        });

        Ok(layout::apply(self.input, tokens))
    }

    pub fn next_token(&mut self) -> Result<Option<Token>, LexerError> {
        self.skip_whitespace_and_comments();

        let Some(ch) = self.peek_char() else {
            return Ok(None);
        };

        let token = match ch {
            '\n' => self.consume_single_char_token(TokenKind::Newline),
            '"' | '\'' => self.consume_string(ch)?,
            '`' => {
                let begin = self.current_location();
                self.consume_template_string(begin, '`', InterpolationStyle::DollarBrace)?
            }

            'f' | 'F' if matches!(self.peek_second_char(), Some('"' | '\'')) => {
                let begin = self.current_location();
                self.consume_char();
                let quote = self.peek_char().unwrap_or('"');
                self.consume_template_string(begin, quote, InterpolationStyle::Brace)?
            }

            c if c.is_alphabetic() || c == '_' => self.consume_identifier_or_keyword(),
            '0'..='9' => self.consume_number(),
            '.' if matches!(self.peek_second_char(), Some('0'..='9')) => self.consume_number(),

            _ => self.consume_operator()?,
        };

        self.previous_produces_value = token.kind.produces_value();
        Ok(Some(token))
    }

    fn make_token(&self, kind: TokenKind, begin: FileLocation, end: FileLocation) -> Token {
        Token {
            kind,
            text: self.input.contents().slice(begin.offset()..end.offset()),
            begin,
            end,
        }
    }

    fn consume_single_char_token(&mut self, kind: TokenKind) -> Token {
        let begin = self.current_location();

        self.consume_char();

        let end = self.current_location();
        self.make_token(kind, begin, end)
    }

    fn consume_operator(&mut self) -> Result<Token, LexerError> {
        let begin = self.current_location();
        let remaining = self.remaining();

        let Some(punctuator) = Punctuator::longest_prefix_of(remaining) else {
            let character = remaining.chars().next().unwrap_or_default();
            return Err(LexerError {
                location: begin,
                kind: LexerErrorKind::UnexpectedCharacter { character },
            });
        };

        for _ in punctuator.as_str().chars() {
            self.consume_char();
        }

        let end = self.current_location();
        Ok(self.make_token(TokenKind::Punctuator(punctuator), begin, end))
    }

    fn consume_string(&mut self, quote: char) -> Result<Token, LexerError> {
        let begin = self.current_location();

        let triple: String = [quote; 3].iter().collect();
        let delimiter = if self.remaining().starts_with(&triple) {
            triple
        } else {
            quote.to_string()
        };

        for _ in delimiter.chars() {
            self.consume_char();
        }

        let mut buf = String::new();

        loop {
            if self.remaining().starts_with(delimiter.as_str()) {
                for _ in delimiter.chars() {
                    self.consume_char();
                }
                break;
            }

            let Some(c) = self.next_char() else {
                return Err(LexerError {
                    location: begin,
                    kind: LexerErrorKind::UnterminatedString,
                });
            };

            if c == '\\' {
                buf.push(self.consume_escape(&[], begin)?);
            } else {
                buf.push(c);
            }
        }

        let end = self.current_location();
        Ok(self.make_token(TokenKind::StringLiteral(QString::from(buf)), begin, end))
    }

    fn consume_escape(&mut self, extra: &[char], string_begin: FileLocation) -> Result<char, LexerError> {
        let location = self.current_location();

        let Some(c) = self.next_char() else {
            return Err(LexerError {
                location: string_begin,
                kind: LexerErrorKind::UnterminatedString,
            });
        };

        Ok(match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            '\\' | '"' | '\'' => c,
            'u' => self.consume_unicode_escape(location)?,
            c if extra.contains(&c) => c,

            invalid => {
                return Err(LexerError {
                    location,
                    kind: LexerErrorKind::InvalidEscape { invalid },
                });
            }
        })
    }

    fn consume_unicode_escape(&mut self, location: FileLocation) -> Result<char, LexerError> {
        let mut value = 0;

        for _ in 0..4 {
            let digit = self.peek_char().and_then(|c| c.to_digit(16)).ok_or(LexerError {
                location,
                kind: LexerErrorKind::InvalidUnicodeEscape,
            })?;

            self.consume_char();
            value = value * 16 + digit;
        }

        char::from_u32(value).ok_or(LexerError {
            location,
            kind: LexerErrorKind::InvalidUnicodeEscape,
        })
    }

    fn consume_template_string(&mut self, begin: FileLocation, closing: char, style: InterpolationStyle) -> Result<Token, LexerError> {
        self.consume_char();

        let mut parts = Vec::new();
        let mut plain = String::new();
        let mut plain_begin = self.current_location();

        loop {
            let location = self.current_location();
            let Some(c) = self.next_char() else {
                return Err(LexerError {
                    location: begin,
                    kind: LexerErrorKind::UnterminatedTemplateString,
                });
            };

            match c {
                c if c == closing => {
                    flush_plain(&mut parts, &mut plain, plain_begin, location);
                    break;
                }

                '\\' => plain.push(self.consume_escape(&['`', '$', '{', '}'], begin)?),

                '$' if style == InterpolationStyle::DollarBrace && self.peek_char() == Some('{') => {
                    self.consume_char();
                    flush_plain(&mut parts, &mut plain, plain_begin, location);
                    parts.push(TemplateStringToken::Expression(self.consume_interpolation(location)?));
                    plain_begin = self.current_location();
                }

                '{' if style == InterpolationStyle::Brace => {
                    if self.peek_char() == Some('{') {
                        self.consume_char();
                        plain.push('{');
                        continue;
                    }

                    flush_plain(&mut parts, &mut plain, plain_begin, location);
                    parts.push(TemplateStringToken::Expression(self.consume_interpolation(location)?));
                    plain_begin = self.current_location();
                }

                '}' if style == InterpolationStyle::Brace && self.peek_char() == Some('}') => {
                    self.consume_char();
                    plain.push('}');
                }

                c => plain.push(c),
            }
        }

        let end = self.current_location();
        Ok(self.make_token(TokenKind::TemplateString(parts), begin, end))
    }

    /// Tokenizes an embedded expression up to its matching `}`.
    fn consume_interpolation(&mut self, start: FileLocation) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        let mut depth = 0usize;
        self.previous_produces_value = false;

        loop {
            let Some(token) = self.next_token()? else {
                return Err(LexerError {
                    location: start,
                    kind: LexerErrorKind::UnterminatedInterpolation,
                });
            };

            match token.kind {
                TokenKind::Newline => continue,
                TokenKind::Punctuator(Punctuator::LeftCurlyBracket) => depth += 1,
                TokenKind::Punctuator(Punctuator::RightCurlyBracket) => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                _ => (),
            }

            tokens.push(token);
        }

        Ok(tokens)
    }

    fn consume_identifier_or_keyword(&mut self) -> Token {
        let begin = self.current_location();

        while let Some(c) = self.peek_char() {
            if !is_identifier_char(c) {
                break;
            }

            self.consume_char();
        }

        let end = self.current_location();
        let str = self.input.contents().slice(begin.offset()..end.offset());

        let kind = match Keyword::parse(&str) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier(str),
        };

        self.make_token(kind, begin, end)
    }

    fn consume_number(&mut self) -> Token {
        let begin = self.current_location();

        if self.peek_char() == Some('0') && matches!(self.peek_second_char(), Some('x' | 'X')) {
            self.consume_char();
            self.consume_char();
            self.consume_while(|c| c.is_ascii_hexdigit());
        } else {
            self.consume_while(|c| c.is_ascii_digit());

            if self.peek_char() == Some('.') && matches!(self.peek_second_char(), Some('0'..='9')) {
                self.consume_char();
                self.consume_while(|c| c.is_ascii_digit());
            }

            if matches!(self.peek_char(), Some('e' | 'E')) && has_exponent_digits(self.remaining()) {
                self.consume_char();
                if matches!(self.peek_char(), Some('+' | '-')) {
                    self.consume_char();
                }
                self.consume_while(|c| c.is_ascii_digit());
            }
        }

        let end = self.current_location();
        let text = self.input.contents().slice(begin.offset()..end.offset());
        self.make_token(TokenKind::Number(text), begin, end)
    }

    fn consume_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek_char() {
            if !predicate(c) {
                break;
            }

            self.consume_char();
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(c) = self.peek_char() {
            match c {
                '\n' => break,
                '#' => self.consume_until_end_of_line(),
                '/' => {
                    let remaining = self.remaining();
                    if remaining.starts_with("/*") {
                        self.consume_block_comment();
                    } else if remaining.starts_with("//") && !self.previous_produces_value {
                        self.consume_until_end_of_line();
                    } else {
                        break;
                    }
                }
                c if c.is_whitespace() => self.consume_char(),
                _ => break,
            }
        }
    }

    fn consume_until_end_of_line(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }

            self.consume_char();
        }
    }

    fn consume_block_comment(&mut self) {
        self.consume_char();
        self.consume_char();

        while self.peek_char().is_some() {
            if self.remaining().starts_with("*/") {
                self.consume_char();
                self.consume_char();
                break;
            }

            self.consume_char();
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        if let Some((_, c)) = self.current {
            return Some(c);
        }

        self.current = self.chars.next()
            .map(|(offset, char)| {
                let location = FileLocation::new(offset, self.line, self.column);

                if char == '\n' {
                    self.line += 1;
                    self.column = 0;
                } else {
                    self.column += 1;
                }

                (location, char)
            });
        Some(self.current?.1)
    }

    fn peek_second_char(&mut self) -> Option<char> {
        self.remaining().chars().nth(1)
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.consume_char();
        Some(c)
    }

    fn consume_char(&mut self) {
        self.current = None;
        _ = self.peek_char();
    }

    fn current_location(&mut self) -> FileLocation {
        _ = self.peek_char();
        match self.current {
            Some((location, _)) => location,
            None => FileLocation::new(self.input.len(), self.line, self.column),
        }
    }

    /// The unconsumed input, starting at the current character.
    fn remaining(&mut self) -> &'source_code str {
        let offset = self.current_location().offset();
        let input: &'source_code SourceCode = self.input;
        &input[offset..]
    }
}

fn flush_plain(parts: &mut Vec<TemplateStringToken>, plain: &mut String, begin: FileLocation, end: FileLocation) {
    if plain.is_empty() {
        return;
    }

    parts.push(TemplateStringToken::Plain {
        begin,
        end,
        str: QString::from(std::mem::take(plain)),
    });
}

/// `input` starts at the `e` of a possible exponent.
fn has_exponent_digits(input: &str) -> bool {
    let mut chars = input.chars().skip(1).peekable();
    if matches!(chars.peek(), Some('+' | '-')) {
        chars.next();
    }

    chars.next().is_some_and(|c| c.is_ascii_digit())
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexerError {
    pub location: FileLocation,
    pub kind: LexerErrorKind,
}

impl Display for LexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}

impl Error for LexerError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, AsRefStr)]
pub enum LexerErrorKind {
    #[error("Unterminated string literal")]
    UnterminatedString,

    #[error("Unterminated template string")]
    UnterminatedTemplateString,

    #[error("Unterminated interpolation, expected `}}` to close the expression")]
    UnterminatedInterpolation,

    #[error("Invalid escape sequence `\\{invalid}`")]
    InvalidEscape { invalid: char },

    #[error("Invalid unicode escape, expected four hexadecimal digits after `\\u`")]
    InvalidUnicodeEscape,

    #[error("Unexpected character `{character}`")]
    UnexpectedCharacter { character: char },
}

impl LexerErrorKind {
    #[must_use]
    pub fn name(&self) -> &str {
        self.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    fn tokenize(input: &str) -> Vec<Token> {
        let source_code = SourceCode::anonymous(input.to_string());
        Lexer::new(&source_code).tokenize().expect("input should tokenize")
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).into_iter().map(|token| token.kind).collect()
    }

    fn lex_error(input: &str) -> LexerError {
        let source_code = SourceCode::anonymous(input.to_string());
        Lexer::new(&source_code).tokenize().expect_err("input should not tokenize")
    }

    #[rstest]
    #[case("h", Token {
        kind: TokenKind::Identifier(QString::new_static("h")),
        text: QString::new_static("h"),
        begin: FileLocation::new(0, 0, 0),
        end: FileLocation::new(1, 0, 1),
    })]
    #[case("\"Hal\\nlo\" ", Token {
        kind: TokenKind::StringLiteral(QString::new_static("Hal\nlo")),
        text: QString::new_static("\"Hal\\nlo\""),
        begin: FileLocation::new(0, 0, 0),
        end: FileLocation::new(9, 0, 9),
    })]
    #[case("'it\\'s' ", Token {
        kind: TokenKind::StringLiteral(QString::new_static("it's")),
        text: QString::new_static("'it\\'s'"),
        begin: FileLocation::new(0, 0, 0),
        end: FileLocation::new(7, 0, 7),
    })]
    #[case("\"\\u0041\"", Token {
        kind: TokenKind::StringLiteral(QString::new_static("A")),
        text: QString::new_static("\"\\u0041\""),
        begin: FileLocation::new(0, 0, 0),
        end: FileLocation::new(8, 0, 8),
    })]
    #[case("3.25e-2", Token {
        kind: TokenKind::Number(QString::new_static("3.25e-2")),
        text: QString::new_static("3.25e-2"),
        begin: FileLocation::new(0, 0, 0),
        end: FileLocation::new(7, 0, 7),
    })]
    #[case("0x80", Token {
        kind: TokenKind::Number(QString::new_static("0x80")),
        text: QString::new_static("0x80"),
        begin: FileLocation::new(0, 0, 0),
        end: FileLocation::new(4, 0, 4),
    })]
    #[case("  def", Token {
        kind: TokenKind::Keyword(Keyword::Fn),
        text: QString::new_static("def"),
        begin: FileLocation::new(2, 0, 2),
        end: FileLocation::new(5, 0, 5),
    })]
    fn first_token(#[case] input: &'static str, #[case] expected: Token) {
        let actual = tokenize(input).into_iter().next();
        assert_eq!(actual, Some(expected));
    }

    #[test]
    fn every_operator_round_trips() {
        for punctuator in Punctuator::iter() {
            // Without an operand in front, `//` starts a comment.
            if punctuator == Punctuator::FloorDivision {
                continue;
            }

            let tokens = tokenize(punctuator.as_str());
            assert_eq!(tokens.len(), 2, "operator {punctuator:?} produced {tokens:?}");
            assert_eq!(tokens[0].kind, TokenKind::Punctuator(punctuator));
            assert_eq!(tokens[0].text, punctuator.as_str());
            assert_eq!(tokens[1].kind, TokenKind::EndOfFile);
        }
    }

    #[rstest]
    #[case("7 // 2", vec![
        TokenKind::Number(QString::new_static("7")),
        TokenKind::Punctuator(Punctuator::FloorDivision),
        TokenKind::Number(QString::new_static("2")),
        TokenKind::EndOfFile,
    ])]
    #[case("// just a comment\nx", vec![
        TokenKind::Newline,
        TokenKind::Identifier(QString::new_static("x")),
        TokenKind::EndOfFile,
    ])]
    #[case("a /* inner */ b # trailing", vec![
        TokenKind::Identifier(QString::new_static("a")),
        TokenKind::Identifier(QString::new_static("b")),
        TokenKind::EndOfFile,
    ])]
    #[case("a !== b", vec![
        TokenKind::Identifier(QString::new_static("a")),
        TokenKind::Punctuator(Punctuator::StrictNotEquals),
        TokenKind::Identifier(QString::new_static("b")),
        TokenKind::EndOfFile,
    ])]
    #[case("x.y", vec![
        TokenKind::Identifier(QString::new_static("x")),
        TokenKind::Punctuator(Punctuator::Period),
        TokenKind::Identifier(QString::new_static("y")),
        TokenKind::EndOfFile,
    ])]
    #[case("1.foo", vec![
        TokenKind::Number(QString::new_static("1")),
        TokenKind::Punctuator(Punctuator::Period),
        TokenKind::Identifier(QString::new_static("foo")),
        TokenKind::EndOfFile,
    ])]
    fn token_kinds(#[case] input: &str, #[case] expected: Vec<TokenKind>) {
        assert_eq!(kinds(input), expected);
    }

    #[test]
    fn template_string_splits_parts() {
        let tokens = tokenize("`a ${x + 1} b`");
        let TokenKind::TemplateString(parts) = &tokens[0].kind else {
            panic!("expected template string, got {:?}", tokens[0].kind);
        };

        assert_eq!(parts.len(), 3);
        assert!(matches!(&parts[0], TemplateStringToken::Plain { str, .. } if str == "a "));
        let TemplateStringToken::Expression(expr) = &parts[1] else {
            panic!("expected expression part");
        };
        assert_eq!(expr.len(), 3);
        assert!(matches!(&parts[2], TemplateStringToken::Plain { str, .. } if str == " b"));
    }

    #[test]
    fn f_string_supports_nested_braces_and_escaped_braces() {
        let tokens = tokenize("f\"{{{ {'k': 1}['k'] }}}\"");
        let TokenKind::TemplateString(parts) = &tokens[0].kind else {
            panic!("expected template string, got {:?}", tokens[0].kind);
        };

        assert_eq!(parts.len(), 3);
        assert!(matches!(&parts[0], TemplateStringToken::Plain { str, .. } if str == "{"));
        assert!(matches!(&parts[1], TemplateStringToken::Expression(tokens) if tokens.len() == 8));
        assert!(matches!(&parts[2], TemplateStringToken::Plain { str, .. } if str == "}"));
    }

    #[test]
    fn positions_are_tracked_across_lines() {
        let tokens = tokenize("a\n  bc");
        let bc = tokens.iter().find(|token| token.text == "bc").expect("bc token");
        assert_eq!(bc.line(), 2);
        assert_eq!(bc.column(), 3);
    }

    #[rstest]
    #[case("\"abc", LexerErrorKind::UnterminatedString)]
    #[case("`abc", LexerErrorKind::UnterminatedTemplateString)]
    #[case("`abc ${x", LexerErrorKind::UnterminatedInterpolation)]
    #[case("\"\\q\"", LexerErrorKind::InvalidEscape { invalid: 'q' })]
    #[case("\"\\u12\"", LexerErrorKind::InvalidUnicodeEscape)]
    #[case("a $ b", LexerErrorKind::UnexpectedCharacter { character: '$' })]
    fn errors(#[case] input: &str, #[case] expected: LexerErrorKind) {
        assert_eq!(lex_error(input).kind, expected);
    }

    #[test]
    fn error_location_points_at_offending_character() {
        let error = lex_error("x = 1\ny = $");
        assert_eq!(error.location.line(), 1);
        assert_eq!(error.location.column(), 4);
    }
}
