// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt::Display;

use colored::{Color, ColoredString, Colorize};
use quantum::{FileRange, LexerError, ParseError, SourceCode};
use strum::AsRefStr;

use crate::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
pub enum ErrorKind {
    LexicalError,
    ParseError,
    RuntimeError,
    TypeError,
    NameError,
    IndexError,

    /// Raised by the script itself.
    Exception,

    /// The script called `exit`. No handler catches it; the payload is the
    /// status code.
    Exit,
}

impl ErrorKind {
    #[must_use]
    pub fn name(&self) -> &str {
        self.as_ref()
    }

    /// Whether an `except Name` handler catches this kind. Some names from
    /// other languages are accepted as aliases.
    #[must_use]
    pub fn is_caught_by(&self, name: &str) -> bool {
        if name == self.name() {
            return true;
        }

        match self {
            Self::IndexError => matches!(name, "KeyError" | "RangeError"),
            Self::NameError => matches!(name, "ReferenceError" | "AttributeError"),
            Self::TypeError => name == "ValueError",
            Self::RuntimeError => matches!(name, "ZeroDivisionError" | "RecursionError"),
            _ => false,
        }
    }
}

#[derive(Clone, thiserror::Error)]
#[error("{}: {message}", .kind.name())]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    pub range: Option<FileRange>,

    /// The value given to `raise`, so handlers can bind it.
    pub payload: Option<Value>,
}

impl RuntimeError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            range: None,
            payload: None,
        }
    }

    #[must_use]
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RuntimeError, message)
    }

    #[must_use]
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    #[must_use]
    pub fn name_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NameError, message)
    }

    #[must_use]
    pub fn index_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IndexError, message)
    }

    #[must_use]
    pub fn undefined(name: &str) -> Self {
        Self::name_error(format!("`{name}` is not defined"))
    }

    #[must_use]
    pub fn index_out_of_range(length: usize, index: f64) -> Self {
        Self::index_error(format!("index {index} is out of range for length {length}"))
    }

    #[must_use]
    pub fn division_by_zero() -> Self {
        Self::runtime("division by zero")
    }

    #[must_use]
    pub fn raised(message: impl Into<String>, payload: Value) -> Self {
        Self {
            payload: Some(payload),
            ..Self::new(ErrorKind::Exception, message)
        }
    }

    #[must_use]
    pub fn exit(code: i32) -> Self {
        Self {
            payload: Some(Value::Number(f64::from(code))),
            ..Self::new(ErrorKind::Exit, format!("exited with status {code}"))
        }
    }

    /// The status code, when the script called `exit`.
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match (self.kind, &self.payload) {
            (ErrorKind::Exit, Some(Value::Number(code))) => Some(*code as i32),
            _ => None,
        }
    }

    /// Attaches a location unless a more precise one is already known.
    #[must_use]
    pub fn or_range(mut self, range: FileRange) -> Self {
        if self.range.is_none() {
            self.range = Some(range);
        }
        self
    }

    /// One-based line of the location, when known.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        self.range.map(|range| range.start().line() + 1)
    }
}

impl std::fmt::Debug for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("line", &self.line())
            .finish()
    }
}

impl From<LexerError> for RuntimeError {
    fn from(value: LexerError) -> Self {
        Self {
            range: Some(value.location.as_zero_range()),
            ..Self::new(ErrorKind::LexicalError, value.kind.to_string())
        }
    }
}

impl From<ParseError> for RuntimeError {
    fn from(value: ParseError) -> Self {
        if let ParseError::Lexical(error) = value {
            return error.into();
        }

        Self {
            range: Some(value.range()),
            ..Self::new(ErrorKind::ParseError, value.to_string())
        }
    }
}

pub struct ErrorPrinter {
    source_code: SourceCode,
    range: FileRange,
    message: String,
    hint: Option<String>,

    color: Color,
    line_number: ColoredString,
}

impl ErrorPrinter {
    #[must_use = "Use the `print` method to actually print"]
    pub fn new(source_code: &SourceCode, range: FileRange, message: impl Display) -> Self {
        Self {
            source_code: source_code.clone(),
            range,
            message: message.to_string(),
            hint: None,

            color: Color::Red,
            line_number: format!("{}", range.start().line() + 1).blue().bold(),
        }
    }

    #[must_use]
    pub fn for_error(source_code: &SourceCode, error: &RuntimeError) -> Self {
        Self::new(source_code, error.range.unwrap_or_default(), &error.message)
            .kind(error.kind)
    }

    #[must_use]
    pub fn kind(self, kind: ErrorKind) -> Self {
        Self {
            hint: self.hint.or_else(|| Some(kind.name().to_string())),
            ..self
        }
    }

    #[must_use]
    pub fn hint(self, hint: impl Into<Option<String>>) -> Self {
        Self {
            hint: hint.into(),
            ..self
        }
    }

    pub fn print(self) {
        self.print_prelude();

        self.print_lines();

        self.print_postlude();
    }

    fn print_prelude(&self) {
        eprintln!("{}: {}", "error".color(self.color).bold(), self.message.bold());

        eprintln!();
    }

    fn print_lines(&self) {
        let line = self.range.start().line();

        if let Some(previous) = line.checked_sub(1).and_then(|line| self.source_code.line(line)) {
            if !previous.trim().is_empty() {
                self.print_line(false, previous);
            }
        }

        let Some(primary) = self.source_code.line(line) else {
            return;
        };
        self.print_line(true, primary);

        self.print_error_indicator();

        if let Some(next) = self.source_code.line(line + 1) {
            if !next.trim().is_empty() {
                self.print_line(false, next);
            }
        }
    }

    fn print_line(&self, is_primary: bool, line: &str) {
        self.print_line_prefix(is_primary);
        eprintln!("{line}");
    }

    fn print_error_indicator(&self) {
        let spaces = " ".repeat(self.range.start().column());
        let caret = "^".color(self.color).bold();
        let tildes = "~".repeat(self.range.len().saturating_sub(1)).color(self.color);

        let hint = match &self.hint {
            Some(hint) => hint.color(self.color).bold(),
            None => "".bold(),
        };

        self.print_line_prefix(false);
        eprintln!("{spaces}{caret}{tildes} {hint}");
    }

    fn print_line_prefix(&self, is_primary: bool) {
        let separator = " | ".blue().bold();

        if is_primary {
            eprint!("{} {separator}", self.line_number);
        } else {
            eprint!("{} {separator}", " ".repeat(self.line_number.len()));
        }
    }

    fn print_postlude(&self) {
        eprintln!();

        let path = self.source_code.path().display();
        let line = self.range.start().line() + 1;
        let column = self.range.start().column() + 1;

        eprintln!("In {path}:{line}:{column}\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantum::Lexer;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorKind::IndexError, "IndexError", true)]
    #[case(ErrorKind::IndexError, "KeyError", true)]
    #[case(ErrorKind::NameError, "AttributeError", true)]
    #[case(ErrorKind::TypeError, "NameError", false)]
    #[case(ErrorKind::Exception, "TypeError", false)]
    #[case(ErrorKind::Exit, "Exception", false)]
    fn kinds_are_caught_by_name(#[case] kind: ErrorKind, #[case] handler: &str, #[case] expected: bool) {
        assert_eq!(kind.is_caught_by(handler), expected);
    }

    #[test]
    fn lexer_errors_keep_their_location() {
        let source_code = SourceCode::anonymous("let a = 1\nlet b = \"open");
        let error = Lexer::new(&source_code).tokenize().unwrap_err();

        let error = RuntimeError::from(error);
        assert_eq!(error.kind, ErrorKind::LexicalError);
        assert_eq!(error.line(), Some(2));
    }

    #[test]
    fn innermost_range_wins() {
        let inner = FileRange::new(quantum::FileLocation::new(10, 1, 2), quantum::FileLocation::new(12, 1, 4));
        let outer = FileRange::new(quantum::FileLocation::new(0, 0, 0), quantum::FileLocation::new(20, 2, 0));

        let error = RuntimeError::runtime("boom").or_range(inner).or_range(outer);
        assert_eq!(error.range, Some(inner));
        assert_eq!(error.to_string(), "RuntimeError: boom");
    }
}
