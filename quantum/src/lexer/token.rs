// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt::{Display, Formatter};

use crate::{FileLocation, FileRange, QString, Ranged};

use super::TokenKind;

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,

    /// The verbatim source text of this token.
    pub text: QString,
    pub begin: FileLocation,
    pub end: FileLocation,
}

impl Token {
    pub fn as_identifier(&self) -> Option<Ranged<QString>> {
        let TokenKind::Identifier(ident) = &self.kind else {
            return None;
        };

        Some(Ranged::new(self.range(), ident.clone()))
    }

    #[must_use]
    pub fn range(&self) -> FileRange {
        FileRange::new(self.begin, self.end)
    }

    /// One-based line number, as shown to users.
    #[must_use]
    pub fn line(&self) -> usize {
        self.begin.line() + 1
    }

    /// One-based column number, as shown to users.
    #[must_use]
    pub fn column(&self) -> usize {
        self.begin.column() + 1
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}
