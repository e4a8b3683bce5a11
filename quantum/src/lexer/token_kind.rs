// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt::{Display, Formatter, Write};

use crate::QString;

use super::{Keyword, Punctuator, TemplateStringToken};

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Keyword(Keyword),

    Identifier(QString),

    /// Kept as written; conversion to a float happens in the parser.
    Number(QString),
    StringLiteral(QString),
    TemplateString(Vec<TemplateStringToken>),

    Punctuator(Punctuator),

    Newline,
    Indent,
    Dedent,
    EndOfFile,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Keyword(..) => "keyword",

            Self::Identifier(..) => "identifier",
            Self::Number(..) => "number",
            Self::StringLiteral(..) => "string",
            Self::TemplateString(..) => "template string",

            Self::Punctuator(punctuator) => punctuator.into(),

            Self::Newline => "newline",
            Self::Indent => "indent",
            Self::Dedent => "dedent",
            Self::EndOfFile => "end of file",
        }
    }

    /// Whether this token ends an operand, which makes a following `//`
    /// a floor division instead of a comment.
    #[must_use]
    pub fn produces_value(&self) -> bool {
        match self {
            Self::Identifier(..) | Self::Number(..) | Self::StringLiteral(..) | Self::TemplateString(..) => true,
            Self::Keyword(keyword) => matches!(keyword, Keyword::True | Keyword::False | Keyword::Nil | Keyword::This),
            Self::Punctuator(punctuator) => matches!(punctuator, Punctuator::RightParenthesis | Punctuator::RightSquareBracket),
            _ => false,
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identifier(ident) => ident.fmt(f),
            Self::Number(number) => number.fmt(f),
            Self::Keyword(keyword) => f.write_str(keyword.as_ref()),
            Self::Punctuator(punctuator) => punctuator.fmt(f),
            Self::StringLiteral(str) => f.write_fmt(format_args!("{str:?}")),
            Self::TemplateString(ts) => {
                f.write_char('`')?;

                for part in ts {
                    part.fmt(f)?;
                }

                f.write_char('`')
            }
            Self::Newline | Self::Indent | Self::Dedent | Self::EndOfFile => f.write_str(self.name()),
        }
    }
}
