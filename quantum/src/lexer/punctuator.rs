// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt::{Display, Formatter};

use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, EnumIter)]
pub enum Punctuator {
    #[strum(serialize = "plus")]
    PlusSign,
    #[strum(serialize = "minus")]
    HyphenMinus,
    #[strum(serialize = "asterisk")]
    Asterisk,
    #[strum(serialize = "solidus")]
    Solidus,
    #[strum(serialize = "percent")]
    PercentageSign,
    #[strum(serialize = "power")]
    Power,
    #[strum(serialize = "floor division")]
    FloorDivision,

    #[strum(serialize = "assignment")]
    Assignment,
    #[strum(serialize = "equals")]
    Equals,
    #[strum(serialize = "strict equals")]
    StrictEquals,
    #[strum(serialize = "not equals")]
    NotEquals,
    #[strum(serialize = "strict not equals")]
    StrictNotEquals,
    #[strum(serialize = "less than")]
    LessThan,
    #[strum(serialize = "less than or equal")]
    LessThanOrEqual,
    #[strum(serialize = "greater than")]
    GreaterThan,
    #[strum(serialize = "greater than or equal")]
    GreaterThanOrEqual,

    #[strum(serialize = "left shift")]
    LeftShift,
    #[strum(serialize = "right shift")]
    RightShift,
    #[strum(serialize = "bitwise and")]
    BitwiseAnd,
    #[strum(serialize = "bitwise or")]
    BitwiseOr,
    #[strum(serialize = "bitwise xor")]
    BitwiseXor,
    #[strum(serialize = "bitwise not")]
    BitwiseNot,
    #[strum(serialize = "logical and")]
    LogicalAnd,
    #[strum(serialize = "logical or")]
    LogicalOr,
    #[strum(serialize = "exclamation mark")]
    Not,
    #[strum(serialize = "question mark")]
    QuestionMark,

    #[strum(serialize = "increment")]
    Increment,
    #[strum(serialize = "decrement")]
    Decrement,
    #[strum(serialize = "add assign")]
    AddAssign,
    #[strum(serialize = "subtract assign")]
    SubtractAssign,
    #[strum(serialize = "multiply assign")]
    MultiplyAssign,
    #[strum(serialize = "divide assign")]
    DivideAssign,
    #[strum(serialize = "modulo assign")]
    ModuloAssign,

    #[strum(serialize = "arrow")]
    Arrow,
    #[strum(serialize = "fat arrow")]
    FatArrow,
    #[strum(serialize = "period")]
    Period,
    #[strum(serialize = "at sign")]
    AtSign,
    #[strum(serialize = "colon")]
    Colon,
    #[strum(serialize = "comma")]
    Comma,
    #[strum(serialize = "semicolon")]
    Semicolon,
    #[strum(serialize = "opening parenthesis")]
    LeftParenthesis,
    #[strum(serialize = "closing parenthesis")]
    RightParenthesis,
    #[strum(serialize = "opening curly bracket")]
    LeftCurlyBracket,
    #[strum(serialize = "closing curly bracket")]
    RightCurlyBracket,
    #[strum(serialize = "opening square bracket")]
    LeftSquareBracket,
    #[strum(serialize = "closing square bracket")]
    RightSquareBracket,
}

impl Punctuator {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PlusSign => "+",
            Self::HyphenMinus => "-",
            Self::Asterisk => "*",
            Self::Solidus => "/",
            Self::PercentageSign => "%",
            Self::Power => "**",
            Self::FloorDivision => "//",
            Self::Assignment => "=",
            Self::Equals => "==",
            Self::StrictEquals => "===",
            Self::NotEquals => "!=",
            Self::StrictNotEquals => "!==",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
            Self::BitwiseAnd => "&",
            Self::BitwiseOr => "|",
            Self::BitwiseXor => "^",
            Self::BitwiseNot => "~",
            Self::LogicalAnd => "&&",
            Self::LogicalOr => "||",
            Self::Not => "!",
            Self::QuestionMark => "?",
            Self::Increment => "++",
            Self::Decrement => "--",
            Self::AddAssign => "+=",
            Self::SubtractAssign => "-=",
            Self::MultiplyAssign => "*=",
            Self::DivideAssign => "/=",
            Self::ModuloAssign => "%=",
            Self::Arrow => "->",
            Self::FatArrow => "=>",
            Self::Period => ".",
            Self::AtSign => "@",
            Self::Colon => ":",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::LeftParenthesis => "(",
            Self::RightParenthesis => ")",
            Self::LeftCurlyBracket => "{",
            Self::RightCurlyBracket => "}",
            Self::LeftSquareBracket => "[",
            Self::RightSquareBracket => "]",
        }
    }

    #[must_use]
    pub const fn is_opening_bracket(&self) -> bool {
        matches!(self, Self::LeftParenthesis | Self::LeftSquareBracket | Self::LeftCurlyBracket)
    }

    #[must_use]
    pub const fn is_closing_bracket(&self) -> bool {
        matches!(self, Self::RightParenthesis | Self::RightSquareBracket | Self::RightCurlyBracket)
    }

    /// Greedy longest match of an operator spelling at the start of `input`.
    #[must_use]
    pub fn longest_prefix_of(input: &str) -> Option<Self> {
        Self::iter()
            .filter(|punctuator| input.starts_with(punctuator.as_str()))
            .max_by_key(|punctuator| punctuator.as_str().len())
    }
}

impl Display for Punctuator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
