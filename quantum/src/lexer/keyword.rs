// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt::Display;

use strum::IntoEnumIterator;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(strum::AsRefStr, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Keyword {
    And,
    As,
    Bool,
    Break,
    Char,
    Cin,
    Class,
    Const,
    Continue,
    Cout,
    Decrypt,
    Double,
    Elif,
    Else,
    Encrypt,
    Endl,
    Except,
    Extends,
    False,
    Finally,
    Float,
    Fn,
    For,
    From,
    Hash,
    If,
    Import,
    In,
    Input,
    Int,
    Let,
    Long,
    New,
    Nil,
    Not,
    Of,
    Or,
    Pass,
    Payload,
    Print,
    Printf,
    Raise,
    Return,
    Scan,
    Scanf,
    Short,
    String,
    Super,
    This,
    True,
    Try,
    Unsigned,
    Void,
    While,
}

impl Keyword {
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        Self::iter().find(|x| x.spellings().contains(&input))
    }

    /// Every surface spelling that produces this keyword. The first entry is
    /// the canonical one.
    #[must_use]
    pub const fn spellings(&self) -> &'static [&'static str] {
        match self {
            Self::And => &["and"],
            Self::As => &["as"],
            Self::Bool => &["bool"],
            Self::Break => &["break"],
            Self::Char => &["char"],
            Self::Cin => &["cin"],
            Self::Class => &["class"],
            Self::Const => &["const"],
            Self::Continue => &["continue"],
            Self::Cout => &["cout"],
            Self::Decrypt => &["decrypt"],
            Self::Double => &["double"],
            Self::Elif => &["elif"],
            Self::Else => &["else"],
            Self::Encrypt => &["encrypt"],
            Self::Endl => &["endl"],
            Self::Except => &["except", "catch"],
            Self::Extends => &["extends"],
            Self::False => &["false", "False"],
            Self::Finally => &["finally"],
            Self::Float => &["float"],
            Self::Fn => &["fn", "def", "function"],
            Self::For => &["for"],
            Self::From => &["from"],
            Self::Hash => &["hash"],
            Self::If => &["if"],
            Self::Import => &["import"],
            Self::In => &["in"],
            Self::Input => &["input"],
            Self::Int => &["int"],
            Self::Let => &["let", "var"],
            Self::Long => &["long"],
            Self::New => &["new"],
            Self::Nil => &["nil", "null", "undefined", "None"],
            Self::Not => &["not"],
            Self::Of => &["of"],
            Self::Or => &["or"],
            Self::Pass => &["pass"],
            Self::Payload => &["payload"],
            Self::Print => &["print"],
            Self::Printf => &["printf"],
            Self::Raise => &["raise", "throw"],
            Self::Return => &["return"],
            Self::Scan => &["scan"],
            Self::Scanf => &["scanf"],
            Self::Short => &["short"],
            Self::String => &["string"],
            Self::Super => &["super"],
            Self::This => &["this", "self"],
            Self::True => &["true", "True"],
            Self::Try => &["try"],
            Self::Unsigned => &["unsigned"],
            Self::Void => &["void"],
            Self::While => &["while"],
        }
    }

    /// C type names, accepted as annotations and otherwise ignored.
    #[must_use]
    pub const fn is_type(&self) -> bool {
        matches!(
            self,
            Self::Int | Self::Float | Self::Double | Self::Char | Self::String
                | Self::Bool | Self::Void | Self::Long | Self::Short | Self::Unsigned
        )
    }

    /// Vocabulary without behaviour.
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        matches!(self, Self::Scan | Self::Payload | Self::Encrypt | Self::Decrypt | Self::Hash)
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}
