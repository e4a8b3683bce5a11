// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

mod keyword;
mod layout;
mod lexer;
mod punctuator;
mod template_string_token;
mod token;
mod token_kind;

pub use self::{
    keyword::Keyword,
    lexer::{
        Lexer,
        LexerError,
        LexerErrorKind,
    },
    punctuator::Punctuator,
    template_string_token::TemplateStringToken,
    token::Token,
    token_kind::TokenKind,
};
