// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

#![deny(elided_lifetimes_in_paths)]

mod ast;
pub mod config;
mod lexer;
mod parser;
mod string;
mod tree;
mod util;

pub use self::{
    ast::*,
    lexer::{
        Keyword,
        Lexer,
        LexerError,
        LexerErrorKind,
        Punctuator,
        TemplateStringToken,
        Token,
        TokenKind,
    },
    parser::{
        canonical_method_name,
        parse_source,
        Parser,
        ParseError,
        ParseResult,
    },
    string::{QString, Slice},
    tree::ParseTree,
    util::{FileLocation, FileRange, Ranged, SourceCode},
};
