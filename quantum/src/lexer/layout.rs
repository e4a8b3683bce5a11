// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use crate::{Punctuator, QString, SourceCode, Token, TokenKind};

const TAB_WIDTH: usize = 4;

/// Inserts [`TokenKind::Indent`] and [`TokenKind::Dedent`] tokens for
/// colon-introduced blocks. Bracketed regions never produce layout tokens.
pub(super) fn apply(source: &SourceCode, tokens: Vec<Token>) -> Vec<Token> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut indents = vec![0];
    let mut depth = 0usize;
    let mut at_line_start = false;
    let mut opens_block = false;

    for token in tokens {
        match &token.kind {
            TokenKind::Newline => {
                if depth == 0 {
                    at_line_start = true;
                }
                output.push(token);
                continue;
            }

            TokenKind::EndOfFile => {
                while indents.len() > 1 {
                    indents.pop();
                    output.push(layout_token(TokenKind::Dedent, &token));
                }
                output.push(token);
                continue;
            }

            _ => (),
        }

        if at_line_start {
            at_line_start = false;

            let indent = indentation_of(source, &token);
            let current = indents.last().copied().unwrap_or_default();

            if opens_block && indent > current {
                indents.push(indent);
                output.push(layout_token(TokenKind::Indent, &token));
            } else {
                while indents.len() > 1 && indent < indents.last().copied().unwrap_or_default() {
                    indents.pop();
                    output.push(layout_token(TokenKind::Dedent, &token));
                }
            }
        }

        opens_block = false;

        match &token.kind {
            TokenKind::Punctuator(punctuator) if punctuator.is_opening_bracket() => {
                depth += 1;
            }

            TokenKind::Punctuator(punctuator) if punctuator.is_closing_bracket() => {
                depth = depth.saturating_sub(1);
            }

            TokenKind::Punctuator(Punctuator::Colon) if depth == 0 => {
                opens_block = true;
            }

            _ => (),
        }

        output.push(token);
    }

    output
}

fn layout_token(kind: TokenKind, at: &Token) -> Token {
    Token {
        kind,
        text: QString::empty(),
        begin: at.begin,
        end: at.begin,
    }
}

fn indentation_of(source: &SourceCode, token: &Token) -> usize {
    let offset = token.begin.offset();
    let line_start = source[..offset].rfind('\n').map_or(0, |idx| idx + 1);

    source[line_start..offset]
        .chars()
        .map_while(|c| match c {
            ' ' => Some(1),
            '\t' => Some(TAB_WIDTH),
            _ => None,
        })
        .sum()
}
