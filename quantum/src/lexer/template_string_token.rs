// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt::{Display, Formatter};

use crate::{FileLocation, QString};

use super::Token;

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateStringToken {
    Plain {
        begin: FileLocation,
        end: FileLocation,
        str: QString,
    },
    Expression(Vec<Token>),
}

impl Display for TemplateStringToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateStringToken::Expression(expr) => {
                f.write_str("${")?;
                for (idx, token) in expr.iter().enumerate() {
                    if idx != 0 {
                        f.write_str(" ")?;
                    }
                    token.kind.fmt(f)?;
                }
                f.write_str("}")
            }

            TemplateStringToken::Plain { str, .. } => str.fmt(f),
        }
    }
}
