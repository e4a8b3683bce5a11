// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::path::{Path, PathBuf};

use crate::{Statement, StatementKind};

/// The parsed form of one source unit: a file, module or REPL entry.
#[derive(Debug, Default, Clone)]
pub struct ParseTree {
    path: PathBuf,
    statements: Vec<Statement>,
}

impl ParseTree {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            statements: Vec::new(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn functions(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter().filter(|statement| matches!(statement.kind, StatementKind::Function(..)))
    }

    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }
}
