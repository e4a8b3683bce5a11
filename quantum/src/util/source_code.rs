// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{ops::Deref, path::{Path, PathBuf}, sync::Arc};

use crate::QString;

#[derive(Debug, Clone)]
pub struct SourceCode {
    path: Arc<PathBuf>,
    contents: QString,
}

impl SourceCode {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<QString>) -> Self {
        Self {
            path: Arc::new(path.into()),
            contents: contents.into(),
        }
    }

    /// Source code that did not come from a file, e.g. a REPL line.
    #[must_use]
    pub fn anonymous(contents: impl Into<QString>) -> Self {
        Self::new("<input>", contents)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn contents(&self) -> &QString {
        &self.contents
    }

    /// Zero-based line lookup, used by the error printer.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<&str> {
        self.contents.lines().nth(line)
    }
}

impl Deref for SourceCode {
    type Target = QString;

    fn deref(&self) -> &Self::Target {
        self.contents()
    }
}
