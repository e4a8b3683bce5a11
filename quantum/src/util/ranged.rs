// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::ops::Deref;

use super::{FileLocation, FileRange};

/// A name or syntax node together with the source span it was parsed from,
/// so errors found while running it can point back at the script.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranged<T> {
    range: FileRange,
    value: T,
}

impl<T> Ranged<T> {
    #[must_use]
    pub const fn new(range: FileRange, value: T) -> Self {
        Self {
            range,
            value,
        }
    }

    #[must_use]
    pub const fn between(start: FileLocation, end: FileLocation, value: T) -> Self {
        Self::new(FileRange::new(start, end), value)
    }

    /// Zero-width, for nodes the parser synthesizes, like the `true` of an
    /// empty `for (;;)` condition.
    #[must_use]
    pub const fn at(location: FileLocation, value: T) -> Self {
        Self::between(location, location, value)
    }

    #[must_use]
    pub const fn range(&self) -> FileRange {
        self.range
    }

    #[must_use]
    pub const fn value(&self) -> &T {
        &self.value
    }

    #[must_use]
    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T> Deref for Ranged<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}
