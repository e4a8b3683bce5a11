// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use crate::{RuntimeError, Value};

/// Why a statement stopped before reaching its end. Loops consume `Break`
/// and `Continue`, calls consume `Return`, and `try` consumes `Error`.
#[derive(Debug, Clone)]
pub enum Signal {
    Break,
    Continue,
    Return(Value),
    Error(RuntimeError),
}

impl Signal {
    /// Turns a signal that escaped its construct into an error.
    #[must_use]
    pub fn into_error(self) -> RuntimeError {
        match self {
            Self::Break => RuntimeError::runtime("`break` outside of a loop"),
            Self::Continue => RuntimeError::runtime("`continue` outside of a loop"),
            Self::Return(..) => RuntimeError::runtime("`return` outside of a function"),
            Self::Error(error) => error,
        }
    }
}

impl From<RuntimeError> for Signal {
    fn from(value: RuntimeError) -> Self {
        Self::Error(value)
    }
}

pub type StatementResult = Result<(), Signal>;
