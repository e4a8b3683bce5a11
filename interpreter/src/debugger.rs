// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use log::trace;
use quantum::{FileRange, Statement};

use crate::{RuntimeError, Value};

#[derive(Debug, Clone, Copy)]
pub struct DebuggerFunction<'interpreter> {
    pub ty: DebuggerFunctionType,
    pub name: &'interpreter str,
    pub caller_location: FileRange,
    pub callee_location: Option<FileRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebuggerFunctionType {
    Native,
    Normal,
    Method,
    Constructor,
}

pub trait Debugger {
    fn on_statement(&mut self, statement: &Statement) { _ = statement }

    fn enter_function(&mut self, function: DebuggerFunction<'_>, args: &[Value]) {
        _ = function;
        _ = args;
    }

    fn leave_function(&mut self, function: DebuggerFunction<'_>) {
        _ = function;
    }

    fn on_runtime_error(&mut self, error: &RuntimeError) {
        _ = error;
    }
}

impl Debugger for () {
}

/// Logs every call at trace level.
#[derive(Debug, Default)]
pub struct CallTracer {
    depth: usize,
}

impl Debugger for CallTracer {
    fn enter_function(&mut self, function: DebuggerFunction<'_>, args: &[Value]) {
        trace!(
            "{:indent$}-> {}({}) at line {}",
            "",
            function.name,
            args.iter().map(|arg| format!("{arg:?}")).collect::<Vec<_>>().join(", "),
            function.caller_location.start().line() + 1,
            indent = self.depth * 2,
        );
        self.depth += 1;
    }

    fn leave_function(&mut self, function: DebuggerFunction<'_>) {
        self.depth = self.depth.saturating_sub(1);
        trace!("{:indent$}<- {}", "", function.name, indent = self.depth * 2);
    }

    fn on_runtime_error(&mut self, error: &RuntimeError) {
        trace!("raised {error}");
    }
}
