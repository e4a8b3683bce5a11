// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

#![deny(elided_lifetimes_in_paths)]

mod builtin;
mod debugger;
mod error;
mod expression;
pub mod format;
mod host;
mod interpreter;
mod operators;
mod scope;
mod signal;
mod stack;
mod value;

pub use quantum;

pub use self::{
    builtin::{Builtin, BuiltinFunction, BuiltinFunctionSignature, BuiltinType},
    debugger::{CallTracer, Debugger, DebuggerFunction, DebuggerFunctionType},
    error::{ErrorKind, ErrorPrinter, RuntimeError},
    host::{BufferedHost, ConsoleHost, Host},
    interpreter::{Interpreter, Runtime, DEFAULT_MAX_CALL_DEPTH},
    scope::Scope,
    signal::{Signal, StatementResult},
    stack::run_with_call_stack,
    value::{Class, Function, Instance, MethodBinding, NativeCallback, NativeFunction, Value, ValueMap},
};
