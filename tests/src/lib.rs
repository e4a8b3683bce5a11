// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use quantum::{parse_source, ParseTree, SourceCode};
use quantum_interpreter::{
    run_with_call_stack,
    BufferedHost,
    Builtin,
    ErrorKind,
    Interpreter,
    RuntimeError,
    Value,
    DEFAULT_MAX_CALL_DEPTH,
};

fn initialize_logger() {
    _ = env_logger::builder().is_test(true).try_init();
}

fn parse(input: &str) -> ParseTree {
    initialize_logger();

    let source_code = SourceCode::anonymous(input.to_string());
    match parse_source(&source_code) {
        Ok(tree) => tree,
        Err(e) => panic!("failed to parse {input:?}: {e}"),
    }
}

fn interpreter(host: BufferedHost) -> Interpreter<BufferedHost> {
    let interpreter = Interpreter::new(host, ()).with_max_call_depth(64);
    if let Err(e) = Builtin::install(interpreter.globals()) {
        panic!("failed to install the natives: {e:?}");
    }
    interpreter
}

fn run(input: &str, host: BufferedHost) -> (Result<Value, RuntimeError>, BufferedHost) {
    let tree = parse(input);
    let mut interpreter = interpreter(host);
    let result = interpreter.execute_tree(&tree);
    (result, interpreter.into_host())
}

/// The lines the program printed. Fails the test when the program does.
pub fn interpret_and_return_stdout(input: &str) -> Vec<String> {
    interpret_with_host(input, BufferedHost::new())
}

/// Like [`interpret_and_return_stdout`], with `input` lines served to
/// `input()`, `scanf` and `cin`.
pub fn interpret_with_input(input: &str, lines: &[&str]) -> Vec<String> {
    interpret_with_host(input, BufferedHost::new().with_input(lines.iter().copied()))
}

pub fn interpret_with_host(input: &str, host: BufferedHost) -> Vec<String> {
    let (result, host) = run(input, host);
    if let Err(e) = result {
        panic!("program failed with {e:?}, output so far: {:#?}", host.lines());
    }
    host.lines()
}

/// The error the program stops with.
pub fn interpret_error(input: &str) -> RuntimeError {
    let (result, host) = run(input, BufferedHost::new());
    match result {
        Ok(value) => panic!("expected an error, got {value:?} with output {:#?}", host.lines()),
        Err(e) => e,
    }
}

/// The value of the last expression statement.
pub fn interpret_expression(input: &str) -> Value {
    let (result, _) = run(input, BufferedHost::new());
    match result {
        Ok(value) => value,
        Err(e) => panic!("failed to evaluate {input:?}: {e:?}"),
    }
}

/// Runs the program with the default call depth on a stack sized for it,
/// the way the `quantum` binary does. Yields the kind and message of the
/// error it stops with.
pub fn interpret_error_at_default_depth(input: &str) -> (ErrorKind, String) {
    let result = run_with_call_stack(DEFAULT_MAX_CALL_DEPTH, || {
        let tree = parse(input);
        let mut interpreter = Interpreter::new(BufferedHost::new(), ());
        Builtin::install(interpreter.globals())
            .and_then(|()| interpreter.execute_tree(&tree))
            .map(|value| format!("{value:?}"))
            .map_err(|e| (e.kind, e.message))
    });

    match result {
        Ok(Ok(value)) => panic!("expected an error, got {value}"),
        Ok(Err(error)) => error,
        Err(e) => panic!("failed to start the interpreter thread: {e}"),
    }
}
