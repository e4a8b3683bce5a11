// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{io, panic, thread};

const BASE_STACK_SIZE: usize = 16 * 1024 * 1024;

/// Native stack used by one script call, including the statements and
/// expressions nested inside its body.
const STACK_SIZE_PER_CALL: usize = 1024 * 1024;

#[must_use]
pub fn stack_size_for(max_call_depth: usize) -> usize {
    STACK_SIZE_PER_CALL
        .saturating_mul(max_call_depth)
        .saturating_add(BASE_STACK_SIZE)
}

/// Runs `f` on a thread with room for `max_call_depth` nested script calls,
/// so deep recursion ends in a "maximum call depth" error instead of a
/// native stack overflow. The interpreter itself is not `Send`; create it
/// inside `f`.
pub fn run_with_call_stack<T, F>(max_call_depth: usize, f: F) -> io::Result<T>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    thread::scope(|scope| {
        let handle = thread::Builder::new()
            .name("interpreter".into())
            .stack_size(stack_size_for(max_call_depth))
            .spawn_scoped(scope, f)?;

        match handle.join() {
            Ok(value) => Ok(value),
            Err(payload) => panic::resume_unwind(payload),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0, BASE_STACK_SIZE)]
    #[case(1000, BASE_STACK_SIZE + 1000 * STACK_SIZE_PER_CALL)]
    #[case(usize::MAX, usize::MAX)]
    fn stack_grows_with_the_call_depth(#[case] max_call_depth: usize, #[case] expected: usize) {
        assert_eq!(stack_size_for(max_call_depth), expected);
    }

    #[test]
    fn result_is_returned_from_the_thread() {
        let name = run_with_call_stack(10, || thread::current().name().map(str::to_string)).unwrap();
        assert_eq!(name.as_deref(), Some("interpreter"));
    }
}
