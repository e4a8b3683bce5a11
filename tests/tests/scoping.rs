// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use pretty_assertions::assert_eq;
use quantum_interpreter::{ErrorKind, Value};
use rstest::rstest;
use tests::{interpret_and_return_stdout, interpret_error, interpret_error_at_default_depth, interpret_expression};

#[rstest]
#[case("x = 1; fn f() { x = 2 }; f(); print(x)", "2")]
#[case("x = 1; fn f() { let x = 2 }; f(); print(x)", "1")]
#[case("x = 1; fn f() { var x = 2; x = 3 }; f(); print(x)", "1")]
#[case("x = 1; fn f() { x += 5 }; f(); print(x)", "6")]
#[case("fn f() { y = 7 }; f(); y = 1; print(y)", "1")]
#[case("let x = 1; { let x = 2 }; print(x)", "1")]
#[case("let x = 1; { x = 2 }; print(x)", "2")]
fn assignment_resolves_to_the_nearest_binding(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(interpret_and_return_stdout(input), [expected]);
}

#[test]
fn assignment_inside_a_function_does_not_leak() {
    let error = interpret_error("fn f() { y = 7 }\nf()\nprint(y)");
    assert_eq!(error.kind, ErrorKind::NameError);
    assert_eq!(error.line(), Some(3));
}

#[test]
fn counters_capture_their_own_environment() {
    let input = r#"
        fn make_counter(start) { count = start; return fn() { count += 1; return count } }
        a = make_counter(0)
        b = make_counter(10)
        print(a())
        print(a())
        print(b())
        print(a())
        print(b())
    "#;

    assert_eq!(interpret_and_return_stdout(input), ["1", "2", "11", "3", "12"]);
}

#[test]
fn closures_see_later_changes_to_captured_variables() {
    let input = r#"
        def outer():
            message = "before"
            def show():
                return message
            message = "after"
            return show
        print(outer()())
    "#;

    assert_eq!(interpret_and_return_stdout(input), ["after"]);
}

#[test]
fn loop_variables_are_fresh_per_iteration() {
    let input = r#"
        callbacks = []
        for i in [1, 2, 3]:
            callbacks.push(lambda: i * 10)
        for callback in callbacks:
            print(callback())
    "#;

    assert_eq!(interpret_and_return_stdout(input), ["10", "20", "30"]);
}

#[rstest]
#[case("const M = 5\nM = 6")]
#[case("const M = 5\nM += 1")]
#[case("const int M = 5;\nM++;")]
fn constants_cannot_be_reassigned(#[case] input: &str) {
    let error = interpret_error(input);
    assert_eq!(error.kind, ErrorKind::RuntimeError);
    assert_eq!(error.line(), Some(2));
}

#[rstest]
#[case("const M = 5\nlet M = 6\nM = 7\nprint(M)")]
#[case("const M = 5\nvar M = 6")]
#[case("const M = 5\nconst M = 6")]
#[case("const M = 5\nclass M:\n    pass")]
fn constants_cannot_be_redeclared(#[case] input: &str) {
    let error = interpret_error(input);
    assert_eq!(error.kind, ErrorKind::RuntimeError);
    assert_eq!(error.message, "cannot redeclare constant `M`");
    assert_eq!(error.line(), Some(2));
}

#[rstest]
#[case("const M = 5\nfn f() { let M = 6; M = 7; return M }\nprint(f())\nprint(M)", &["7", "5"])]
#[case("for i in range(3):\n    const X = i * 2\n    print(X)", &["0", "2", "4"])]
fn constants_can_be_shadowed_in_inner_scopes(#[case] input: &str, #[case] expected: &[&str]) {
    assert_eq!(interpret_and_return_stdout(input), expected);
}

#[test]
fn failed_constant_assignment_keeps_the_value() {
    let input = r#"
        const M = 5
        try:
            M = 6
        except:
            print("refused")
        print(M)
    "#;

    assert_eq!(interpret_and_return_stdout(input), ["refused", "5"]);
}

#[test]
fn functions_are_hoisted() {
    let input = r#"
        print(double(21))
        fn double(n) { return n * 2 }
    "#;

    assert_eq!(interpret_and_return_stdout(input), ["42"]);
}

#[rstest]
#[case("fn greet(name = \"you\") { return \"hi \" + name }\ngreet()", Value::string("hi you"))]
#[case("fn greet(name = \"you\") { return \"hi \" + name }\ngreet(\"me\")", Value::string("hi me"))]
#[case("fn f(a, b) { return b }\nf(1)", Value::Nil)]
#[case("fn f(a) { return a }\nf(1, 2, 3)", Value::Number(1.0))]
#[case("add = (a, b) => a + b\nadd(2, 3)", Value::Number(5.0))]
#[case("double = x => x * 2\ndouble(4)", Value::Number(8.0))]
#[case("square = lambda n: n * n\nsquare(5)", Value::Number(25.0))]
#[case("f = fn (a) { return a - 1 }\nf(10)", Value::Number(9.0))]
#[case("x = 3\nx", Value::Number(3.0))]
#[case("x = 3", Value::Nil)]
fn function_calls(#[case] input: &str, #[case] expected: Value) {
    assert_eq!(interpret_expression(input), expected);
}

#[test]
fn recursion_is_bounded() {
    let error = interpret_error("fn forever(n) { return forever(n + 1) }\nforever(0)");
    assert_eq!(error.kind, ErrorKind::RuntimeError);
    assert!(error.message.contains("maximum call depth"), "{}", error.message);
}

#[rstest]
#[case(r#"
class Walker:
    def down(self, n):
        if n >= 0:
            for step in [1]:
                try:
                    return self.down(n + step)
                except ValueError:
                    pass
        return n
Walker().down(0)
"#)]
#[case(r#"
class Walker {
    down(n) {
        if (n >= 0) {
            for (let i = 0; i < 1; i++) {
                try {
                    return this.down(n + 1)
                } finally {
                    n = n
                }
            }
        }
        return n
    }
}
const walker = new Walker()
walker.down(0)
"#)]
#[case("fn forever(n) { return forever(n + 1) }\nforever(0)")]
fn deep_recursion_stops_at_the_default_depth(#[case] input: &str) {
    let (kind, message) = interpret_error_at_default_depth(input);
    assert_eq!(kind, ErrorKind::RuntimeError);
    assert!(message.contains("maximum call depth of 1000"), "{message}");
}

#[test]
fn top_level_return_stops_the_program() {
    let input = r#"
        print("first")
        return
        print("never")
    "#;

    assert_eq!(interpret_and_return_stdout(input), ["first"]);
}
