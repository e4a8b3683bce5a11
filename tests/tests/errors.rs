// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use pretty_assertions::assert_eq;
use quantum_interpreter::{ErrorKind, Value};
use rstest::rstest;
use tests::{interpret_and_return_stdout, interpret_error};

#[test]
fn errors_report_the_line_they_happen_on() {
    let input = "fn describe(item) {\n\
                 \x20   let label = \"item: \"\n\
                 \x20   return label + item.name\n\
                 }\n\
                 \n\
                 fn broken(value) {\n\
                 \x20   return value - \"text\"\n\
                 }\n\
                 \n\
                 print(broken(5))\n";

    let error = interpret_error(input);
    assert_eq!(error.kind, ErrorKind::TypeError);
    assert_eq!(error.line(), Some(7));
}

#[rstest]
#[case("print(1 / 0)", ErrorKind::RuntimeError, "division by zero")]
#[case("print(5 % 0)", ErrorKind::RuntimeError, "modulo by zero")]
#[case("print(missing)", ErrorKind::NameError, "`missing` is not defined")]
#[case("x = [1, 2]\nprint(x[5])", ErrorKind::IndexError, "index 5 is out of range for length 2")]
#[case("m = {}\nprint(m[\"k\"])", ErrorKind::IndexError, "key \"k\" not found")]
#[case("print(1 - \"a\")", ErrorKind::TypeError, "unsupported operand types for -: number and string")]
#[case("x = 5\nx()", ErrorKind::TypeError, "number is not callable")]
#[case("for x in 5:\n    pass", ErrorKind::TypeError, "number is not iterable")]
#[case("x += 1", ErrorKind::NameError, "`x` is not defined")]
#[case(
    "x = \"ab\" * 10 ** 18",
    ErrorKind::RuntimeError,
    "repeating a string of length 2 1000000000000000000 times exceeds the limit of 268435456 bytes",
)]
#[case(
    "x = \"ab\".repeat(10 ** 9)",
    ErrorKind::RuntimeError,
    "repeating a string of length 2 1000000000 times exceeds the limit of 268435456 bytes",
)]
#[case(
    "printf(\"%99999999999999999999d\", 1)",
    ErrorKind::RuntimeError,
    "field width or precision in `%99999999999999999999d` exceeds 65536",
)]
#[case("assert(1 == 2, \"numbers differ\")", ErrorKind::RuntimeError, "numbers differ")]
#[case("assert(false)", ErrorKind::RuntimeError, "assertion failed")]
#[case("isinstance(1, 5)", ErrorKind::TypeError, "`isinstance` expects a class or type name, got number")]
#[case("rand(5, 1)", ErrorKind::RuntimeError, "`rand` needs a finite range, got 5 to 1")]
#[case("rand_int(3, 1)", ErrorKind::RuntimeError, "`rand_int` range 3 to 1 is empty")]
#[case("sorted([3, 1, 2], lambda a, b: missing)", ErrorKind::NameError, "`missing` is not defined")]
fn runtime_errors(#[case] input: &str, #[case] kind: ErrorKind, #[case] message: &str) {
    let error = interpret_error(input);
    assert_eq!(error.kind, kind);
    assert_eq!(error.message, message);
}

#[test]
fn python_try_except_finally() {
    let input = r#"
        def safe_divide(a, b):
            try:
                return a / b
            except ZeroDivisionError as e:
                print("caught:", e)
                return 0
            finally:
                print("done")

        print(safe_divide(6, 3))
        print(safe_divide(1, 0))
    "#;

    assert_eq!(
        interpret_and_return_stdout(input),
        ["done", "2", "caught: division by zero", "done", "0"],
    );
}

#[test]
fn javascript_try_catch() {
    let input = r#"
        try {
            throw new Error("boom");
        } catch (e) {
            console.log("caught " + e.message);
        } finally {
            console.log("cleanup");
        }
    "#;

    assert_eq!(interpret_and_return_stdout(input), ["caught boom", "cleanup"]);
}

#[test]
fn handlers_are_chosen_by_type() {
    let input = r#"
        def classify(action):
            try:
                action()
            except IndexError:
                return "index"
            except NameError:
                return "name"
            except ValueError as e:
                return "value: " + str(e)
            except:
                return "other"
            return "none"

        print(classify(lambda: [][1]))
        print(classify(lambda: undefined_name))
        print(classify(lambda: int("abc")))
        print(classify(lambda: 1 / 0))
        print(classify(lambda: 1))
    "#;

    let output = interpret_and_return_stdout(input);
    assert_eq!(output[0], "index");
    assert_eq!(output[1], "name");
    assert!(output[2].starts_with("value: "), "{}", output[2]);
    assert_eq!(&output[3..], &["other", "none"]);
}

#[test]
fn custom_exceptions_are_caught_by_their_base() {
    let input = r#"
        class AppError(Exception):
            pass

        class ConfigError(AppError):
            def __init__(self, key):
                self.message = "missing " + key
                self.key = key

        try:
            raise ConfigError("port")
        except AppError as e:
            print(e.key)
            print(e)
    "#;

    assert_eq!(interpret_and_return_stdout(input), ["port", "missing port"]);
}

#[test]
fn uncaught_exceptions_carry_the_raised_value() {
    let error = interpret_error("class Oops(Exception):\n    pass\n\nraise Oops(\"it broke\")");
    assert_eq!(error.kind, ErrorKind::Exception);
    assert_eq!(error.message, "Oops: it broke");
    assert_eq!(error.line(), Some(4));
    assert!(matches!(error.payload, Some(Value::Instance(..))));
}

#[rstest]
#[case("raise \"plain text\"", "plain text")]
#[case("raise ValueError", "<class ValueError>")]
#[case("raise ValueError()", "ValueError")]
#[case("throw new RangeError(\"too far\")", "RangeError: too far")]
fn raised_messages(#[case] input: &str, #[case] message: &str) {
    let error = interpret_error(input);
    assert_eq!(error.kind, ErrorKind::Exception);
    assert_eq!(error.message, message);
}

#[test]
fn bare_raise_rethrows_the_handled_error() {
    let input = r#"
        try:
            try:
                x = [][0]
            except IndexError:
                print("logging")
                raise
        except IndexError as e:
            print("outer:", e)
    "#;

    assert_eq!(
        interpret_and_return_stdout(input),
        ["logging", "outer: index 0 is out of range for length 0"],
    );
}

#[test]
fn unmatched_handlers_let_the_error_through_after_finally() {
    let input = r#"
        try {
            print("start")
            missing()
        } catch (IndexError e) {
            print("wrong handler")
        } finally {
            print("finally")
        }
    "#;

    let error = interpret_error(input);
    assert_eq!(error.kind, ErrorKind::NameError);
}

#[test]
fn break_and_continue_pass_through_try() {
    let input = r#"
        for i in range(5):
            try:
                if i == 1:
                    continue
                if i == 3:
                    break
                print(i)
            finally:
                print("f" + str(i))
    "#;

    assert_eq!(
        interpret_and_return_stdout(input),
        ["0", "f0", "f1", "2", "f2", "f3"],
    );
}

#[rstest]
#[case("print(\"before\")\nexit(3)\nprint(\"after\")", 3)]
#[case("exit()", 0)]
#[case("try:\n    exit(2)\nexcept:\n    print(\"caught\")", 2)]
#[case("try {\n    exit(4)\n} catch (e) {\n    print(e)\n}", 4)]
fn exit_cannot_be_caught(#[case] input: &str, #[case] code: i32) {
    let error = interpret_error(input);
    assert_eq!(error.kind, ErrorKind::Exit);
    assert_eq!(error.exit_code(), Some(code));
}

#[test]
fn negative_sleep_is_an_error() {
    let error = interpret_error("sleep(-1)");
    assert_eq!(error.kind, ErrorKind::RuntimeError);
    assert!(error.message.starts_with("cannot sleep for -1 seconds"), "{}", error.message);
}
