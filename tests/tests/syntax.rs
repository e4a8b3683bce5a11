// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use pretty_assertions::assert_eq;
use quantum_interpreter::{BufferedHost, Value};
use rstest::rstest;
use tests::{interpret_and_return_stdout, interpret_expression, interpret_with_host, interpret_with_input};

#[rstest]
#[case("def add(a, b):\n    return a + b\nprint(add(2, 3))")]
#[case("fn add(a, b) { return a + b }\nprint(add(2, 3))")]
#[case("function add(a, b) { return a + b; }\nconsole.log(add(2, 3));")]
#[case("int add(int a, int b) { return a + b; }\ncout << add(2, 3) << endl;")]
#[case("const add = (a, b) => a + b\nprint(add(2, 3))")]
#[case("add = lambda a, b: a + b\nprint(add(2, 3))")]
fn the_same_program_in_every_syntax(#[case] input: &str) {
    assert_eq!(interpret_and_return_stdout(input), ["5"]);
}

#[rstest]
#[case("1 + 2 * 3", Value::Number(7.0))]
#[case("(1 + 2) * 3", Value::Number(9.0))]
#[case("2 ** 3 ** 2", Value::Number(512.0))]
#[case("1 << 2 + 3", Value::Number(32.0))]
#[case("6 & 3 | 8", Value::Number(10.0))]
#[case("~5", Value::Number(-6.0))]
#[case("1 == 1.0", Value::Bool(true))]
#[case("1 === 1", Value::Bool(true))]
#[case("\"1\" == 1", Value::Bool(false))]
#[case("\"abc\" < \"abd\"", Value::Bool(true))]
#[case("3 != 4", Value::Bool(true))]
#[case("not true", Value::Bool(false))]
#[case("!0", Value::Bool(true))]
#[case("0 or \"fallback\"", Value::string("fallback"))]
#[case("nil || 5", Value::Number(5.0))]
#[case("1 and 2", Value::Number(2.0))]
#[case("\"\" && missing_name", Value::string(""))]
#[case("3 > 2 ? \"yes\" : \"no\"", Value::string("yes"))]
#[case("\"yes\" if 1 > 2 else \"no\"", Value::string("no"))]
#[case("2 in [1, 2, 3]", Value::Bool(true))]
#[case("4 not in [1, 2, 3]", Value::Bool(true))]
#[case("len(\"héllo\")", Value::Number(5.0))]
#[case("type([])", Value::string("array"))]
#[case("int(\"42\") + float(\"0.5\")", Value::Number(42.5))]
#[case("str(7) + \"!\"", Value::string("7!"))]
#[case("round(3.14159, 2)", Value::Number(3.14))]
#[case("abs(-3) + max(1, 9, 4) + min([5, 2])", Value::Number(14.0))]
#[case("range(1, 10, 3)", Value::array(vec![Value::Number(1.0), Value::Number(4.0), Value::Number(7.0)]))]
fn expressions(#[case] input: &str, #[case] expected: Value) {
    assert_eq!(interpret_expression(input), expected);
}

#[rstest]
#[case("a, b = 1, 2\na, b = b, a\nprint(a, b)", &["2 1"])]
#[case("x = 5\nx -= 2\nx *= 4\nx /= 8\nprint(x)", &["1.5"])]
#[case("i = 0\nj = i++\nk = ++i\nprint(i, j, k)", &["2 0 2"])]
#[case("s = \"ab\"\ns += \"cd\"\nprint(s)", &["abcd"])]
#[case("xs = [1, 2, 3]\nxs[0] += 10\nprint(xs)", &["[11, 2, 3]"])]
#[case("m = {\"n\": 1}\nm[\"n\"] += 1\nm.n *= 10\nprint(m.n)", &["20"])]
fn assignments(#[case] input: &str, #[case] expected: &[&str]) {
    assert_eq!(interpret_and_return_stdout(input), expected);
}

#[test]
fn python_input() {
    let input = r#"
        name = input("Name: ")
        n = int(input())
        print("Hello", name)
        print(n * 2)
    "#;

    let output = interpret_with_input(input, &["Ada", "21"]);
    assert_eq!(output, ["Name: Hello Ada", "42"]);
}

#[test]
fn scanf_converts_by_specifier() {
    let input = r#"
        int n;
        float f;
        scanf("%d", &n);
        scanf("%f", &f);
        printf("%d %.1f\n", n + 1, f * 2);
    "#;

    let output = interpret_with_input(input, &["41", "1.25"]);
    assert_eq!(output, ["42 2.5"]);
}

#[test]
fn cin_reads_into_every_target() {
    let input = r#"
        int a;
        int b;
        cin >> a >> b;
        cout << a + b << endl;
    "#;

    let output = interpret_with_input(input, &["3", "4"]);
    assert_eq!(output, ["7"]);
}

#[test]
fn input_at_end_of_input_is_nil() {
    let output = interpret_with_input("line = input()\nprint(line)", &[]);
    assert_eq!(output, ["nil"]);
}

#[test]
fn modules_are_loaded_from_the_host() {
    let host = BufferedHost::new()
        .with_module("geometry", "FACTOR = 3\ndef area(r):\n    return FACTOR * r * r\nprint(\"loading geometry\")\n")
        .with_module("text.case", "fn shout(s) { return s.upper() + \"!\" }");

    let input = r#"
        import geometry
        import geometry as g
        from geometry import area as circle_area
        import text.case
        from text.case import *
        print(geometry.area(2), g.FACTOR, circle_area(1))
        print(case.shout("hi"), shout("ok"))
    "#;

    assert_eq!(
        interpret_with_host(input, host),
        ["loading geometry", "12 3 3", "HI! OK!"],
    );
}

#[test]
fn unknown_modules_are_ignored() {
    let output = interpret_and_return_stdout("import does_not_exist\nprint(\"still running\")");
    assert_eq!(output, ["still running"]);
}

#[test]
fn comments_in_every_style() {
    let input = r#"
        # python comment
        // c++ comment
        /* block
           comment */
        print("ok"); // trailing
    "#;

    assert_eq!(interpret_and_return_stdout(input), ["ok"]);
}

#[test]
fn semicolons_and_newlines_both_end_statements() {
    let input = "a = 1; b = 2\nc = 3;\nprint(a + b + c);";
    assert_eq!(interpret_and_return_stdout(input), ["6"]);
}

#[test]
fn nested_python_blocks() {
    let input = r#"
        def grade(score):
            if score >= 90:
                return "A"
            elif score >= 80:
                if score >= 85:
                    return "B+"
                return "B"
            else:
                return "C"

        for score in [95, 87, 81, 40]:
            print(grade(score))
    "#;

    assert_eq!(interpret_and_return_stdout(input), ["A", "B+", "B", "C"]);
}
