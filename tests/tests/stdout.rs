// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use pretty_assertions::assert_eq;
use rstest::rstest;
use tests::interpret_and_return_stdout;

#[rstest]
#[case(
    r#"
        print("Hello!")
    "#,
    &[
        "Hello!",
    ],
)]
#[case(
    r#"
        print(42)
        print(3.5)
        print(10 / 4)
        print(7 // 2)
        print(2 ** 10)
        print(-7 % 3)
    "#,
    &[
        "42",
        "3.5",
        "2.5",
        "3",
        "1024",
        "-1",
    ],
)]
#[case(
    r#"
        let x = 10
        let y = 20
        print(x + y)
    "#,
    &[
        "30",
    ],
)]
#[case(
    "fn fib(n) { if n <= 1 { return n } return fib(n-1)+fib(n-2) } print(fib(10))",
    &[
        "55",
    ],
)]
#[case(
    r#"
        print("a" + 1)
        print("ab" * 3)
        print([1, 2] + [3])
        print(["a", "b"])
        print({"one": 1, "two": [2]})
        print(nil, true, false)
    "#,
    &[
        "a1",
        "ababab",
        "[1, 2, 3]",
        "[\"a\", \"b\"]",
        "{\"one\": 1, \"two\": [2]}",
        "nil true false",
    ],
)]
#[case(
    r#"
        name = "world"
        count = 3
        print(f"hello {name}, {count + 1} times")
        print(`hello ${name}`)
        print("%s has %d letters" % [name, len(name)])
    "#,
    &[
        "hello world, 4 times",
        "hello world",
        "world has 5 letters",
    ],
)]
#[case(
    r#"
        print("a", "b", sep="-")
        print("no newline", end="")
        print("!")
    "#,
    &[
        "a-b",
        "no newline!",
    ],
)]
#[case(
    r#"
        printf("%d items\n", 3)
        printf("%.2f|%5d|\n", 3.14159, 42)
        printf("%s and %s\n", "this", "that")
    "#,
    &[
        "3 items",
        "3.14|   42|",
        "this and that",
    ],
)]
#[case(
    r#"
        int main() {
            string name = "cpp";
            cout << "Hello " << name << endl;
            cout << 1 + 2 << endl;
            return 0;
        }
        main();
    "#,
    &[
        "Hello cpp",
        "3",
    ],
)]
#[case(
    r#"
        console.log("from", "javascript")
    "#,
    &[
        "from javascript",
    ],
)]
fn interpret_and_return_stdout_tests(#[case] input: &str, #[case] expected: &[&str]) {
    let expected: Vec<String> = expected.iter().map(|x| x.to_string()).collect();
    assert_eq!(interpret_and_return_stdout(input), expected);
}

#[rstest]
#[case(
    r#"
        total = 0
        for i in range(5):
            total += i
        print(total)
    "#,
    &["10"],
)]
#[case(
    r#"
        for (let i = 0; i < 3; i++) {
            print(i)
        }
    "#,
    &["0", "1", "2"],
)]
#[case(
    r#"
        let i = 0
        while (i < 10) {
            i += 1
            if (i % 2 == 0) { continue }
            if (i > 6) { break }
            print(i)
        }
    "#,
    &["1", "3", "5"],
)]
#[case(
    r#"
        for (const fruit of ["apple", "pear"]) {
            console.log(fruit)
        }
    "#,
    &["apple", "pear"],
)]
#[case(
    r#"
        ages = {"ann": 31, "bob": 27}
        for (name, age) in ages:
            print(name, age)
        for key in ages:
            print(key)
    "#,
    &["ann 31", "bob 27", "ann", "bob"],
)]
#[case(
    r#"
        for c in "abc":
            print(c)
    "#,
    &["a", "b", "c"],
)]
#[case(
    r#"
        n = 15
        if n % 15 == 0:
            print("FizzBuzz")
        elif n % 3 == 0:
            print("Fizz")
        else:
            print(n)
    "#,
    &["FizzBuzz"],
)]
#[case(
    r#"
        let n = 4
        if (n > 5) {
            print("big")
        } else if (n > 3) {
            print("medium")
        } else {
            print("small")
        }
    "#,
    &["medium"],
)]
fn control_flow(#[case] input: &str, #[case] expected: &[&str]) {
    let expected: Vec<String> = expected.iter().map(|x| x.to_string()).collect();
    assert_eq!(interpret_and_return_stdout(input), expected);
}

#[rstest]
#[case(
    r#"
        xs = [3, 1, 2]
        xs.push(5)
        xs.sort()
        print(xs, len(xs))
        print(xs.pop(), xs)
        print(xs.indexOf(2), xs.includes(9))
        print(xs.join("-"))
    "#,
    &["[1, 2, 3, 5] 4", "5 [1, 2, 3]", "1 false", "1-2-3"],
)]
#[case(
    r#"
        xs = [0, 1, 2, 3, 4]
        print(xs[:])
        print(xs[::])
        print(xs[:-2])
        print(xs[1:3])
        print(xs[::-1])
        print(xs[-1])
    "#,
    &["[0, 1, 2, 3, 4]", "[0, 1, 2, 3, 4]", "[0, 1, 2]", "[1, 2]", "[4, 3, 2, 1, 0]", "4"],
)]
#[case(
    r#"
        s = "Hello, World"
        print(s.upper(), s.lower())
        print(s[0:5], s[-5:])
        print(s.split(", "))
        print(s.replace("World", "there"))
        print(len(s), "World" in s)
    "#,
    &[
        "HELLO, WORLD hello, world",
        "Hello World",
        "[\"Hello\", \"World\"]",
        "Hello, there",
        "12 true",
    ],
)]
#[case(
    r#"
        m = {name: "quantum"}
        m["version"] = 1
        m.stage = "beta"
        print(m)
        print(m.get("missing", "default"), "name" in m)
        print(m.keys())
    "#,
    &[
        "{\"name\": \"quantum\", \"version\": 1, \"stage\": \"beta\"}",
        "default true",
        "[\"name\", \"version\", \"stage\"]",
    ],
)]
#[case(
    r#"
        a = [1, 2]
        b = a
        b.push(3)
        print(a)
        print([1, 2] == [1, 2], {"k": 1} == {"k": 1})
    "#,
    &["[1, 2, 3]", "true true"],
)]
#[case(
    r#"
        squares = [x * x for x in range(6) if x % 2 == 0]
        print(squares)
        print(sum(squares), min(squares), max(squares))
        descending = lambda a, b: b - a
        print(sorted([3, 1, 2], descending))
    "#,
    &["[0, 4, 16]", "20 0 16", "[3, 2, 1]"],
)]
#[case(
    r#"
        a = [1]
        a.push(a)
        print(len(a))
        print(a)
        m = {"k": 1}
        m["self"] = m
        print(m)
        b = [1]
        b.push(b)
        print(a == b, a == [1])
    "#,
    &["2", "[1, [...]]", r#"{"k": 1, "self": {...}}"#, "true false"],
)]
fn collections(#[case] input: &str, #[case] expected: &[&str]) {
    let expected: Vec<String> = expected.iter().map(|x| x.to_string()).collect();
    assert_eq!(interpret_and_return_stdout(input), expected);
}

#[test]
fn math_module_is_available() {
    let output = interpret_and_return_stdout("import math\nprint(math.sqrt(16), math.floor(2.7))");
    assert_eq!(output, ["4", "2"]);
}

#[rstest]
#[case("print(hex(255), hex(-255), bin(5), bin(0))", "0xFF -0xFF 0b101 0b0")]
#[case(r#"print(format("%d apples and %s", 3, "pears"))"#, "3 apples and pears")]
#[case(r#"print(sprintf("%.2f|%-3d|", 2.5, 7))"#, "2.50|7  |")]
#[case(r#"print(all([1, true, "x"]), all([]), any([0, nil, ""]), any([0, 2]))"#, "true true false true")]
#[case(r#"print(isinstance(1, "int"), isinstance("a", str), isinstance([], "list"), isinstance(nil, ["int", "nil"]))"#, "true true true true")]
#[case(r#"print(isinstance({}, "dict"), isinstance(1, "str"), isinstance(len, "callable"))"#, "true false true")]
#[case("class A:\n    pass\nclass B(A):\n    pass\nprint(isinstance(B(), A), isinstance(A(), B), isinstance(B(), \"A\"))", "true false true")]
#[case("print(sin(0), cos(0), tan(0), log(1), log(8, 2), math.cos(0))", "0 1 0 0 3 1")]
#[case("print(time() > 1600000000)", "true")]
#[case("r = rand()\nprint(r >= 0 and r < 1)", "true")]
#[case("r = rand(2, 5)\nprint(r >= 2 and r < 5, rand(3, 3), rand_int(4, 4))", "true 3 4")]
#[case("a = []\nb = a\nprint(id(a) == id(b), id(a) == id([]), id(1))", "true false 0")]
#[case(r#"sleep(0)
print("awake")"#, "awake")]
#[case(r#"assert(1 < 2, "unreachable")
print("checked")"#, "checked")]
fn natives(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(interpret_and_return_stdout(input), [expected]);
}
