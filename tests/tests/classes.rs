// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use pretty_assertions::assert_eq;
use quantum_interpreter::ErrorKind;
use rstest::rstest;
use tests::{interpret_and_return_stdout, interpret_error};

#[test]
fn python_class_with_fields_and_methods() {
    let input = r#"
        class Point:
            def __init__(self, x, y):
                self.x = x
                self.y = y

            def length_squared(self):
                return self.x * self.x + self.y * self.y

            def __str__(self):
                return f"({self.x}, {self.y})"

        p = Point(3, 4)
        print(p.length_squared())
        print(p)
        p.x = 0
        print(p.x, p.length_squared())
    "#;

    assert_eq!(interpret_and_return_stdout(input), ["25", "(3, 4)", "0 16"]);
}

#[test]
fn javascript_class_with_constructor_and_new() {
    let input = r#"
        class Counter {
            constructor(start) {
                this.value = start;
            }

            increment() {
                this.value++;
                return this;
            }

            toString() {
                return `Counter(${this.value})`;
            }
        }

        const counter = new Counter(5);
        counter.increment().increment();
        console.log(counter.value);
        console.log(counter);
    "#;

    assert_eq!(interpret_and_return_stdout(input), ["7", "Counter(7)"]);
}

#[test]
fn cpp_class_with_typed_methods() {
    let input = r#"
        class Greeter {
        public:
            void greet(string name) {
                cout << "Hi " << name << endl;
            }
        };

        int main() {
            Greeter g = Greeter();
            g.greet("bob");
            return 0;
        }
        main();
    "#;

    assert_eq!(interpret_and_return_stdout(input), ["Hi bob"]);
}

#[test]
fn inherited_methods_see_fields_of_the_subclass_init() {
    let input = r#"
        class Animal:
            def __init__(self, name):
                self.name = name

            def describe(self):
                return self.name + " says " + self.sound()

            def sound(self):
                return "..."

        class Dog(Animal):
            def __init__(self, name):
                super().__init__(name)
                self.tricks = 0

            def sound(self):
                return "woof"

        class Puppy(Dog):
            def sound(self):
                return "yip"

        print(Dog("rex").describe())
        print(Puppy("bit").describe())
        print(Puppy("bit").tricks)
        print(Animal("thing").describe())
    "#;

    assert_eq!(
        interpret_and_return_stdout(input),
        ["rex says woof", "bit says yip", "0", "thing says ..."],
    );
}

#[test]
fn super_calls_walk_a_multi_level_chain() {
    let input = r#"
        class Base {
            constructor(name) { this.name = name }
            hello() { return "base " + this.name }
        }

        class Middle extends Base {
            constructor(name) { super(name); this.level = 1 }
            hello() { return "middle > " + super.hello() }
        }

        class Leaf extends Middle {
            hello() { return "leaf > " + super.hello() }
        }

        const leaf = new Leaf("x")
        print(leaf.hello())
        print(leaf.level)
    "#;

    assert_eq!(interpret_and_return_stdout(input), ["leaf > middle > base x", "1"]);
}

#[test]
fn static_members_live_on_the_class() {
    let input = r#"
        class Config:
            version = 3

            @staticmethod
            def describe():
                return "version " + str(Config.version)

        print(Config.version)
        print(Config.describe())
        Config.version = 4
        print(Config().version)
    "#;

    assert_eq!(interpret_and_return_stdout(input), ["3", "version 3", "4"]);
}

#[test]
fn fields_shadow_methods_of_the_same_name() {
    let input = r#"
        class Box:
            def size(self):
                return "method"

        b = Box()
        print(b.size())
        b.size = "field"
        print(b.size)
    "#;

    assert_eq!(interpret_and_return_stdout(input), ["method", "field"]);
}

#[test]
fn bound_methods_keep_their_receiver() {
    let input = r#"
        class Greeter:
            def __init__(self, greeting):
                self.greeting = greeting

            def greet(self, name):
                return self.greeting + ", " + name

        hello = Greeter("hello").greet
        print(hello("you"))
        print(["a", "b"].map(Greeter("hey").greet))
    "#;

    assert_eq!(interpret_and_return_stdout(input), ["hello, you", "[\"hey, a\", \"hey, b\"]"]);
}

#[rstest]
#[case("class A:\n    pass\nA().missing", ErrorKind::NameError)]
#[case("class A:\n    pass\nclass B(A):\n    def f(self):\n        return super.nope()\nB().f()", ErrorKind::NameError)]
#[case("x = 5\nclass A(x):\n    pass", ErrorKind::TypeError)]
#[case("class A:\n    pass\nA.missing", ErrorKind::NameError)]
fn member_errors(#[case] input: &str, #[case] expected: ErrorKind) {
    assert_eq!(interpret_error(input).kind, expected);
}

#[test]
fn instances_compare_by_identity() {
    let input = r#"
        class A:
            pass
        a = A()
        b = a
        print(a == b, a == A())
    "#;

    assert_eq!(interpret_and_return_stdout(input), ["true false"]);
}
