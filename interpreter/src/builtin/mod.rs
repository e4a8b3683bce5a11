// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

mod functions;
mod methods;
mod types;

use std::{collections::HashMap, f64::consts, rc::Rc};

use quantum::QString;

use crate::{Class, NativeFunction, RuntimeError, Scope, Value, ValueMap};

pub use self::{
    functions::{BuiltinFunction, BuiltinFunctionSignature},
    types::BuiltinType,
};

/// The native library. The interpreter core knows none of these; a host
/// installs them into the global scope.
pub struct Builtin;

impl Builtin {
    pub const FUNCTIONS: &'static [BuiltinFunction] = &[
        BuiltinFunction {
            name: "print",
            documentation: "Writes the arguments separated by spaces, followed by a line break.",
            function: &functions::print,
        },
        BuiltinFunction {
            name: "printf",
            documentation: "Writes a `printf`-style formatted string.",
            function: &functions::printf,
        },
        BuiltinFunction {
            name: "len",
            documentation: "Number of characters in a string, elements in an array or entries in a map.",
            function: &functions::len,
        },
        BuiltinFunction {
            name: "range",
            documentation: "`range(stop)`, `range(start, stop)` or `range(start, stop, step)` as an array.",
            function: &functions::range,
        },
        BuiltinFunction {
            name: "str",
            documentation: "The display text of a value.",
            function: &functions::str,
        },
        BuiltinFunction {
            name: "string",
            documentation: "The display text of a value.",
            function: &functions::str,
        },
        BuiltinFunction {
            name: "num",
            documentation: "Converts a string or bool to a number.",
            function: &functions::num,
        },
        BuiltinFunction {
            name: "float",
            documentation: "Converts a string or bool to a number.",
            function: &functions::num,
        },
        BuiltinFunction {
            name: "double",
            documentation: "Converts a string or bool to a number.",
            function: &functions::num,
        },
        BuiltinFunction {
            name: "int",
            documentation: "Converts to a number, truncating towards zero.",
            function: &functions::int,
        },
        BuiltinFunction {
            name: "bool",
            documentation: "The truthiness of a value.",
            function: &functions::bool,
        },
        BuiltinFunction {
            name: "type",
            documentation: "The type name of a value; the class name for instances.",
            function: &functions::type_of,
        },
        BuiltinFunction {
            name: "abs",
            documentation: "Absolute value.",
            function: &functions::abs,
        },
        BuiltinFunction {
            name: "min",
            documentation: "Smallest of the arguments, or of a single array argument.",
            function: &functions::min,
        },
        BuiltinFunction {
            name: "max",
            documentation: "Largest of the arguments, or of a single array argument.",
            function: &functions::max,
        },
        BuiltinFunction {
            name: "round",
            documentation: "Rounds half away from zero, optionally to a number of digits.",
            function: &functions::round,
        },
        BuiltinFunction {
            name: "floor",
            documentation: "Largest integer not above the number.",
            function: &functions::floor,
        },
        BuiltinFunction {
            name: "ceil",
            documentation: "Smallest integer not below the number.",
            function: &functions::ceil,
        },
        BuiltinFunction {
            name: "sqrt",
            documentation: "Square root.",
            function: &functions::sqrt,
        },
        BuiltinFunction {
            name: "pow",
            documentation: "`pow(base, exponent)`.",
            function: &functions::pow,
        },
        BuiltinFunction {
            name: "keys",
            documentation: "Keys of a map, in insertion order.",
            function: &functions::keys,
        },
        BuiltinFunction {
            name: "values",
            documentation: "Values of a map, in insertion order.",
            function: &functions::values,
        },
        BuiltinFunction {
            name: "chr",
            documentation: "The character with the given code point.",
            function: &functions::chr,
        },
        BuiltinFunction {
            name: "ord",
            documentation: "The code point of a one-character string.",
            function: &functions::ord,
        },
        BuiltinFunction {
            name: "sum",
            documentation: "Sum of the numbers in an array.",
            function: &functions::sum,
        },
        BuiltinFunction {
            name: "sorted",
            documentation: "A sorted copy of an array.",
            function: &functions::sorted,
        },
        BuiltinFunction {
            name: "enumerate",
            documentation: "`[index, element]` pairs of an array.",
            function: &functions::enumerate,
        },
        BuiltinFunction {
            name: "format",
            documentation: "A `printf`-style formatted string.",
            function: &functions::format,
        },
        BuiltinFunction {
            name: "sprintf",
            documentation: "A `printf`-style formatted string.",
            function: &functions::format,
        },
        BuiltinFunction {
            name: "isinstance",
            documentation: "Whether a value is an instance of a class, or has a type name like `int` or `list`. A list of types matches any of them.",
            function: &functions::isinstance,
        },
        BuiltinFunction {
            name: "assert",
            documentation: "Fails with the optional message unless the condition is truthy.",
            function: &functions::assert,
        },
        BuiltinFunction {
            name: "hex",
            documentation: "Hexadecimal literal of an integer, like `0xFF`.",
            function: &functions::hex,
        },
        BuiltinFunction {
            name: "bin",
            documentation: "Binary literal of an integer, like `0b101`.",
            function: &functions::bin,
        },
        BuiltinFunction {
            name: "all",
            documentation: "Whether every element of an array is truthy.",
            function: &functions::all,
        },
        BuiltinFunction {
            name: "any",
            documentation: "Whether some element of an array is truthy.",
            function: &functions::any,
        },
        BuiltinFunction {
            name: "sin",
            documentation: "Sine of an angle in radians.",
            function: &functions::sin,
        },
        BuiltinFunction {
            name: "cos",
            documentation: "Cosine of an angle in radians.",
            function: &functions::cos,
        },
        BuiltinFunction {
            name: "tan",
            documentation: "Tangent of an angle in radians.",
            function: &functions::tan,
        },
        BuiltinFunction {
            name: "log",
            documentation: "Natural logarithm, or `log(x, base)`.",
            function: &functions::log,
        },
        BuiltinFunction {
            name: "time",
            documentation: "Seconds since the Unix epoch.",
            function: &functions::time,
        },
        BuiltinFunction {
            name: "rand",
            documentation: "A random number in `[0, 1)`, `[0, high)` or `[low, high)`.",
            function: &functions::rand,
        },
        BuiltinFunction {
            name: "rand_int",
            documentation: "A random integer in `[0, high]` or `[low, high]`.",
            function: &functions::rand_int,
        },
        BuiltinFunction {
            name: "sleep",
            documentation: "Pauses for a number of seconds.",
            function: &functions::sleep,
        },
        BuiltinFunction {
            name: "exit",
            documentation: "Stops the program with a status code, 0 by default.",
            function: &functions::exit,
        },
        BuiltinFunction {
            name: "id",
            documentation: "A number identifying an array, map, function, class or instance.",
            function: &functions::id,
        },
    ];

    pub const TYPES: &'static [BuiltinType] = &[
        BuiltinType {
            name: "array",
            documentation: "A shared, growable list of values.",
            methods: methods::METHODS_ARRAY,
        },
        BuiltinType {
            name: "string",
            documentation: "Immutable text.",
            methods: methods::METHODS_STRING,
        },
        BuiltinType {
            name: "map",
            documentation: "A shared, string-keyed table that remembers insertion order.",
            methods: methods::METHODS_MAP,
        },
    ];

    /// Exception classes available to `raise` and `except`. All of them
    /// inherit from `Exception`.
    pub const EXCEPTIONS: &'static [&'static str] = &[
        "Error",
        "ValueError",
        "TypeError",
        "RuntimeError",
        "IndexError",
        "KeyError",
        "NameError",
        "AttributeError",
        "ZeroDivisionError",
        "NotImplementedError",
        "RangeError",
        "ReferenceError",
    ];

    #[must_use]
    pub fn type_by_name(name: &str) -> Option<&'static BuiltinType> {
        Self::TYPES.iter().find(|ty| ty.name == name)
    }

    /// A built-in method of `receiver`, bound to it.
    #[must_use]
    pub fn method(receiver: &Value, name: &str) -> Option<Value> {
        let method = Self::type_by_name(receiver.type_name())?.method(name)?;

        Some(Value::Native(Rc::new(NativeFunction {
            name: method.name.into(),
            function: Rc::new(method.function),
            receiver: Some(receiver.clone()),
        })))
    }

    /// Defines the native library in `scope`. Fails when `scope` already
    /// holds one of the library's constants.
    pub fn install(scope: &Scope) -> Result<(), RuntimeError> {
        for function in Self::FUNCTIONS {
            scope.define(function.name, function.to_value(), false)?;
        }

        scope.define("PI", Value::Number(consts::PI), true)?;
        scope.define("E", Value::Number(consts::E), true)?;
        scope.define("INF", Value::Number(f64::INFINITY), true)?;
        scope.define("NaN", Value::Number(f64::NAN), true)?;
        scope.define("__name__", Value::string("__main__"), false)?;

        let math = Value::map(Self::math_module());
        scope.define("math", math.clone(), false)?;
        scope.define("Math", math, false)?;

        let console: ValueMap = [
            (QString::from("log"), Self::function("print")),
        ].into_iter().collect();
        scope.define("console", Value::map(console), false)?;

        Self::install_exceptions(scope)
    }

    fn function(name: &str) -> Value {
        Self::FUNCTIONS.iter()
            .find(|function| function.name == name)
            .map(BuiltinFunction::to_value)
            .unwrap_or_default()
    }

    fn math_module() -> ValueMap {
        let mut math: ValueMap = ["abs", "floor", "ceil", "round", "sqrt", "pow", "min", "max", "sin", "cos", "tan", "log"]
            .into_iter()
            .map(|name| (QString::from(name), Self::function(name)))
            .collect();

        math.insert("pi".into(), Value::Number(consts::PI));
        math.insert("PI".into(), Value::Number(consts::PI));
        math.insert("e".into(), Value::Number(consts::E));
        math.insert("E".into(), Value::Number(consts::E));
        math
    }

    fn install_exceptions(scope: &Scope) -> Result<(), RuntimeError> {
        let exception = Rc::new(Class {
            name: QString::new_static("Exception"),
            base: None,
            methods: HashMap::new(),
            static_methods: HashMap::new(),
            static_fields: Default::default(),
            closure: scope.clone(),
            is_exception: true,
        });

        for name in Self::EXCEPTIONS {
            let class = Class {
                name: QString::new_static(*name),
                base: Some(Rc::clone(&exception)),
                methods: HashMap::new(),
                static_methods: HashMap::new(),
                static_fields: Default::default(),
                closure: scope.clone(),
                is_exception: true,
            };
            scope.define(*name, Value::Class(Rc::new(class)), false)?;
        }

        scope.define("Exception", Value::Class(exception), false)
    }
}
