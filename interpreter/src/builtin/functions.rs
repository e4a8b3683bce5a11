// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{
    cmp::Ordering,
    fmt::{Debug, Display},
    rc::Rc,
    thread,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use rand::Rng;

use crate::{
    format::format_printf,
    Class,
    NativeFunction,
    Runtime,
    RuntimeError,
    Value,
};

pub type BuiltinFunctionSignature = &'static (dyn Fn(&mut dyn Runtime, Vec<Value>, Option<Value>) -> Result<Value, RuntimeError> + Send + Sync);

#[derive(Clone, Copy)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub documentation: &'static str,
    pub function: BuiltinFunctionSignature,
}

impl BuiltinFunction {
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Native(Rc::new(NativeFunction {
            name: self.name.into(),
            function: Rc::new(self.function),
            receiver: None,
        }))
    }
}

impl Display for BuiltinFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}()", self.name))
    }
}

impl Debug for BuiltinFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinFunction")
            .field("name", &self.name)
            .field("documentation", &self.documentation)
            .field("function", &"(native)")
            .finish()
    }
}

pub(super) fn argument<'args>(args: &'args [Value], index: usize, function: &str) -> Result<&'args Value, RuntimeError> {
    args.get(index).ok_or_else(|| {
        RuntimeError::type_error(format!("`{function}` expects at least {} argument(s), got {}", index + 1, args.len()))
    })
}

pub(super) fn number_argument(args: &[Value], index: usize, function: &str) -> Result<f64, RuntimeError> {
    argument(args, index, function)?.as_number()
}

pub fn print(runtime: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    let mut line = String::new();
    for (arg_idx, arg) in args.iter().enumerate() {
        if arg_idx != 0 {
            line.push(' ');
        }
        line += &runtime.display(arg)?;
    }

    line.push('\n');
    runtime.emit(&line);
    Ok(Value::Nil)
}

pub fn printf(runtime: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    let format = argument(&args, 0, "printf")?.as_string()?.clone();
    let text = format_printf(&format, &args[1..], &mut |value| runtime.display(value))?;
    runtime.emit(&text);
    Ok(Value::Nil)
}

pub fn len(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    let length = match argument(&args, 0, "len")? {
        Value::String(str) => str.chars().count(),
        Value::Array(array) => array.borrow().len(),
        Value::Map(map) => map.borrow().len(),
        other => return Err(RuntimeError::type_error(format!("{} has no length", other.type_name()))),
    };

    Ok(length.into())
}

pub fn range(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    let (start, stop, step) = match args.len() {
        0 => return Err(RuntimeError::type_error("`range` expects at least 1 argument(s), got 0")),
        1 => (0.0, args[0].as_number()?, 1.0),
        2 => (args[0].as_number()?, args[1].as_number()?, 1.0),
        _ => (args[0].as_number()?, args[1].as_number()?, args[2].as_number()?),
    };

    if step == 0.0 {
        return Err(RuntimeError::runtime("`range` step must not be zero"));
    }

    let mut values = Vec::new();
    let mut current = start;
    while (step > 0.0 && current < stop) || (step < 0.0 && current > stop) {
        values.push(Value::Number(current));
        current += step;
    }

    Ok(Value::array(values))
}

pub fn str(runtime: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    match args.first() {
        Some(value) => Ok(runtime.display(value)?.into()),
        None => Ok(Value::string("")),
    }
}

fn parse_number(text: &str) -> Result<f64, RuntimeError> {
    let trimmed = text.trim();
    let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16).ok().map(|n| n as f64),
        None => trimmed.parse().ok(),
    };

    parsed.ok_or_else(|| RuntimeError::type_error(format!("cannot convert \"{text}\" to a number")))
}

pub fn num(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    match args.first() {
        None => Ok(Value::Number(0.0)),
        Some(Value::String(str)) => parse_number(str).map(Value::Number),
        Some(value) => value.as_number().map(Value::Number),
    }
}

pub fn int(runtime: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let number = num(runtime, args, this)?.as_number()?;
    Ok(Value::Number(number.trunc()))
}

pub fn bool(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(args.first().is_some_and(Value::is_truthy)))
}

pub fn type_of(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::string(argument(&args, 0, "type")?.type_name()))
}

pub fn abs(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    Ok(number_argument(&args, 0, "abs")?.abs().into())
}

pub fn floor(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    Ok(number_argument(&args, 0, "floor")?.floor().into())
}

pub fn ceil(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    Ok(number_argument(&args, 0, "ceil")?.ceil().into())
}

pub fn sqrt(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    Ok(number_argument(&args, 0, "sqrt")?.sqrt().into())
}

pub fn pow(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    let base = number_argument(&args, 0, "pow")?;
    let exponent = number_argument(&args, 1, "pow")?;
    Ok(base.powf(exponent).into())
}

pub fn round(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    let number = number_argument(&args, 0, "round")?;
    let digits = match args.get(1) {
        Some(digits) => digits.as_integer()?,
        None => 0,
    };

    let factor = 10f64.powi(digits.clamp(-300, 300) as i32);
    Ok(((number * factor).round() / factor).into())
}

/// The values to pick from: the arguments, or the elements of a lone array.
fn candidates(args: Vec<Value>, function: &str) -> Result<Vec<Value>, RuntimeError> {
    let lone_array = match args.as_slice() {
        [Value::Array(array)] => Some(array.borrow().clone()),
        _ => None,
    };
    let values = lone_array.unwrap_or(args);

    if values.is_empty() {
        return Err(RuntimeError::runtime(format!("`{function}` of an empty sequence")));
    }

    Ok(values)
}

fn extreme(args: Vec<Value>, function: &str, wanted: Ordering) -> Result<Value, RuntimeError> {
    let mut values = candidates(args, function)?.into_iter();
    let mut best = values.next().unwrap_or_default();

    for value in values {
        if value.compare(&best)? == wanted {
            best = value;
        }
    }

    Ok(best)
}

pub fn min(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    extreme(args, "min", Ordering::Less)
}

pub fn max(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    extreme(args, "max", Ordering::Greater)
}

pub fn keys(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    let map = argument(&args, 0, "keys")?.as_map()?.borrow();
    Ok(Value::array(map.keys().cloned().map(Value::String).collect()))
}

pub fn values(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    let map = argument(&args, 0, "values")?.as_map()?.borrow();
    Ok(Value::array(map.values().cloned().collect()))
}

pub fn chr(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    let code = argument(&args, 0, "chr")?.as_integer()?;
    u32::try_from(code).ok()
        .and_then(char::from_u32)
        .map(|c| Value::string(c.to_string()))
        .ok_or_else(|| RuntimeError::type_error(format!("{code} is not a valid code point")))
}

pub fn ord(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    let str = argument(&args, 0, "ord")?.as_string()?;
    let mut chars = str.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Value::Number(c as u32 as f64)),
        _ => Err(RuntimeError::type_error(format!("`ord` expects a single character, got \"{str}\""))),
    }
}

pub fn sum(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    let array = argument(&args, 0, "sum")?.as_array()?.borrow();
    let mut total = 0.0;
    for value in array.iter() {
        total += value.as_number()?;
    }
    Ok(total.into())
}

pub fn sorted(runtime: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    let values = argument(&args, 0, "sorted")?.as_array()?.borrow().clone();
    let sorted = super::methods::sort_values(runtime, values, args.get(1))?;
    Ok(Value::array(sorted))
}

pub fn enumerate(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    let array = argument(&args, 0, "enumerate")?.as_array()?.borrow();
    let pairs = array.iter()
        .enumerate()
        .map(|(idx, value)| Value::array(vec![idx.into(), value.clone()]))
        .collect();
    Ok(Value::array(pairs))
}

pub fn format(runtime: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    let format = argument(&args, 0, "format")?.as_string()?.clone();
    format_printf(&format, &args[1..], &mut |value| runtime.display(value)).map(Value::from)
}

fn inherits_from(class: &Rc<Class>, ancestor: &Rc<Class>) -> bool {
    let mut current = Some(class);
    while let Some(class) = current {
        if Rc::ptr_eq(class, ancestor) {
            return true;
        }
        current = class.base.as_ref();
    }
    false
}

/// Type names from the supported languages, mapped onto the value kinds.
fn has_type_name(value: &Value, name: &str) -> bool {
    match name {
        "int" | "float" | "double" | "number" => matches!(value, Value::Number(..)),
        "str" | "string" => matches!(value, Value::String(..)),
        "bool" | "boolean" => matches!(value, Value::Bool(..)),
        "list" | "array" | "tuple" => matches!(value, Value::Array(..)),
        "dict" | "map" | "object" => matches!(value, Value::Map(..)),
        "NoneType" | "nil" | "null" => value.is_nil(),
        "function" | "callable" => matches!(value, Value::Function(..) | Value::Native(..) | Value::Class(..)),
        _ => matches!(value, Value::Instance(instance) if instance.class.is_a(name)),
    }
}

fn is_instance(value: &Value, ty: &Value) -> Result<bool, RuntimeError> {
    match ty {
        Value::Class(class) => Ok(matches!(value, Value::Instance(instance) if inherits_from(&instance.class, class))),
        Value::String(name) => Ok(has_type_name(value, name)),
        Value::Native(native) => Ok(has_type_name(value, &native.name)),
        Value::Array(types) => {
            for ty in types.borrow().iter() {
                if is_instance(value, ty)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        other => Err(RuntimeError::type_error(format!("`isinstance` expects a class or type name, got {}", other.type_name()))),
    }
}

pub fn isinstance(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    let value = argument(&args, 0, "isinstance")?;
    let ty = argument(&args, 1, "isinstance")?;
    is_instance(value, ty).map(Value::Bool)
}

pub fn assert(runtime: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    if argument(&args, 0, "assert")?.is_truthy() {
        return Ok(Value::Nil);
    }

    let message = match args.get(1) {
        Some(message) => runtime.display(message)?,
        None => "assertion failed".to_string(),
    };
    Err(RuntimeError::runtime(message))
}

fn radix_literal(args: &[Value], function: &str, prefix: &str, digits: fn(u64) -> String) -> Result<Value, RuntimeError> {
    let number = argument(args, 0, function)?.as_integer()?;
    let sign = if number < 0 { "-" } else { "" };
    Ok(Value::string(format!("{sign}{prefix}{}", digits(number.unsigned_abs()))))
}

pub fn hex(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    radix_literal(&args, "hex", "0x", |n| format!("{n:X}"))
}

pub fn bin(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    radix_literal(&args, "bin", "0b", |n| format!("{n:b}"))
}

fn elements(args: &[Value], function: &str) -> Result<Vec<Value>, RuntimeError> {
    Ok(argument(args, 0, function)?.as_array()?.borrow().clone())
}

pub fn all(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(elements(&args, "all")?.iter().all(Value::is_truthy)))
}

pub fn any(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(elements(&args, "any")?.iter().any(Value::is_truthy)))
}

pub fn sin(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    Ok(number_argument(&args, 0, "sin")?.sin().into())
}

pub fn cos(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    Ok(number_argument(&args, 0, "cos")?.cos().into())
}

pub fn tan(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    Ok(number_argument(&args, 0, "tan")?.tan().into())
}

/// Natural logarithm, or `log(x, base)`.
pub fn log(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    let number = number_argument(&args, 0, "log")?;
    match args.get(1) {
        Some(base) => Ok(number.log(base.as_number()?).into()),
        None => Ok(number.ln().into()),
    }
}

pub fn time(_: &mut dyn Runtime, _args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| RuntimeError::runtime(e.to_string()))?;
    Ok(elapsed.as_secs_f64().into())
}

/// `rand()` in `[0, 1)`, `rand(high)` in `[0, high)` or `rand(low, high)`.
pub fn rand(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    let (low, high) = match args.len() {
        0 => (0.0, 1.0),
        1 => (0.0, args[0].as_number()?),
        _ => (args[0].as_number()?, args[1].as_number()?),
    };

    if !(high - low).is_finite() || high < low {
        return Err(RuntimeError::runtime(format!("`rand` needs a finite range, got {low} to {high}")));
    }

    if low == high {
        return Ok(low.into());
    }

    Ok(rand::thread_rng().gen_range(low..high).into())
}

/// A whole number in `[low, high]`, both ends included.
pub fn rand_int(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    let (low, high) = match args.len() {
        0 => return Err(RuntimeError::type_error("`rand_int` expects at least 1 argument(s), got 0")),
        1 => (0, args[0].as_integer()?),
        _ => (args[0].as_integer()?, args[1].as_integer()?),
    };

    if high < low {
        return Err(RuntimeError::runtime(format!("`rand_int` range {low} to {high} is empty")));
    }

    Ok(Value::Number(rand::thread_rng().gen_range(low..=high) as f64))
}

pub fn sleep(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    let seconds = number_argument(&args, 0, "sleep")?;
    let duration = Duration::try_from_secs_f64(seconds)
        .map_err(|e| RuntimeError::runtime(format!("cannot sleep for {seconds} seconds: {e}")))?;

    thread::sleep(duration);
    Ok(Value::Nil)
}

pub fn exit(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    let code = match args.first() {
        Some(code) => code.as_integer()?.clamp(i32::MIN.into(), i32::MAX.into()) as i32,
        None => 0,
    };
    Err(RuntimeError::exit(code))
}

/// Distinct for every live array, map, function, class and instance.
/// Plain values share the identity 0.
pub fn id(_: &mut dyn Runtime, args: Vec<Value>, _this: Option<Value>) -> Result<Value, RuntimeError> {
    let identity = argument(&args, 0, "id")?.identity().unwrap_or(0);
    Ok(identity.into())
}
