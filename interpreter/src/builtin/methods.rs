// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::cmp::Ordering;

use quantum::QString;

use crate::{operators, Runtime, RuntimeError, Value};

use super::{functions::{argument, number_argument}, BuiltinFunction};

macro_rules! methods {
    ($($name:literal => $function:ident: $documentation:literal,)*) => {
        &[
            $(
                BuiltinFunction {
                    name: $name,
                    documentation: $documentation,
                    function: &$function,
                },
            )*
        ]
    };
}

pub(super) const METHODS_ARRAY: &[BuiltinFunction] = methods! {
    "push" => array_push: "Appends the arguments.",
    "append" => array_push: "Appends the arguments.",
    "pop" => array_pop: "Removes and returns the last element, or the one at the given index.",
    "insert" => array_insert: "`insert(index, value)`.",
    "remove" => array_remove: "Removes the first element equal to the argument; returns whether one was found.",
    "index_of" => array_index_of: "Index of the first equal element, or -1.",
    "indexOf" => array_index_of: "Index of the first equal element, or -1.",
    "contains" => array_contains: "Whether an equal element exists.",
    "includes" => array_contains: "Whether an equal element exists.",
    "join" => array_join: "Joins the display text of the elements with a separator (default `,`).",
    "reverse" => array_reverse: "Reverses in place and returns the array.",
    "sort" => array_sort: "Sorts in place, by an optional key function or two-parameter comparator.",
    "map" => array_map: "A new array with the function applied to every element.",
    "filter" => array_filter: "A new array of the elements for which the function is truthy.",
    "slice" => array_slice: "`slice(start, end)` copy; negative indices count from the end.",
};

pub(super) const METHODS_STRING: &[BuiltinFunction] = methods! {
    "upper" => string_upper: "Upper-case copy.",
    "toUpperCase" => string_upper: "Upper-case copy.",
    "lower" => string_lower: "Lower-case copy.",
    "toLowerCase" => string_lower: "Lower-case copy.",
    "trim" => string_trim: "Copy without leading and trailing whitespace.",
    "strip" => string_trim: "Copy without leading and trailing whitespace.",
    "split" => string_split: "Splits on a separator, or on whitespace without one.",
    "replace" => string_replace: "Replaces every occurrence.",
    "contains" => string_contains: "Whether the argument occurs.",
    "includes" => string_contains: "Whether the argument occurs.",
    "starts_with" => string_starts_with: "Whether the string begins with the argument.",
    "startsWith" => string_starts_with: "Whether the string begins with the argument.",
    "startswith" => string_starts_with: "Whether the string begins with the argument.",
    "ends_with" => string_ends_with: "Whether the string ends with the argument.",
    "endsWith" => string_ends_with: "Whether the string ends with the argument.",
    "endswith" => string_ends_with: "Whether the string ends with the argument.",
    "find" => string_find: "Character index of the first occurrence, or -1.",
    "indexOf" => string_find: "Character index of the first occurrence, or -1.",
    "repeat" => string_repeat: "The string repeated a number of times.",
    "join" => string_join: "Joins the display text of an array's elements with this string.",
};

pub(super) const METHODS_MAP: &[BuiltinFunction] = methods! {
    "keys" => map_keys: "Keys in insertion order.",
    "values" => map_values: "Values in insertion order.",
    "items" => map_items: "`[key, value]` pairs in insertion order.",
    "get" => map_get: "The value of a key, or the default (nil) when absent.",
    "has" => map_has: "Whether the key is present.",
    "remove" => map_remove: "Removes a key, returning its value or nil.",
};

fn receiver(this: Option<Value>) -> Result<Value, RuntimeError> {
    this.ok_or_else(|| RuntimeError::type_error("method called without a receiver"))
}

/// Stable merge sort with a comparison that may fail or call back into the
/// script. `slice::sort_by` has no way to stop on a failed comparison.
fn merge_sort(
    values: Vec<Value>,
    compare: &mut dyn FnMut(&Value, &Value) -> Result<Ordering, RuntimeError>,
) -> Result<Vec<Value>, RuntimeError> {
    if values.len() <= 1 {
        return Ok(values);
    }

    let mut left = values;
    let right = left.split_off(left.len() / 2);
    let left = merge_sort(left, compare)?;
    let right = merge_sort(right, compare)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    while let (Some(lhs), Some(rhs)) = (left.peek(), right.peek()) {
        let next = if compare(rhs, lhs)? == Ordering::Less {
            right.next()
        } else {
            left.next()
        };
        merged.extend(next);
    }

    merged.extend(left);
    merged.extend(right);
    Ok(merged)
}

/// Sorts by natural order, by a key function, or by a comparator when the
/// function takes two parameters.
pub(super) fn sort_values(runtime: &mut dyn Runtime, values: Vec<Value>, function: Option<&Value>) -> Result<Vec<Value>, RuntimeError> {
    let Some(function) = function.filter(|function| !function.is_nil()) else {
        return merge_sort(values, &mut |lhs, rhs| lhs.compare(rhs));
    };

    let is_comparator = matches!(function, Value::Function(f) if f.declaration.parameters.len() == 2);
    if is_comparator {
        return merge_sort(values, &mut |lhs, rhs| {
            let result = runtime.call(function, vec![lhs.clone(), rhs.clone()])?.as_number()?;
            Ok(result.partial_cmp(&0.0).unwrap_or(Ordering::Equal))
        });
    }

    let mut keyed = Vec::with_capacity(values.len());
    for value in values {
        let key = runtime.call(function, vec![value.clone()])?;
        keyed.push(Value::array(vec![key, value]));
    }

    let sorted = merge_sort(keyed, &mut |lhs, rhs| {
        let lhs = lhs.as_array()?.borrow()[0].clone();
        let rhs = rhs.as_array()?.borrow()[0].clone();
        lhs.compare(&rhs)
    })?;

    sorted.into_iter()
        .map(|pair| Ok(pair.as_array()?.borrow()[1].clone()))
        .collect()
}

/// Resolves a possibly negative index against `length`, clamped to `0..=length`.
fn clamp_index(index: f64, length: usize) -> usize {
    let index = index.trunc();
    if index < 0.0 {
        (length as f64 + index).max(0.0) as usize
    } else {
        (index as usize).min(length)
    }
}

fn array_push(_: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = receiver(this)?;
    this.as_array()?.borrow_mut().extend(args);
    Ok(Value::Nil)
}

fn array_pop(_: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = receiver(this)?;
    let mut array = this.as_array()?.borrow_mut();
    let length = array.len();

    let index = match args.first() {
        Some(index) => {
            let index = index.as_number()?;
            let resolved = if index < 0.0 { length as f64 + index } else { index };
            if resolved < 0.0 || resolved >= length as f64 {
                return Err(RuntimeError::index_out_of_range(length, index));
            }
            resolved as usize
        }
        None if length == 0 => return Err(RuntimeError::index_error("pop from an empty array")),
        None => length - 1,
    };

    Ok(array.remove(index))
}

fn array_insert(_: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = receiver(this)?;
    let index = number_argument(&args, 0, "insert")?;
    let value = argument(&args, 1, "insert")?.clone();

    let mut array = this.as_array()?.borrow_mut();
    let index = clamp_index(index, array.len());
    array.insert(index, value);
    Ok(Value::Nil)
}

fn array_remove(_: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = receiver(this)?;
    let needle = argument(&args, 0, "remove")?;

    let mut array = this.as_array()?.borrow_mut();
    let Some(index) = array.iter().position(|element| element == needle) else {
        return Ok(Value::Bool(false));
    };

    array.remove(index);
    Ok(Value::Bool(true))
}

fn array_index_of(_: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = receiver(this)?;
    let needle = argument(&args, 0, "index_of")?;

    let array = this.as_array()?.borrow();
    Ok(match array.iter().position(|element| element == needle) {
        Some(index) => index.into(),
        None => Value::Number(-1.0),
    })
}

fn array_contains(_: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = receiver(this)?;
    let needle = argument(&args, 0, "contains")?;
    let found = this.as_array()?.borrow().iter().any(|element| element == needle);
    Ok(found.into())
}

fn array_join(runtime: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = receiver(this)?;
    let separator = match args.first() {
        Some(separator) => separator.as_string()?.clone(),
        None => QString::new_static(","),
    };

    let elements = this.as_array()?.borrow().clone();
    join(runtime, &elements, &separator)
}

fn join(runtime: &mut dyn Runtime, elements: &[Value], separator: &str) -> Result<Value, RuntimeError> {
    let mut text = String::new();
    for (idx, element) in elements.iter().enumerate() {
        if idx != 0 {
            text += separator;
        }
        text += &runtime.display(element)?;
    }
    Ok(text.into())
}

fn array_reverse(_: &mut dyn Runtime, _args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = receiver(this)?;
    this.as_array()?.borrow_mut().reverse();
    Ok(this)
}

fn array_sort(runtime: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = receiver(this)?;
    let values = this.as_array()?.borrow().clone();
    let sorted = sort_values(runtime, values, args.first())?;
    *this.as_array()?.borrow_mut() = sorted;
    Ok(this)
}

fn array_map(runtime: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = receiver(this)?;
    let function = argument(&args, 0, "map")?;
    let elements = this.as_array()?.borrow().clone();

    let mut mapped = Vec::with_capacity(elements.len());
    for element in elements {
        mapped.push(runtime.call(function, vec![element])?);
    }
    Ok(Value::array(mapped))
}

fn array_filter(runtime: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = receiver(this)?;
    let function = argument(&args, 0, "filter")?;
    let elements = this.as_array()?.borrow().clone();

    let mut kept = Vec::new();
    for element in elements {
        if runtime.call(function, vec![element.clone()])?.is_truthy() {
            kept.push(element);
        }
    }
    Ok(Value::array(kept))
}

fn array_slice(_: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = receiver(this)?;
    let array = this.as_array()?.borrow();
    let length = array.len();

    let start = match args.first() {
        Some(start) => clamp_index(start.as_number()?, length),
        None => 0,
    };
    let end = match args.get(1) {
        Some(end) => clamp_index(end.as_number()?, length),
        None => length,
    };

    let slice = if start < end { array[start..end].to_vec() } else { Vec::new() };
    Ok(Value::array(slice))
}

fn string_receiver(this: Option<Value>) -> Result<QString, RuntimeError> {
    Ok(receiver(this)?.as_string()?.clone())
}

fn string_upper(_: &mut dyn Runtime, _args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    Ok(string_receiver(this)?.to_uppercase().into())
}

fn string_lower(_: &mut dyn Runtime, _args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    Ok(string_receiver(this)?.to_lowercase().into())
}

fn string_trim(_: &mut dyn Runtime, _args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    Ok(string_receiver(this)?.trim().into())
}

fn string_split(_: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = string_receiver(this)?;

    let parts: Vec<Value> = match args.first() {
        Some(separator) => {
            let separator = separator.as_string()?;
            if separator.is_empty() {
                this.chars().map(|c| Value::string(c.to_string())).collect()
            } else {
                this.split(separator.as_str()).map(Value::from).collect()
            }
        }
        None => this.split_whitespace().map(Value::from).collect(),
    };

    Ok(Value::array(parts))
}

fn string_replace(_: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = string_receiver(this)?;
    let from = argument(&args, 0, "replace")?.as_string()?;
    let to = argument(&args, 1, "replace")?.as_string()?;
    Ok(this.replace(from.as_str(), to).into())
}

fn string_contains(_: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = string_receiver(this)?;
    let needle = argument(&args, 0, "contains")?.as_string()?;
    Ok(this.contains(needle.as_str()).into())
}

fn string_starts_with(_: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = string_receiver(this)?;
    let prefix = argument(&args, 0, "starts_with")?.as_string()?;
    Ok(this.starts_with(prefix.as_str()).into())
}

fn string_ends_with(_: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = string_receiver(this)?;
    let suffix = argument(&args, 0, "ends_with")?.as_string()?;
    Ok(this.ends_with(suffix.as_str()).into())
}

fn string_find(_: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = string_receiver(this)?;
    let needle = argument(&args, 0, "find")?.as_string()?;

    Ok(match this.find(needle.as_str()) {
        Some(offset) => this[..offset].chars().count().into(),
        None => Value::Number(-1.0),
    })
}

fn string_repeat(_: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = string_receiver(this)?;
    let count = argument(&args, 0, "repeat")?.as_integer()?;
    operators::repeat(&this, count).map(Value::from)
}

fn string_join(runtime: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = string_receiver(this)?;
    let elements = argument(&args, 0, "join")?.as_array()?.borrow().clone();
    join(runtime, &elements, &this)
}

fn map_keys(_: &mut dyn Runtime, _args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = receiver(this)?;
    let keys = this.as_map()?.borrow().keys().cloned().map(Value::String).collect();
    Ok(Value::array(keys))
}

fn map_values(_: &mut dyn Runtime, _args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = receiver(this)?;
    let values = this.as_map()?.borrow().values().cloned().collect();
    Ok(Value::array(values))
}

fn map_items(_: &mut dyn Runtime, _args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = receiver(this)?;
    let items = this.as_map()?.borrow()
        .iter()
        .map(|(key, value)| Value::array(vec![Value::String(key.clone()), value.clone()]))
        .collect();
    Ok(Value::array(items))
}

fn map_get(_: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = receiver(this)?;
    let key = argument(&args, 0, "get")?.to_key();
    let value = this.as_map()?.borrow().get(&key).cloned();
    Ok(value.or_else(|| args.get(1).cloned()).unwrap_or_default())
}

fn map_has(_: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = receiver(this)?;
    let key = argument(&args, 0, "has")?.to_key();
    let has = this.as_map()?.borrow().contains_key(&key);
    Ok(has.into())
}

fn map_remove(_: &mut dyn Runtime, args: Vec<Value>, this: Option<Value>) -> Result<Value, RuntimeError> {
    let this = receiver(this)?;
    let key = argument(&args, 0, "remove")?.to_key();
    let removed = this.as_map()?.borrow_mut().remove(&key);
    Ok(removed.unwrap_or_default())
}
