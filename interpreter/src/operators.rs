// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use quantum::MathOperator;

use crate::{RuntimeError, Value};

/// Longest string a repetition may produce, in bytes.
const MAX_REPEATED_LENGTH: usize = 1 << 28;

/// `text` repeated `count` times; negative counts give an empty string.
pub(crate) fn repeat(text: &str, count: i64) -> Result<String, RuntimeError> {
    let count = usize::try_from(count).unwrap_or(0);

    match text.len().checked_mul(count) {
        Some(length) if length <= MAX_REPEATED_LENGTH => Ok(text.repeat(count)),
        _ => Err(RuntimeError::runtime(format!(
            "repeating a string of length {} {count} times exceeds the limit of {MAX_REPEATED_LENGTH} bytes",
            text.len(),
        ))),
    }
}

/// Arithmetic on values that needs no help from the interpreter. String
/// concatenation and `%` formatting render values, so the interpreter
/// handles those before coming here.
pub(crate) fn arithmetic(operator: MathOperator, lhs: &Value, rhs: &Value) -> Result<Value, RuntimeError> {
    match (operator, lhs, rhs) {
        (MathOperator::Add, Value::Array(lhs), Value::Array(rhs)) => {
            let mut values = lhs.borrow().clone();
            values.extend(rhs.borrow().iter().cloned());
            return Ok(Value::array(values));
        }

        (MathOperator::Multiply, Value::String(str), count) | (MathOperator::Multiply, count, Value::String(str)) => {
            return repeat(str, count.as_integer()?).map(Value::from);
        }

        _ => (),
    }

    let (lhs, rhs) = match (lhs.as_number(), rhs.as_number()) {
        (Ok(lhs), Ok(rhs)) => (lhs, rhs),
        _ => return Err(RuntimeError::type_error(format!(
            "unsupported operand types for {}: {} and {}",
            operator.as_str(),
            lhs.type_name(),
            rhs.type_name(),
        ))),
    };

    let result = match operator {
        MathOperator::Add => lhs + rhs,
        MathOperator::Subtract => lhs - rhs,
        MathOperator::Multiply => lhs * rhs,
        MathOperator::Divide => {
            if rhs == 0.0 {
                return Err(RuntimeError::division_by_zero());
            }
            lhs / rhs
        }
        MathOperator::FloorDivide => {
            if rhs == 0.0 {
                return Err(RuntimeError::division_by_zero());
            }
            (lhs / rhs).floor()
        }
        MathOperator::Modulo => {
            let (lhs, rhs) = (integer(lhs)?, integer(rhs)?);
            if rhs == 0 {
                return Err(RuntimeError::runtime("modulo by zero"));
            }
            lhs.wrapping_rem(rhs) as f64
        }
        MathOperator::Power => lhs.powf(rhs),
        MathOperator::BitwiseAnd => (integer(lhs)? & integer(rhs)?) as f64,
        MathOperator::BitwiseOr => (integer(lhs)? | integer(rhs)?) as f64,
        MathOperator::BitwiseXor => (integer(lhs)? ^ integer(rhs)?) as f64,
        MathOperator::LeftShift => shift(lhs, rhs, i64::checked_shl)?,
        MathOperator::RightShift => shift(lhs, rhs, i64::checked_shr)?,
    };

    Ok(Value::Number(result))
}

fn integer(number: f64) -> Result<i64, RuntimeError> {
    Value::Number(number).as_integer()
}

fn shift(lhs: f64, rhs: f64, f: fn(i64, u32) -> Option<i64>) -> Result<f64, RuntimeError> {
    let (value, amount) = (integer(lhs)?, integer(rhs)?);
    u32::try_from(amount).ok()
        .and_then(|amount| f(value, amount))
        .map(|result| result as f64)
        .ok_or_else(|| RuntimeError::runtime(format!("invalid shift amount {amount}")))
}

/// `needle in container`.
pub(crate) fn contains(container: &Value, needle: &Value) -> Result<bool, RuntimeError> {
    match container {
        Value::Array(array) => Ok(array.borrow().iter().any(|element| element == needle)),
        Value::String(str) => Ok(str.contains(needle.as_string()?.as_str())),
        Value::Map(map) => Ok(map.borrow().contains_key(&needle.to_key())),
        other => Err(RuntimeError::type_error(format!("`in` is not supported on {}", other.type_name()))),
    }
}

/// Resolves a possibly negative index, failing when it is out of range.
fn resolve_index(length: usize, index: &Value) -> Result<usize, RuntimeError> {
    let number = index.as_number()?;
    let position = index.as_integer()?;
    let resolved = if position < 0 { position + length as i64 } else { position };

    if resolved < 0 || resolved >= length as i64 {
        return Err(RuntimeError::index_out_of_range(length, number));
    }

    Ok(resolved as usize)
}

pub(crate) fn index(object: &Value, index: &Value) -> Result<Value, RuntimeError> {
    match object {
        Value::Array(array) => {
            let array = array.borrow();
            let position = resolve_index(array.len(), index)?;
            Ok(array[position].clone())
        }

        Value::String(str) => {
            let length = str.chars().count();
            let position = resolve_index(length, index)?;
            Ok(str.chars().nth(position).map(|c| Value::string(c.to_string())).unwrap_or_default())
        }

        Value::Map(map) => {
            let key = index.to_key();
            map.borrow().get(&key).cloned()
                .ok_or_else(|| RuntimeError::index_error(format!("key \"{key}\" not found")))
        }

        other => Err(RuntimeError::type_error(format!("{} cannot be indexed", other.type_name()))),
    }
}

pub(crate) fn set_index(object: &Value, index: &Value, value: Value) -> Result<(), RuntimeError> {
    match object {
        Value::Array(array) => {
            let mut array = array.borrow_mut();
            let position = resolve_index(array.len(), index)?;
            array[position] = value;
            Ok(())
        }

        Value::Map(map) => {
            map.borrow_mut().insert(index.to_key(), value);
            Ok(())
        }

        other => Err(RuntimeError::type_error(format!("{} does not support item assignment", other.type_name()))),
    }
}

/// `object[start:stop:step]`. Bounds are clamped; only a zero step fails.
pub(crate) fn slice(object: &Value, start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Result<Value, RuntimeError> {
    let step = step.unwrap_or(1);
    if step == 0 {
        return Err(RuntimeError::runtime("slice step cannot be zero"));
    }

    match object {
        Value::Array(array) => {
            let array = array.borrow();
            let values = slice_indices(array.len(), start, stop, step)
                .into_iter()
                .map(|position| array[position].clone())
                .collect();
            Ok(Value::array(values))
        }

        Value::String(str) => {
            let chars: Vec<char> = str.chars().collect();
            let text: String = slice_indices(chars.len(), start, stop, step)
                .into_iter()
                .map(|position| chars[position])
                .collect();
            Ok(text.into())
        }

        other => Err(RuntimeError::type_error(format!("{} cannot be sliced", other.type_name()))),
    }
}

fn slice_indices(length: usize, start: Option<i64>, stop: Option<i64>, step: i64) -> Vec<usize> {
    let length = length as i64;
    let normalize = |index: i64, lower: i64, upper: i64| {
        let index = if index < 0 { index + length } else { index };
        index.clamp(lower, upper)
    };

    let mut indices = Vec::new();
    if step > 0 {
        let mut position = start.map_or(0, |index| normalize(index, 0, length));
        let stop = stop.map_or(length, |index| normalize(index, 0, length));
        while position < stop {
            indices.push(position as usize);
            position += step;
        }
    } else {
        let mut position = start.map_or(length - 1, |index| normalize(index, -1, length - 1));
        let stop = stop.map_or(-1, |index| normalize(index, -1, length - 1));
        while position > stop {
            indices.push(position as usize);
            position += step;
        }
    }

    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn numbers(values: &[f64]) -> Value {
        Value::array(values.iter().copied().map(Value::Number).collect())
    }

    #[rstest]
    #[case(MathOperator::Add, 2.0, 3.0, 5.0)]
    #[case(MathOperator::Divide, 7.0, 2.0, 3.5)]
    #[case(MathOperator::FloorDivide, 7.0, 2.0, 3.0)]
    #[case(MathOperator::FloorDivide, -7.0, 2.0, -4.0)]
    #[case(MathOperator::Modulo, 7.0, 3.0, 1.0)]
    #[case(MathOperator::Modulo, -7.0, 3.0, -1.0)]
    #[case(MathOperator::Power, 2.0, 10.0, 1024.0)]
    #[case(MathOperator::BitwiseAnd, 6.0, 3.0, 2.0)]
    #[case(MathOperator::BitwiseXor, 6.0, 3.0, 5.0)]
    #[case(MathOperator::LeftShift, 1.0, 4.0, 16.0)]
    #[case(MathOperator::RightShift, 17.0, 1.0, 8.0)]
    fn numeric_operators(#[case] operator: MathOperator, #[case] lhs: f64, #[case] rhs: f64, #[case] expected: f64) {
        let result = arithmetic(operator, &Value::Number(lhs), &Value::Number(rhs)).unwrap();
        assert_eq!(result, Value::Number(expected));
    }

    #[rstest]
    #[case(MathOperator::Divide)]
    #[case(MathOperator::FloorDivide)]
    #[case(MathOperator::Modulo)]
    fn zero_divisors_fail(#[case] operator: MathOperator) {
        let error = arithmetic(operator, &Value::Number(1.0), &Value::Number(0.0)).unwrap_err();
        assert_eq!(error.kind, crate::ErrorKind::RuntimeError);
    }

    #[test]
    fn strings_repeat() {
        let result = arithmetic(MathOperator::Multiply, &Value::Number(3.0), &Value::string("ab")).unwrap();
        assert_eq!(result, Value::string("ababab"));
    }

    #[rstest]
    #[case(1e18)]
    #[case(1e9)]
    fn huge_repetitions_fail(#[case] count: f64) {
        let error = arithmetic(MathOperator::Multiply, &Value::string("ab"), &Value::Number(count)).unwrap_err();
        assert_eq!(error.kind, crate::ErrorKind::RuntimeError);
    }

    #[rstest]
    #[case("ab", -2, "")]
    #[case("", 1_000_000_000_000, "")]
    #[case("xy", 2, "xyxy")]
    fn repetition_counts(#[case] text: &str, #[case] count: i64, #[case] expected: &str) {
        assert_eq!(repeat(text, count).unwrap(), expected);
    }

    #[test]
    fn subtracting_strings_is_a_type_error() {
        let error = arithmetic(MathOperator::Subtract, &Value::string("a"), &Value::Number(1.0)).unwrap_err();
        assert_eq!(error.kind, crate::ErrorKind::TypeError);
    }

    #[rstest]
    #[case(None, None, None, &[0.0, 1.0, 2.0, 3.0, 4.0])]
    #[case(Some(1), Some(3), None, &[1.0, 2.0])]
    #[case(None, Some(-2), None, &[0.0, 1.0, 2.0])]
    #[case(Some(-2), None, None, &[3.0, 4.0])]
    #[case(None, None, Some(2), &[0.0, 2.0, 4.0])]
    #[case(None, None, Some(-1), &[4.0, 3.0, 2.0, 1.0, 0.0])]
    #[case(Some(3), Some(0), Some(-1), &[3.0, 2.0, 1.0])]
    #[case(Some(-100), Some(100), None, &[0.0, 1.0, 2.0, 3.0, 4.0])]
    #[case(Some(4), Some(1), None, &[])]
    fn array_slices(#[case] start: Option<i64>, #[case] stop: Option<i64>, #[case] step: Option<i64>, #[case] expected: &[f64]) {
        let array = numbers(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(slice(&array, start, stop, step).unwrap(), numbers(expected));
    }

    #[test]
    fn string_slices_by_character() {
        let result = slice(&Value::string("héllo"), Some(1), Some(3), None).unwrap();
        assert_eq!(result, Value::string("él"));
    }

    #[rstest]
    #[case(0.0, Some(10.0))]
    #[case(-1.0, Some(30.0))]
    #[case(3.0, None)]
    #[case(-4.0, None)]
    fn array_indices(#[case] position: f64, #[case] expected: Option<f64>) {
        let array = numbers(&[10.0, 20.0, 30.0]);
        let result = index(&array, &Value::Number(position));
        match expected {
            Some(expected) => assert_eq!(result.unwrap(), Value::Number(expected)),
            None => assert_eq!(result.unwrap_err().kind, crate::ErrorKind::IndexError),
        }
    }

    #[rstest]
    #[case(numbers(&[1.0, 2.0]), Value::Number(2.0), true)]
    #[case(numbers(&[1.0, 2.0]), Value::Number(3.0), false)]
    #[case(Value::string("haystack"), Value::string("st"), true)]
    #[case(Value::string("haystack"), Value::string("needle"), false)]
    fn membership(#[case] container: Value, #[case] needle: Value, #[case] expected: bool) {
        assert_eq!(contains(&container, &needle).unwrap(), expected);
    }
}
