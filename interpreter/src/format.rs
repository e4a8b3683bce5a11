// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{iter::Peekable, str::Chars};

use crate::{RuntimeError, Value};

const INTEGRAL_LIMIT: f64 = 1e15;

/// Largest width or precision a `printf` conversion accepts.
const MAX_FIELD_SIZE: usize = 1 << 16;

/// Integral numbers print without a fraction; others with up to ten
/// significant digits.
#[must_use]
pub fn format_number(number: f64) -> String {
    if number.is_nan() {
        return "nan".into();
    }

    if number.is_infinite() {
        return if number < 0.0 { "-inf".into() } else { "inf".into() };
    }

    if number.fract() == 0.0 && number.abs() < INTEGRAL_LIMIT {
        return (number as i64).to_string();
    }

    format_general(number, 10)
}

/// C's `%g`: `precision` significant digits, scientific notation for very
/// large or small exponents, trailing zeros removed.
#[must_use]
pub fn format_general(number: f64, precision: usize) -> String {
    if number == 0.0 {
        return "0".into();
    }

    let precision = precision.max(1);
    let scientific = format!("{:.*e}", precision - 1, number);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or_default();

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{sign}{:02}", trim_fraction(mantissa), exponent.abs());
    }

    let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
    trim_fraction(&format!("{number:.decimals$}")).to_string()
}

fn trim_fraction(text: &str) -> &str {
    if !text.contains('.') {
        return text;
    }

    text.trim_end_matches('0').trim_end_matches('.')
}

#[derive(Debug, Default, Clone, Copy)]
struct Specifier {
    left_align: bool,
    zero_pad: bool,
    plus_sign: bool,
    width: usize,
    precision: Option<usize>,
    conversion: char,
}

/// Whether `format` contains a conversion that [`format_printf`] fills in.
#[must_use]
pub fn has_format_specifier(format: &str) -> bool {
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            continue;
        }

        let mut rest = chars.clone().skip_while(|c| matches!(c, '-' | '+' | '.' | '0'..='9' | 'l' | 'h'));
        match rest.next() {
            Some('d' | 'i' | 'u' | 'f' | 'F' | 'e' | 'E' | 'g' | 'G' | 's' | 'x' | 'X' | 'o' | 'c') => return true,
            Some('%') => {
                chars.next();
            }
            _ => (),
        }
    }
    false
}

/// `printf`-style formatting. `display` renders `%s` arguments, so the
/// caller decides how instances look.
pub fn format_printf(
    format: &str,
    arguments: &[Value],
    display: &mut dyn FnMut(&Value) -> Result<String, RuntimeError>,
) -> Result<String, RuntimeError> {
    let mut output = String::with_capacity(format.len());
    let mut arguments = arguments.iter();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            output.push(c);
            continue;
        }

        if chars.peek() == Some(&'%') {
            chars.next();
            output.push('%');
            continue;
        }

        let mut specifier = Specifier::default();
        while let Some(flag) = chars.peek().copied() {
            match flag {
                '-' => specifier.left_align = true,
                '0' => specifier.zero_pad = true,
                '+' => specifier.plus_sign = true,
                ' ' => (),
                _ => break,
            }
            chars.next();
        }

        specifier.width = read_field_size(&mut chars, format)?;

        if chars.peek() == Some(&'.') {
            chars.next();
            specifier.precision = Some(read_field_size(&mut chars, format)?);
        }

        while matches!(chars.peek(), Some('l' | 'h')) {
            chars.next();
        }

        let Some(conversion) = chars.next() else {
            output.push('%');
            break;
        };
        specifier.conversion = conversion;

        let Some(argument) = arguments.next() else {
            return Err(RuntimeError::type_error(format!("not enough arguments for format string `{format}`")));
        };

        let text = format_one(specifier, argument, display)?;
        output.push_str(&pad(specifier, text));
    }

    Ok(output)
}

/// Reads the digits of a width or precision.
fn read_field_size(chars: &mut Peekable<Chars<'_>>, format: &str) -> Result<usize, RuntimeError> {
    let mut size: usize = 0;

    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        size = size.checked_mul(10)
            .and_then(|size| size.checked_add(digit as usize))
            .filter(|size| *size <= MAX_FIELD_SIZE)
            .ok_or_else(|| RuntimeError::runtime(format!(
                "field width or precision in `{format}` exceeds {MAX_FIELD_SIZE}",
            )))?;
        chars.next();
    }

    Ok(size)
}

fn format_one(
    specifier: Specifier,
    argument: &Value,
    display: &mut dyn FnMut(&Value) -> Result<String, RuntimeError>,
) -> Result<String, RuntimeError> {
    let signed = |text: String, negative: bool| {
        if specifier.plus_sign && !negative {
            format!("+{text}")
        } else {
            text
        }
    };

    Ok(match specifier.conversion {
        'd' | 'i' | 'u' => {
            let number = argument.as_integer()?;
            signed(number.to_string(), number < 0)
        }
        'f' | 'F' => {
            let number = argument.as_number()?;
            let precision = specifier.precision.unwrap_or(6);
            signed(format!("{number:.precision$}"), number < 0.0)
        }
        'e' | 'E' => {
            let number = argument.as_number()?;
            let precision = specifier.precision.unwrap_or(6);
            let text = format!("{number:.precision$e}");
            let text = match text.split_once('e') {
                Some((mantissa, exponent)) => {
                    let exponent: i32 = exponent.parse().unwrap_or_default();
                    let sign = if exponent < 0 { '-' } else { '+' };
                    format!("{mantissa}e{sign}{:02}", exponent.abs())
                }
                None => text,
            };
            let text = if specifier.conversion == 'E' { text.to_uppercase() } else { text };
            signed(text, number < 0.0)
        }
        'g' | 'G' => {
            let number = argument.as_number()?;
            let text = format_general(number, specifier.precision.unwrap_or(6));
            let text = if specifier.conversion == 'G' { text.to_uppercase() } else { text };
            signed(text, number < 0.0)
        }
        'x' => format!("{:x}", argument.as_integer()?),
        'X' => format!("{:X}", argument.as_integer()?),
        'o' => format!("{:o}", argument.as_integer()?),
        'c' => match argument {
            Value::String(str) => str.chars().next().map(String::from).unwrap_or_default(),
            other => {
                let code = other.as_integer()?;
                u32::try_from(code).ok()
                    .and_then(char::from_u32)
                    .map(String::from)
                    .ok_or_else(|| RuntimeError::type_error(format!("{code} is not a character code")))?
            }
        },
        's' => {
            let text = display(argument)?;
            match specifier.precision {
                Some(precision) => text.chars().take(precision).collect(),
                None => text,
            }
        }
        other => return Err(RuntimeError::type_error(format!("unknown format specifier `%{other}`"))),
    })
}

fn pad(specifier: Specifier, text: String) -> String {
    let length = text.chars().count();
    if length >= specifier.width {
        return text;
    }

    let padding = specifier.width - length;
    if specifier.left_align {
        return format!("{text}{}", " ".repeat(padding));
    }

    let numeric = !matches!(specifier.conversion, 's' | 'c');
    if specifier.zero_pad && numeric {
        let (sign, digits) = match text.strip_prefix(['-', '+']) {
            Some(digits) => (&text[..1], digits),
            None => ("", text.as_str()),
        };
        return format!("{sign}{}{digits}", "0".repeat(padding));
    }

    format!("{}{text}", " ".repeat(padding))
}
