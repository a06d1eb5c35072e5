/// Argument Validation
///
/// Per-tool argument checks. Each accessor either returns the typed value or
/// a `ToolError` describing what was wrong, so handlers never index into raw
/// JSON themselves.

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde_json::{Number, Value};
use std::fmt;
use std::ops::{Add, Mul};
use std::str::FromStr;

use crate::core::error::ToolError;
use crate::core::registry::Arguments;

/// A numeric tool argument: exact integer of any size, or floating point.
#[derive(Debug, Clone, PartialEq)]
pub enum Numeric {
    Int(BigInt),
    Float(f64),
}

impl Numeric {
    /// Parse a JSON number. Integer literals of any length stay exact; a
    /// fraction or exponent makes it a float.
    pub fn from_json(n: &Number) -> Option<Numeric> {
        let literal = n.to_string();
        if literal.contains(['.', 'e', 'E']) {
            n.as_f64().map(Numeric::Float)
        } else {
            BigInt::from_str(&literal).ok().map(Numeric::Int)
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            Numeric::Int(i) => i.to_f64().unwrap_or(f64::NAN),
            Numeric::Float(f) => *f,
        }
    }
}

// Integers stay exact; any float operand promotes the result.
impl Add for Numeric {
    type Output = Numeric;

    fn add(self, other: Numeric) -> Numeric {
        match (self, other) {
            (Numeric::Int(a), Numeric::Int(b)) => Numeric::Int(a + b),
            (a, b) => Numeric::Float(a.as_f64() + b.as_f64()),
        }
    }
}

impl Mul for Numeric {
    type Output = Numeric;

    fn mul(self, other: Numeric) -> Numeric {
        match (self, other) {
            (Numeric::Int(a), Numeric::Int(b)) => Numeric::Int(a * b),
            (a, b) => Numeric::Float(a.as_f64() * b.as_f64()),
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Int(i) => write!(f, "{}", i),
            Numeric::Float(v) => f.write_str(&format_float(*v)),
        }
    }
}

/// Shortest round-trip rendering; integral values keep a trailing `.0` and
/// very large or very small magnitudes switch to exponent form (`1e+16`).
fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let abs = v.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let repr = format!("{:e}", v);
        return match repr.split_once('e') {
            Some((mantissa, exp)) => {
                let exp: i32 = exp.parse().unwrap_or(0);
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, exp.abs())
            }
            None => repr,
        };
    }

    if v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

/// Fetch a required numeric argument.
pub fn require_number(args: &Arguments, name: &'static str) -> Result<Numeric, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Err(ToolError::MissingArgument(name)),
        Some(Value::Number(n)) => Numeric::from_json(n).ok_or(ToolError::WrongType {
            name,
            expected: "number",
        }),
        Some(_) => Err(ToolError::WrongType {
            name,
            expected: "number",
        }),
    }
}

/// Fetch a required string argument.
pub fn require_string<'a>(args: &'a Arguments, name: &'static str) -> Result<&'a str, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Err(ToolError::MissingArgument(name)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ToolError::WrongType {
            name,
            expected: "string",
        }),
    }
}
