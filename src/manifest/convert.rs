/*!
convert.rs - type name -> string parser lookup.

Placeholders in a manifest declare a value type by name (`int`, `bool`, ...).
The registry turns the raw token into an `ArgValue` before it is stored in the
dispatch context. Only the manifest compiler uses this; the core dispatch path
never converts anything.

Standard types:
  byte short int/integer long         range-checked integers
  bigint/biginteger                    arbitrary-size integer
  float double                         floating point
  decimal/bigdecimal                   arbitrary-precision decimal
  bool/boolean                         true|false|1|0|yes|no|y|n (any case)
  char                                 exactly one character
  string                               passthrough
*/

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use serde::{Serialize, Serializer};

/// A converted placeholder value.
///
/// Big numbers serialize as strings so JSON consumers never lose precision.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    Integer(i128),
    BigInteger(#[serde(serialize_with = "as_display")] BigInt),
    Float(f64),
    Decimal(#[serde(serialize_with = "as_display")] BigDecimal),
    Bool(bool),
    Char(char),
    Text(String),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Integer(n) => write!(f, "{n}"),
            ArgValue::BigInteger(n) => write!(f, "{n}"),
            ArgValue::Float(n) => write!(f, "{n}"),
            ArgValue::Decimal(n) => write!(f, "{n}"),
            ArgValue::Bool(b) => write!(f, "{b}"),
            ArgValue::Char(c) => write!(f, "{c}"),
            ArgValue::Text(s) => f.write_str(s),
        }
    }
}

fn as_display<T: fmt::Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(value)
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("unsupported value type '{0}'")]
    UnknownType(String),

    #[error("blank value")]
    Blank,

    #[error("'{raw}' is not a valid {ty}: {reason}")]
    Invalid {
        ty: String,
        raw: String,
        reason: String,
    },
}

pub type Converter = Arc<dyn Fn(&str) -> Result<ArgValue, ConvertError> + Send + Sync>;

#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<String, Converter>,
}

impl ConverterRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the standard types.
    pub fn standard() -> Self {
        let mut r = Self::new();
        r.register("byte", integer::<i8>("byte"));
        r.register("short", integer::<i16>("short"));
        r.register("int", integer::<i32>("int"));
        r.register("integer", integer::<i32>("integer"));
        r.register("long", integer::<i64>("long"));
        r.register("bigint", parse_big_integer);
        r.register("biginteger", parse_big_integer);
        r.register("float", |raw: &str| {
            let v = parse_float(raw, "float")? as f32;
            if v.is_infinite() {
                return Err(invalid("float", raw, "out of range"));
            }
            Ok(ArgValue::Float(v as f64))
        });
        r.register("double", |raw: &str| parse_float(raw, "double").map(ArgValue::Float));
        r.register("decimal", parse_decimal);
        r.register("bigdecimal", parse_decimal);
        r.register("bool", parse_bool);
        r.register("boolean", parse_bool);
        r.register("char", parse_char);
        r.register("string", |raw: &str| Ok(ArgValue::Text(raw.to_string())));
        r
    }

    /// Register (or replace) the converter for `name`. Names are case-insensitive.
    pub fn register<F>(&mut self, name: &str, converter: F) -> &mut Self
    where
        F: Fn(&str) -> Result<ArgValue, ConvertError> + Send + Sync + 'static,
    {
        self.converters
            .insert(name.to_ascii_lowercase(), Arc::new(converter));
        self
    }

    pub fn find(&self, name: &str) -> Option<Converter> {
        self.converters.get(&name.to_ascii_lowercase()).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.converters.contains_key(&name.to_ascii_lowercase())
    }

    /// Convert `raw` with the converter registered for `name`. Blank input is
    /// rejected for every type.
    pub fn convert(&self, name: &str, raw: &str) -> Result<ArgValue, ConvertError> {
        let converter = self
            .find(name)
            .ok_or_else(|| ConvertError::UnknownType(name.to_string()))?;
        if raw.trim().is_empty() {
            return Err(ConvertError::Blank);
        }
        converter(raw)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.converters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("types", &self.names())
            .finish()
    }
}

/* ---- Standard converters ---- */

fn invalid(ty: &str, raw: &str, reason: impl fmt::Display) -> ConvertError {
    ConvertError::Invalid {
        ty: ty.to_string(),
        raw: raw.to_string(),
        reason: reason.to_string(),
    }
}

fn integer<T>(ty: &'static str) -> impl Fn(&str) -> Result<ArgValue, ConvertError> + Send + Sync
where
    T: std::str::FromStr + Into<i128>,
    T::Err: fmt::Display,
{
    move |raw: &str| {
        raw.parse::<T>()
            .map(|v| ArgValue::Integer(v.into()))
            .map_err(|e| invalid(ty, raw, e))
    }
}

fn parse_float(raw: &str, ty: &str) -> Result<f64, ConvertError> {
    let v = raw.parse::<f64>().map_err(|e| invalid(ty, raw, e))?;
    if !v.is_finite() {
        return Err(invalid(ty, raw, "not a finite number"));
    }
    Ok(v)
}

fn parse_big_integer(raw: &str) -> Result<ArgValue, ConvertError> {
    raw.parse::<BigInt>()
        .map(ArgValue::BigInteger)
        .map_err(|e| invalid("bigint", raw, e))
}

fn parse_decimal(raw: &str) -> Result<ArgValue, ConvertError> {
    raw.parse::<BigDecimal>()
        .map(ArgValue::Decimal)
        .map_err(|e| invalid("decimal", raw, e))
}

fn parse_bool(raw: &str) -> Result<ArgValue, ConvertError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(ArgValue::Bool(true)),
        "false" | "0" | "no" | "n" => Ok(ArgValue::Bool(false)),
        _ => Err(invalid("bool", raw, "expected true/false/yes/no/1/0")),
    }
}

fn parse_char(raw: &str) -> Result<ArgValue, ConvertError> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(ArgValue::Char(c)),
        _ => Err(invalid("char", raw, "length must be 1")),
    }
}

/* ---- Tests ---- */
