use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};

/// One row of the metadata table, keyed by attribute name.
pub type StoredItem = BTreeMap<String, StoredValue>;

/// Attribute value as read from (or written to) the metadata table.
///
/// The table keeps numbers as exact decimal text; `Decimal` carries that text
/// untouched until [`StoredValue::normalize`] turns it into a plain number.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    Null,
    Bool(bool),
    Text(String),
    Decimal(String),
    Integer(i64),
    Float(f64),
    List(Vec<StoredValue>),
    Map(BTreeMap<String, StoredValue>),
}

impl StoredValue {
    /// Replaces every `Decimal` in the tree with an `Integer` when it has no
    /// fractional part, otherwise with a `Float`.
    pub fn normalize(self) -> StoredValue {
        match self {
            StoredValue::Decimal(text) => normalize_decimal(&text),
            StoredValue::List(values) => {
                StoredValue::List(values.into_iter().map(StoredValue::normalize).collect())
            }
            StoredValue::Map(entries) => StoredValue::Map(
                entries
                    .into_iter()
                    .map(|(name, value)| (name, value.normalize()))
                    .collect(),
            ),
            other => other,
        }
    }

    /// Normalizes the tree and converts it into a JSON value.
    pub fn into_json(self) -> Value {
        match self.normalize() {
            StoredValue::Null => Value::Null,
            StoredValue::Bool(flag) => Value::Bool(flag),
            StoredValue::Text(text) | StoredValue::Decimal(text) => Value::String(text),
            StoredValue::Integer(number) => Value::Number(number.into()),
            StoredValue::Float(number) => Number::from_f64(number)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            StoredValue::List(values) => {
                Value::Array(values.into_iter().map(StoredValue::into_json).collect())
            }
            StoredValue::Map(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(name, value)| (name, value.into_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StoredValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Converts a whole item into a JSON object with plain numbers.
pub fn item_to_json(item: StoredItem) -> Value {
    StoredValue::Map(item).into_json()
}

fn normalize_decimal(text: &str) -> StoredValue {
    let trimmed = text.trim();
    let Some(parts) = DecimalParts::parse(trimmed) else {
        return StoredValue::Text(text.to_string());
    };

    if parts.is_integral() {
        if let Some(integer) = parts.to_i64() {
            return StoredValue::Integer(integer);
        }
    }

    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() => StoredValue::Float(number),
        _ => StoredValue::Text(text.to_string()),
    }
}

/// Decimal text split into sign, digits and the count of digits after the
/// decimal point once the exponent is applied.
struct DecimalParts {
    negative: bool,
    digits: String,
    scale: i64,
}

impl DecimalParts {
    fn parse(text: &str) -> Option<Self> {
        let negative = text.starts_with('-');
        let unsigned = text.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(text);

        let (mantissa, exponent) = match unsigned.split_once(|c: char| c == 'e' || c == 'E') {
            Some((mantissa, exponent)) => (mantissa, exponent.parse::<i64>().ok()?),
            None => (unsigned, 0),
        };

        let (integer_part, fraction_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if integer_part.is_empty() && fraction_part.is_empty() {
            return None;
        }
        if !integer_part.bytes().all(|b| b.is_ascii_digit())
            || !fraction_part.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        Some(Self {
            negative,
            digits: format!("{}{}", integer_part, fraction_part),
            scale: (fraction_part.len() as i64).checked_sub(exponent)?,
        })
    }

    fn is_integral(&self) -> bool {
        let trailing_zeros = (self.digits.len() - self.digits.trim_end_matches('0').len()) as i64;
        self.scale <= trailing_zeros
    }

    fn to_i64(&self) -> Option<i64> {
        let significant = self.digits.trim_start_matches('0');
        if significant.is_empty() {
            return Some(0);
        }

        let integer_digits = if self.scale >= 0 {
            significant[..significant.len().saturating_sub(self.scale as usize)].to_string()
        } else {
            // i64 holds at most 19 digits
            let padding = usize::try_from(-self.scale).ok().filter(|p| *p <= 19)?;
            format!("{}{}", significant, "0".repeat(padding))
        };

        if integer_digits.is_empty() {
            return Some(0);
        }

        let signed = if self.negative {
            format!("-{}", integer_digits)
        } else {
            integer_digits
        };
        signed.parse::<i64>().ok()
    }
}
