//! Item payload decoding.
//!
//! Request bodies for `createItem` and `updateItem` are decoded by hand
//! rather than through `#[derive(Deserialize)]` so that every offending
//! field is reported at once, each with a `loc` pointing into the body.
//! The rules follow the lax coercion clients of this API already rely on:
//!
//! | field         | accepted                          | rejected with            |
//! |---------------|-----------------------------------|--------------------------|
//! | `name`        | non-empty string                  | `missing`, `string_type`, `string_too_short` |
//! | `description` | string, `null`, absent            | `string_type`            |
//! | `price`       | number, numeric string            | `missing`, `float_type`, `float_parsing`, `finite_number` |
//! | `id`          | integer, integer string, `null`   | `int_type`, `int_parsing` |
//!
//! A supplied `id` is validated and then discarded; identifiers are only
//! ever assigned by the repository or taken from the path.

use serde_json::{Map, Value};

use hestia_core::{FieldError, FieldErrors, HestiaError, ItemDraft};

const MSG_JSON_INVALID: &str = "JSON decode error";
const MSG_NOT_OBJECT: &str = "Input should be a valid dictionary or object to extract fields from";
const MSG_STRING_TYPE: &str = "Input should be a valid string";
const MSG_STRING_TOO_SHORT: &str = "String should have at least 1 character";
const MSG_FLOAT_TYPE: &str = "Input should be a valid number";
const MSG_FLOAT_PARSING: &str = "Input should be a valid number, unable to parse string as a number";
const MSG_FINITE_NUMBER: &str = "Input should be a finite number";
const MSG_INT_TYPE: &str = "Input should be a valid integer";
pub(crate) const MSG_INT_PARSING: &str = "Input should be a valid integer, unable to parse string as an integer";

/// Decodes a request body into an [`ItemDraft`].
///
/// # Errors
///
/// Returns a validation error listing every field that failed, in field
/// order `name`, `description`, `price`, `id`.
///
/// # Example
///
/// ```
/// use hestia::payload::parse_item_payload;
///
/// let draft = parse_item_payload(br#"{"name": "Lamp", "price": "19.5"}"#).unwrap();
/// assert_eq!(draft.name, "Lamp");
/// assert!((draft.price - 19.5).abs() < f64::EPSILON);
///
/// let err = parse_item_payload(br#"{"price": true}"#).unwrap_err();
/// assert_eq!(err.status_code().as_u16(), 422);
/// ```
pub fn parse_item_payload(body: &[u8]) -> Result<ItemDraft, HestiaError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        let mut errors = FieldErrors::new();
        errors.missing(["body"]);
        return Err(HestiaError::validation(errors));
    }

    let value: Value = serde_json::from_slice(body).map_err(|_| {
        HestiaError::validation(FieldError::new("json_invalid", ["body"], MSG_JSON_INVALID).into())
    })?;

    let Value::Object(fields) = value else {
        return Err(HestiaError::validation(
            FieldError::new("model_attributes_type", ["body"], MSG_NOT_OBJECT).into(),
        ));
    };

    decode_fields(&fields)
}

fn decode_fields(fields: &Map<String, Value>) -> Result<ItemDraft, HestiaError> {
    let mut errors = FieldErrors::new();

    let name = name_field(fields.get("name"), &mut errors);
    let description = description_field(fields.get("description"), &mut errors);
    let price = price_field(fields.get("price"), &mut errors);
    id_field(fields.get("id"), &mut errors);

    errors.into_result()?;

    match (name, price) {
        (Some(name), Some(price)) => Ok(ItemDraft {
            name,
            description,
            price,
        }),
        _ => Err(HestiaError::internal("item payload decoded without required fields")),
    }
}

fn name_field(value: Option<&Value>, errors: &mut FieldErrors) -> Option<String> {
    match value {
        None => {
            errors.missing(["body", "name"]);
            None
        }
        Some(Value::String(name)) if name.is_empty() => {
            errors.push(FieldError::new("string_too_short", ["body", "name"], MSG_STRING_TOO_SHORT));
            None
        }
        Some(Value::String(name)) => Some(name.clone()),
        Some(_) => {
            errors.push(FieldError::new("string_type", ["body", "name"], MSG_STRING_TYPE));
            None
        }
    }
}

fn description_field(value: Option<&Value>, errors: &mut FieldErrors) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(description)) => Some(description.clone()),
        Some(_) => {
            errors.push(FieldError::new(
                "string_type",
                ["body", "description"],
                MSG_STRING_TYPE,
            ));
            None
        }
    }
}

fn price_field(value: Option<&Value>, errors: &mut FieldErrors) -> Option<f64> {
    let loc = ["body", "price"];
    let price = match value {
        None => {
            errors.missing(loc);
            return None;
        }
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(price) => Some(price),
            Err(_) => {
                errors.push(FieldError::new("float_parsing", loc, MSG_FLOAT_PARSING));
                return None;
            }
        },
        Some(_) => None,
    };

    match price {
        Some(price) if price.is_finite() => Some(price),
        Some(_) => {
            errors.push(FieldError::new("finite_number", loc, MSG_FINITE_NUMBER));
            None
        }
        None => {
            errors.push(FieldError::new("float_type", loc, MSG_FLOAT_TYPE));
            None
        }
    }
}

fn id_field(value: Option<&Value>, errors: &mut FieldErrors) {
    let loc = ["body", "id"];
    match value {
        None | Some(Value::Null) => {}
        Some(Value::Number(n)) => {
            let integral = n.is_i64()
                || n.is_u64()
                || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0);
            if !integral {
                errors.push(FieldError::new("int_type", loc, MSG_INT_TYPE));
            }
        }
        Some(Value::String(s)) => {
            if parse_integer(s).is_none() {
                errors.push(FieldError::new("int_parsing", loc, MSG_INT_PARSING));
            }
        }
        Some(_) => errors.push(FieldError::new("int_type", loc, MSG_INT_TYPE)),
    }
}

/// Outcome of reading a decimal integer from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Integer {
    /// Fits in an `i64`.
    Value(i64),
    /// Well-formed but outside the `i64` range.
    OutOfRange,
}

/// Parses an optionally signed decimal integer, tolerating surrounding
/// whitespace. Returns `None` when the text is not an integer at all.
pub(crate) fn parse_integer(raw: &str) -> Option<Integer> {
    let raw = raw.trim();
    match raw.parse::<i64>() {
        Ok(value) => Some(Integer::Value(value)),
        Err(e) => match e.kind() {
            std::num::IntErrorKind::PosOverflow | std::num::IntErrorKind::NegOverflow => {
                Some(Integer::OutOfRange)
            }
            _ => None,
        },
    }
}
