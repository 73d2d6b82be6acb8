//! Opaque client JSON kept as text and re-emitted without re-encoding.

use serde::ser::Error as _;
use serde::Serializer;
use serde_json::value::RawValue;

/// Serialize stored JSON text as an embedded JSON value (`null` when absent).
pub fn serialize_raw<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(text) => {
            let raw = RawValue::from_string(text.clone()).map_err(S::Error::custom)?;
            serializer.serialize_some(&raw)
        }
        None => serializer.serialize_none(),
    }
}

/// Capture an incoming raw value as text. JSON `null` counts as absent.
pub fn capture(raw: Option<Box<RawValue>>) -> Option<String> {
    raw.map(|r| r.get().to_string()).filter(|s| s != "null")
}
