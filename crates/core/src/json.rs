//! Shared JSON serialization settings.
//!
//! Tool listings, tool arguments and tool results are all rendered into
//! prompt text. They go through one [`JsonCodec`] so that the same value
//! always produces the same string, within and across runs.

use serde::Serialize;
use serde_json::Value;

/// Immutable serialization options. Construct once, pass by reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonCodec {
    /// Drop object fields whose value is `null`.
    pub omit_nulls: bool,
    /// Emit indented output instead of a single line.
    pub pretty: bool,
}

impl JsonCodec {
    /// Compact, null-free output. Field naming is fixed by the serde derives
    /// on each type.
    pub const COMPACT: JsonCodec = JsonCodec {
        omit_nulls: true,
        pretty: false,
    };

    /// Convert any serializable value into a normalized [`Value`].
    pub fn to_value<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<Value> {
        let mut value = serde_json::to_value(value)?;
        if self.omit_nulls {
            strip_nulls(&mut value);
        }
        Ok(value)
    }

    /// Render a value as text.
    pub fn to_string<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<String> {
        let value = self.to_value(value)?;
        if self.pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        }
    }
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::COMPACT
    }
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}
