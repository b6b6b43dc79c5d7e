//! Desired-document parsing.
//!
//! Accepts either a flat property object or one wrapped in `"desired"`
//! (full twin documents carry the wrapper, patches do not).

use anyhow::{anyhow, bail};
use serde_json::{Map, Value};

pub fn parse(payload: &[u8]) -> anyhow::Result<Map<String, Value>> {
    let root: Value =
        serde_json::from_slice(payload).map_err(|e| anyhow!("desired document is not valid JSON: {e}"))?;
    let Value::Object(mut root) = root else {
        bail!("desired document is not a JSON object");
    };

    match root.remove("desired") {
        Some(Value::Object(desired)) => Ok(desired),
        Some(other) => {
            // Not a wrapper after all; keep it as an ordinary property.
            root.insert("desired".into(), other);
            Ok(root)
        }
        None => Ok(root),
    }
}

/// Document metadata such as `$version`, never counted as a property.
pub fn is_metadata(name: &str) -> bool {
    name.starts_with('$')
}
