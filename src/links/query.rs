//! Query-string serialization compatible with the backend's parser.
//!
//! Arrays repeat the bare key (`a=1&a=2`), never `a[0]=1`. Nested objects
//! use bracketed member names (`a[b]=1`).

use serde_json::Value;
use url::form_urlencoded;

/// Serialize `(key, value)` pairs, expanding arrays and objects.
pub fn serialize<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    let mut flat = Vec::new();
    for (key, value) in pairs {
        flatten(key, value, &mut flat);
    }
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in &flat {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

fn flatten(key: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten(key, item, out);
            }
        }
        Value::Object(members) => {
            for (member, item) in members {
                flatten(&format!("{key}[{member}]"), item, out);
            }
        }
        Value::String(text) => out.push((key.to_string(), text.clone())),
        Value::Null => out.push((key.to_string(), String::new())),
        Value::Bool(_) | Value::Number(_) => out.push((key.to_string(), value.to_string())),
    }
}

/// Parse a raw query string into ordered pairs.
pub fn parse(raw: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(raw.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}
