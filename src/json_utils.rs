//! Lenient accessors over `serde_json::Value` used by the field extractor.
//! Paths are dotted (`stats.diggCount`); every accessor degrades to `None` instead of failing.

use serde_json::Value;

/// Walk a dotted path through nested objects.
pub fn lookup<'a>(v: &'a Value, path: &str) -> Option<&'a Value> {
    let mut cur = v;
    for seg in path.split('.') {
        cur = cur.as_object()?.get(seg)?;
    }
    Some(cur)
}

/// First candidate path that resolves to a nested object.
pub fn first_object<'a>(v: &'a Value, candidates: &[&str]) -> Option<&'a Value> {
    candidates.iter().find_map(|p| lookup(v, p).filter(|x| x.is_object()))
}

/// String view of a scalar: strings as-is, numbers/bools rendered. Null/arrays/objects -> None.
pub fn scalar_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First candidate with a non-empty (after trim) scalar value.
pub fn first_string(v: &Value, candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|p| {
        lookup(v, p)
            .and_then(scalar_string)
            .filter(|s| !s.trim().is_empty())
    })
}

/// Non-negative count from a number or numeric string. Floats truncate; negatives clamp to 0.
pub fn as_count(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Some(u)
            } else if let Some(i) = n.as_i64() {
                Some(i.max(0) as u64)
            } else {
                n.as_f64().filter(|f| f.is_finite()).map(|f| f.max(0.0) as u64)
            }
        }
        Value::String(s) => {
            let s = s.trim().replace(',', "");
            if let Ok(u) = s.parse::<u64>() {
                Some(u)
            } else if let Ok(i) = s.parse::<i64>() {
                Some(i.max(0) as u64)
            } else {
                s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.max(0.0) as u64)
            }
        }
        _ => None,
    }
}

/// First candidate holding a usable count.
pub fn first_count(v: &Value, candidates: &[&str]) -> Option<u64> {
    candidates.iter().find_map(|p| lookup(v, p).and_then(as_count))
}

pub fn as_flag(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// First candidate holding a boolean-like value.
pub fn first_flag(v: &Value, candidates: &[&str]) -> Option<bool> {
    candidates.iter().find_map(|p| lookup(v, p).and_then(as_flag))
}

/// True when any candidate is present and not null (used for `retweeted_status`-style markers).
pub fn any_present(v: &Value, candidates: &[&str]) -> bool {
    candidates.iter().any(|p| matches!(lookup(v, p), Some(x) if !x.is_null()))
}

/// Length of the first non-empty array among the candidates.
pub fn first_array_len(v: &Value, candidates: &[&str]) -> u64 {
    candidates
        .iter()
        .filter_map(|p| lookup(v, p).and_then(|x| x.as_array()))
        .map(|a| a.len() as u64)
        .find(|n| *n > 0)
        .unwrap_or(0)
}

/// Human name of a JSON value's type, for error messages.
pub fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
