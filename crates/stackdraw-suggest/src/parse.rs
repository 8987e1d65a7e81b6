use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no JSON object found in model output")]
    NoObject,

    #[error("malformed JSON in model output: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Recover the single top-level JSON object from raw model output.
///
/// Everything before the first `{` and after the last `}` is ignored, so prose
/// and code fences around the object are fine. The slice between them must be
/// strict JSON. Text that mentions braces outside the object breaks this.
pub fn extract_json_object(raw: &str) -> Result<Value, ExtractError> {
    let json_str = slice_object(raw).ok_or(ExtractError::NoObject)?;
    Ok(serde_json::from_str(json_str)?)
}

fn slice_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_object_wrapped_in_prose_and_fences() {
        let raw = "Sure! ```json\n{\"nodes\":[],\"edges\":[]}\n```";
        assert_eq!(extract_json_object(raw).unwrap(), json!({"nodes": [], "edges": []}));
    }

    #[test]
    fn keeps_nested_objects() {
        let raw = "Here you go:\n{\"a\": {\"b\": {\"c\": 1}}}\nLet me know!";
        assert_eq!(extract_json_object(raw).unwrap(), json!({"a": {"b": {"c": 1}}}));
    }

    #[test]
    fn no_braces_is_no_object() {
        assert!(matches!(extract_json_object("I can't help with that."), Err(ExtractError::NoObject)));
        assert!(matches!(extract_json_object(""), Err(ExtractError::NoObject)));
    }

    #[test]
    fn reversed_braces_is_no_object() {
        assert!(matches!(extract_json_object("} oops {"), Err(ExtractError::NoObject)));
    }

    #[test]
    fn interior_must_be_strict_json() {
        let raw = "{\"nodes\": [], \"edges\": [],}";
        assert!(matches!(extract_json_object(raw), Err(ExtractError::Malformed(_))));
    }

    #[test]
    fn trailing_prose_with_braces_breaks_extraction() {
        let raw = "{\"nodes\": [], \"edges\": []} and {note}";
        assert!(matches!(extract_json_object(raw), Err(ExtractError::Malformed(_))));
    }
}
