use serde_json::{Map, Value};

/// Parse a form post body based on its Content-Type header.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> Result<Value, String> {
    let ct = content_type.unwrap_or("application/json");

    if ct.contains("application/json") {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| format!("Invalid JSON: {e}"))?;
        if !value.is_object() {
            return Err("Expected a JSON object".to_string());
        }
        Ok(value)
    } else if ct.contains("application/x-www-form-urlencoded") {
        parse_form_urlencoded(body)
    } else {
        // Try JSON first, then form-urlencoded
        serde_json::from_slice::<Value>(body)
            .ok()
            .filter(Value::is_object)
            .map(Ok)
            .unwrap_or_else(|| parse_form_urlencoded(body))
            .map_err(|e| format!("Unable to parse body: {e}"))
    }
}

/// Repeated keys (multi-select checkboxes) are joined with `", "`.
fn parse_form_urlencoded(body: &[u8]) -> Result<Value, String> {
    std::str::from_utf8(body).map_err(|e| format!("Invalid UTF-8: {e}"))?;

    let mut map = Map::new();
    for (k, v) in form_urlencoded::parse(body) {
        match map.get_mut(&*k) {
            Some(Value::String(existing)) => {
                existing.push_str(", ");
                existing.push_str(&v);
            }
            _ => {
                map.insert(k.into_owned(), Value::String(v.into_owned()));
            }
        }
    }
    Ok(Value::Object(map))
}

/// Whether the post came from a plain HTML form rather than a script.
pub fn is_html_form(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.contains("form"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_json_objects() {
        let value = parse_body(Some("application/json"), br#"{"nome":"Ana"}"#).unwrap();
        assert_eq!(value, json!({"nome": "Ana"}));
    }

    #[test]
    fn rejects_non_object_json() {
        assert!(parse_body(Some("application/json"), b"[1,2]").is_err());
        assert!(parse_body(Some("application/json"), b"{").is_err());
    }

    #[test]
    fn joins_repeated_urlencoded_keys() {
        let body = b"nome=Ana+Souza&interesse=Vida&interesse=Auto";
        let value = parse_body(Some("application/x-www-form-urlencoded"), body).unwrap();
        assert_eq!(value["nome"], "Ana Souza");
        assert_eq!(value["interesse"], "Vida, Auto");
    }

    #[test]
    fn falls_back_to_urlencoded_without_content_type_match() {
        let value = parse_body(Some("text/plain"), b"cidade=Campinas").unwrap();
        assert_eq!(value["cidade"], "Campinas");
    }

    #[test]
    fn detects_html_forms() {
        assert!(is_html_form(Some("application/x-www-form-urlencoded")));
        assert!(!is_html_form(Some("application/json")));
        assert!(!is_html_form(None));
    }
}
