//! Four-pass JSON object extraction from an LLM response body. Passes 1–3
//! follow the code-block/raw-brace strategy used for tool-call parsing
//! elsewhere in this crate's lineage; pass 4 (brace-balanced walk) is needed
//! for responses where the model emits nested JSON and a naive
//! first-`{`/last-`}` scan would capture trailing garbage.

/// Try, in order: whole-body parse, fenced ```json block, first flat
/// `{...}` substring, brace-balanced walk. Returns the first candidate that
/// parses as a JSON object.
pub fn extract_json_object(text: &str) -> Option<serde_json::Value> {
    whole_body(text)
        .or_else(|| fenced_json_block(text))
        .or_else(|| flat_braces(text))
        .or_else(|| brace_balanced_walk(text))
}

fn try_parse(candidate: &str) -> Option<serde_json::Value> {
    let value: serde_json::Value = serde_json::from_str(candidate.trim()).ok()?;
    if value.is_object() {
        Some(value)
    } else {
        None
    }
}

fn whole_body(text: &str) -> Option<serde_json::Value> {
    try_parse(text)
}

fn fenced_json_block(text: &str) -> Option<serde_json::Value> {
    let start = text.find("```json")?;
    let body_start = start + 7;
    let end = text[body_start..].find("```")?;
    try_parse(&text[body_start..body_start + end])
}

fn flat_braces(text: &str) -> Option<serde_json::Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    try_parse(&text[start..=end])
}

/// Scan for the first balanced `{...}` span, tracking nesting depth. Bails
/// out and keeps scanning from the next `{` if a candidate span fails to
/// parse, mirroring the original analyzer's brace-counting retry loop.
fn brace_balanced_walk(text: &str) -> Option<serde_json::Value> {
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '{' {
            let mut depth = 0i32;
            let mut j = i;
            while j < chars.len() {
                match chars[j] {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            let candidate: String = chars[i..=j].iter().collect();
                            if let Some(v) = try_parse(&candidate) {
                                return Some(v);
                            }
                            break;
                        }
                    }
                    _ => {}
                }
                j += 1;
            }
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_body() {
        let v = extract_json_object(r#"{"category": "05_Pessoal"}"#).unwrap();
        assert_eq!(v["category"], "05_Pessoal");
    }

    #[test]
    fn parses_fenced_json_block() {
        let text = "Here you go:\n```json\n{\"category\": \"04_Livros\"}\n```\nDone.";
        let v = extract_json_object(text).unwrap();
        assert_eq!(v["category"], "04_Livros");
    }

    #[test]
    fn parses_flat_braces_with_surrounding_prose() {
        let text = r#"Sure, the result is {"category": "03_Estudos"} as requested."#;
        let v = extract_json_object(text).unwrap();
        assert_eq!(v["category"], "03_Estudos");
    }

    #[test]
    fn brace_walk_skips_leading_unbalanced_object_and_finds_nested() {
        let text = r#"junk { not json then real: {"category": "02_Financas", "nested": {"a": 1}} trailer"#;
        let v = extract_json_object(text).unwrap();
        assert_eq!(v["category"], "02_Financas");
    }

    #[test]
    fn no_json_returns_none() {
        assert!(extract_json_object("no json here at all").is_none());
    }
}
