//! JSON repair for generative-insight responses.
//!
//! Generative backends return JSON wrapped in varying amounts of junk:
//! markdown code fences, leading prose, trailing commas, or output cut
//! off mid-object by a token limit. The repair chain applies
//! progressively more aggressive transformations and stops at the
//! first one that parses. If none does, the caller falls back to a
//! templated insight rather than guessing.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use vetter_core::GenerativeInsight;

lazy_static! {
    static ref CODE_FENCE: Regex = Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").unwrap();
    static ref TRAILING_COMMA: Regex = Regex::new(r",\s*([}\]])").unwrap();
    static ref DANGLING_KEY: Regex = Regex::new(r#",?\s*"[^"]*"\s*$"#).unwrap();
}

#[derive(Error, Debug)]
pub enum RepairError {
    #[error("no JSON object found in response")]
    NoJsonObject,

    #[error("response unparseable after repair: {0}")]
    Unparseable(#[from] serde_json::Error),
}

/// Parse a raw backend response into a [`GenerativeInsight`], repairing
/// common damage along the way.
pub fn repair_insight(raw: &str) -> Result<GenerativeInsight, RepairError> {
    // Fast path: the response is already clean JSON.
    if let Ok(insight) = serde_json::from_str(raw.trim()) {
        return Ok(insight);
    }

    let unfenced = strip_code_fence(raw);
    let span = extract_object_span(&unfenced).ok_or(RepairError::NoJsonObject)?;

    if let Ok(insight) = serde_json::from_str(span) {
        return Ok(insight);
    }

    let decommaed = TRAILING_COMMA.replace_all(span, "$1");
    if let Ok(insight) = serde_json::from_str(&decommaed) {
        return Ok(insight);
    }

    let escaped = escape_bare_control_chars(&decommaed);
    if let Ok(insight) = serde_json::from_str(&escaped) {
        return Ok(insight);
    }

    // Last resort for truncated output: cut back to the last position
    // where every brace and bracket is balanced, then close what is
    // still open.
    let completed = complete_truncated(&escaped).ok_or(RepairError::NoJsonObject)?;
    let insight = serde_json::from_str(&completed)?;
    Ok(insight)
}

fn strip_code_fence(raw: &str) -> String {
    match CODE_FENCE.captures(raw) {
        Some(captures) => captures[1].to_string(),
        None => raw.to_string(),
    }
}

/// The substring from the first `{` to the last `}`, if both exist in
/// order.
fn extract_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    match text.rfind('}') {
        Some(end) if end > start => Some(&text[start..=end]),
        // Truncated output may have an opening brace and no closing
        // one; hand the tail to the truncation repair.
        _ => Some(&text[start..]),
    }
}

/// Escape raw newlines, carriage returns, and tabs inside string
/// literals. Backends regularly emit multi-line reasoning text without
/// escaping it.
fn escape_bare_control_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
                out.push(c);
                continue;
            }
            match c {
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                _ => out.push(c),
            }
        } else {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
        }
    }
    out
}

/// Trim a truncated JSON object back to its last complete value and
/// close any still-open containers.
fn complete_truncated(text: &str) -> Option<String> {
    let mut depth_stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    // Byte offset just past the last structurally complete value.
    let mut last_safe = None;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
                last_safe = Some(i + 1);
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth_stack.push('}'),
            '[' => depth_stack.push(']'),
            '}' | ']' => {
                if depth_stack.pop() != Some(c) {
                    return None;
                }
                last_safe = Some(i + c.len_utf8());
            }
            c if !c.is_whitespace() && c != ',' && c != ':' => {
                // Bare literals and numbers count as complete values.
                last_safe = Some(i + c.len_utf8());
            }
            _ => {}
        }
    }

    let cut = last_safe?;
    let mut repaired = text[..cut].to_string();

    // If the cut landed on a key whose value was lost to truncation,
    // drop the dangling key too.
    if text[cut..].trim_start().starts_with(':') {
        repaired = DANGLING_KEY.replace(&repaired, "").into_owned();
    }

    // Re-walk the kept prefix to find what is still open.
    let mut open: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for c in repaired.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => open.push('}'),
            '[' => open.push(']'),
            '}' | ']' => {
                open.pop();
            }
            _ => {}
        }
    }
    while let Some(closer) = open.pop() {
        repaired.push(closer);
    }
    Some(repaired)
}
