//! YAML front matter (`---` fenced block at the top of a file).

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("front matter must be a mapping")]
    NotAMapping,

    #[error("front matter is not valid JSON-compatible data: {0}")]
    Convert(#[from] serde_json::Error),
}

const DELIMITER: &str = "---";

/// Split `text` into its front matter and the remaining markdown.
///
/// Text without a leading `---` line, or whose block is never closed, has no
/// front matter and is returned untouched.
pub fn split_front_matter(text: &str) -> Result<(Map<String, Value>, &str), FrontMatterError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let Some((first, mut rest)) = split_line(text) else {
        return Ok((Map::new(), text));
    };
    if first.trim_end() != DELIMITER {
        return Ok((Map::new(), text));
    }

    let yaml_start = rest;
    let mut yaml_len = 0;
    loop {
        let Some((line, after)) = split_line(rest) else {
            return Ok((Map::new(), text));
        };
        if line.trim_end() == DELIMITER {
            let yaml = &yaml_start[..yaml_len];
            return Ok((parse_yaml(yaml)?, after));
        }
        yaml_len += rest.len() - after.len();
        rest = after;
    }
}

/// First line (without its terminator) and everything after it.
fn split_line(text: &str) -> Option<(&str, &str)> {
    if text.is_empty() {
        return None;
    }
    match text.find('\n') {
        Some(idx) => Some((text[..idx].trim_end_matches('\r'), &text[idx + 1..])),
        None => Some((text, "")),
    }
}

fn parse_yaml(yaml: &str) -> Result<Map<String, Value>, FrontMatterError> {
    if yaml.trim().is_empty() {
        return Ok(Map::new());
    }

    let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(FrontMatterError::NotAMapping),
    }
}
