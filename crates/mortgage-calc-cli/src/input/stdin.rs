use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Piped stdin text, or None when stdin is a terminal or the pipe is empty.
pub fn read_stdin() -> io::Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    tracing::debug!(bytes = trimmed.len(), "read input from stdin");
    Ok(Some(trimmed.to_string()))
}

/// Parse piped text as JSON, falling back to YAML for form dumps.
pub fn parse_piped<T: DeserializeOwned>(text: &str) -> Result<T, Box<dyn std::error::Error>> {
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(json_err) if text.starts_with('{') || text.starts_with('[') => {
            Err(format!("Failed to parse stdin as JSON: {}", json_err).into())
        }
        Err(_) => serde_yaml::from_str(text)
            .map_err(|e| format!("Failed to parse stdin as YAML: {}", e).into()),
    }
}
