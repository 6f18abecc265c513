use serde_json::Value;
use std::io::{self, Write};

/// Pretty-print the envelope to stdout.
pub fn print_json(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_json(&mut stdout.lock(), value) {
        eprintln!("JSON write error: {}", e);
    }
}

pub fn write_json<W: Write>(out: &mut W, value: &Value) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decimals_stay_strings() {
        let mut buf = Vec::new();
        write_json(&mut buf, &json!({"result": {"payment": "2326.42"}})).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\"payment\": \"2326.42\""));
        assert!(text.ends_with("}\n"));
    }
}
