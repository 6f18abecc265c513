use serde_json::Value;

use super::format_cell;

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    // Try to extract the "result" envelope
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(line) = headline(result_obj) {
        println!("{}", line);
    }
}

/// Priority list of key output fields
const PRIORITY_KEYS: [&str; 6] = [
    "payment",
    "payment_difference",
    "premium",
    "payoff_count",
    "final_balance",
    "periodic_rate",
];

fn headline(result: &Value) -> Option<String> {
    match result {
        Value::Object(map) => {
            // Try priority keys first (skip null values)
            for key in &PRIORITY_KEYS {
                if let Some(val) = map.get(*key) {
                    if !val.is_null() {
                        return Some(format_minimal(val));
                    }
                }
            }
            // Fall back to first field
            map.iter()
                .next()
                .map(|(key, val)| format!("{}: {}", key, format_minimal(val)))
        }
        Value::Array(arr) => arr.last().and_then(headline),
        _ => Some(format_minimal(result)),
    }
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        _ => format_cell(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payment_wins() {
        let v = json!({"total_interest": "1.00", "payment": "2326.42"});
        assert_eq!(headline(&v).as_deref(), Some("2326.42"));
    }

    #[test]
    fn test_fallback_to_first_field() {
        let v = json!({"status": "insured"});
        assert_eq!(headline(&v).as_deref(), Some("status: insured"));
    }

    #[test]
    fn test_schedule_array_reports_last_row() {
        let v = json!([{"final_balance": "10"}, {"final_balance": "0"}]);
        assert_eq!(headline(&v).as_deref(), Some("0"));
    }
}
