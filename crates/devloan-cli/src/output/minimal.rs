use serde_json::Value;

/// Print just the key answer from the output.
///
/// Summary lines are printed one per line; otherwise the first
/// well-known result field, then the first field of the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let line_keys = ["summary_lines", "lines"];
    let priority_keys = [
        "repayment_amount",
        "annual_rate_of_return",
        "total",
    ];

    if let Value::Object(map) = result_obj {
        for key in &line_keys {
            if let Some(Value::Array(lines)) = map.get(*key) {
                for line in lines {
                    println!("{}", format_minimal(line));
                }
                return;
            }
        }

        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Object(map) if map.contains_key("min") && map.contains_key("max") => {
            let min = map.get("min").map(format_minimal).unwrap_or_default();
            let max = map.get("max").map(format_minimal).unwrap_or_default();
            if min == max {
                min
            } else {
                format!("{} - {}", min, max)
            }
        }
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
