use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Print summary lines, or scalar fields plus schedule rows, as tables.
pub fn print_table(value: &Value) {
    let result = value.get("result").unwrap_or(value);

    let lines = result.get("summary_lines").or_else(|| result.get("lines"));
    if let Some(Value::Array(lines)) = lines {
        let mut builder = Builder::default();
        builder.push_record(["Summary"]);
        for line in lines {
            builder.push_record([format_value(line)]);
        }
        println!("{}", Table::from(builder));
    } else if let Value::Object(map) = result {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map.iter().filter(|(k, _)| k.as_str() != "rows") {
            builder.push_record([key.clone(), format_value(val)]);
        }
        println!("{}", Table::from(builder));
    }

    if let Some(Value::Array(rows)) = result.get("rows") {
        println!();
        print_rows(rows);
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        println!("(empty)");
        return;
    };
    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for row in rows {
        builder.push_record(
            headers
                .iter()
                .map(|h| row.get(h.as_str()).map(format_value).unwrap_or_default()),
        );
    }
    println!("{}", Table::from(builder));
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Object(map) if map.contains_key("min") && map.contains_key("max") => {
            let min = map.get("min").map(format_value).unwrap_or_default();
            let max = map.get("max").map(format_value).unwrap_or_default();
            if min == max {
                min
            } else {
                format!("{} - {}", min, max)
            }
        }
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
