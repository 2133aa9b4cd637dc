use serde_json::Value;
use std::error::Error;
use std::io::{self, Write};

const LINE_KEYS: [&str; 2] = ["summary_lines", "lines"];

/// Write the result as CSV to stdout.
///
/// Schedules become one record per month. Summaries become
/// `field,min,max,text` records: ranges fill min/max, scalars fill text,
/// and each summary line follows as a `line` record.
pub fn print_csv(value: &Value) -> Result<(), Box<dyn Error>> {
    write_csv(value, io::stdout().lock())
}

pub fn write_csv<W: Write>(value: &Value, out: W) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_writer(out);
    let result = value.get("result").unwrap_or(value);

    match result.get("rows") {
        Some(Value::Array(rows)) => write_rows(&mut wtr, rows)?,
        _ => write_summary(&mut wtr, result)?,
    }

    wtr.flush()?;
    Ok(())
}

fn write_rows<W: Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> Result<(), Box<dyn Error>> {
    let Some(Value::Object(first)) = rows.first() else {
        return Ok(());
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;

    for row in rows {
        let record: Vec<String> = headers
            .iter()
            .map(|h| row.get(*h).map(cell).unwrap_or_default())
            .collect();
        wtr.write_record(&record)?;
    }
    Ok(())
}

fn write_summary<W: Write>(wtr: &mut csv::Writer<W>, result: &Value) -> Result<(), Box<dyn Error>> {
    wtr.write_record(["field", "min", "max", "text"])?;

    if let Value::Object(map) = result {
        for (key, val) in map {
            if !LINE_KEYS.contains(&key.as_str()) {
                flatten(wtr, key, val)?;
            }
        }
    }

    for key in LINE_KEYS {
        if let Some(Value::Array(lines)) = result.get(key) {
            for line in lines {
                wtr.write_record(["line", "", "", &cell(line)])?;
            }
        }
    }
    Ok(())
}

fn flatten<W: Write>(
    wtr: &mut csv::Writer<W>,
    field: &str,
    value: &Value,
) -> Result<(), Box<dyn Error>> {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            if let (Some(min), Some(max)) = (map.get("min"), map.get("max")) {
                wtr.write_record([field, &cell(min), &cell(max), ""])?;
            } else {
                for (key, val) in map {
                    flatten(wtr, &format!("{field}.{key}"), val)?;
                }
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                // Categories and units read better by name than by position
                let label = ["category", "id"]
                    .iter()
                    .find_map(|k| item.get(*k).and_then(Value::as_str))
                    .map_or_else(|| i.to_string(), str::to_string);
                flatten(wtr, &format!("{field}.{label}"), item)?;
            }
        }
        scalar => wtr.write_record([field, "", "", &cell(scalar)])?,
    }
    Ok(())
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
