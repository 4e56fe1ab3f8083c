use serde_json::Value;

/// Headline figure of each command, as a path into the result object.
const PRIORITY_PATHS: [&str; 8] = [
    "performance.performance_index",
    "financing.borrowing_capacity",
    "selected.annual_tax",
    "final_value",
    "capacity",
    "total_monthly_payment",
    "monthly_payment",
    "name",
];

/// Print just the key answer value from the output.
///
/// Looks for the known headline fields in priority order, then falls back
/// to the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(val) = PRIORITY_PATHS
        .iter()
        .filter_map(|path| lookup(result_obj, path))
        .find(|v| !v.is_null())
    {
        println!("{}", format_minimal(val));
        return;
    }

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |v, key| v.get(key))
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_dotted_path() {
        let v = json!({ "financing": { "borrowing_capacity": "215000" } });
        assert_eq!(lookup(&v, "financing.borrowing_capacity"), Some(&json!("215000")));
        assert_eq!(lookup(&v, "financing.missing"), None);
        assert_eq!(lookup(&v, "capacity"), None);
    }
}
