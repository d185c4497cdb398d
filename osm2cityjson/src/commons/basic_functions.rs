use std::path::Path;

/// True for paths that should be read as GeoJSON rather than through GDAL
pub fn is_geojson_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("geojson") || ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Turn a JSON property value into an attribute string
/// Strings are kept as-is, numbers and booleans are printed, null and empty strings become `None`
pub fn json_value_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if s.is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
