use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::Path;

const VERSION_PATTERN: &str = r"(\d+\.\d+\.\d+(?:-[A-Za-z0-9.]+)?)";

/// Best-effort version lookup in a slicer `.conf` file.
///
/// The file is JSON, sometimes followed by `# MD5:...` comment lines. The
/// version comes from the `header` string ("OrcaSlicer 2.1.0-beta") or, failing
/// that, from `app.version`. Anything unreadable yields `None`.
pub fn extract_version(conf_file: &Path) -> Option<String> {
    let content = fs::read_to_string(conf_file).ok()?;
    extract_version_from_str(&content)
}

pub fn extract_version_from_str(content: &str) -> Option<String> {
    let json: String = content
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");
    let value: Value = serde_json::from_str(&json).ok()?;

    if let Some(header) = value.get("header").and_then(Value::as_str) {
        let re = Regex::new(VERSION_PATTERN).ok()?;
        if let Some(found) = re.captures(header) {
            return Some(found[1].to_string());
        }
    }

    value
        .get("app")
        .and_then(|app| app.get("version"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
