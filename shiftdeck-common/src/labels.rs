//! Label selector parsing and formatting

use std::collections::BTreeMap;

/// Placeholder shown when a label map is empty
pub const EMPTY_PLACEHOLDER: &str = "-";

/// Parse a `key1=value1,key2=value2` selector into a label map.
///
/// Segments without `=` (or with an empty key or value) are dropped.
/// Keys and values are trimmed. A value ends at the next `=`, so `a=b=c`
/// reads as `a=b`.
pub fn parse_labels(input: &str) -> BTreeMap<String, String> {
    input
        .split(',')
        .filter_map(|segment| {
            let mut parts = segment.split('=');
            let (key, value) = (parts.next()?.trim(), parts.next()?.trim());
            if key.is_empty() || value.is_empty() {
                None
            } else {
                Some((key.to_string(), value.to_string()))
            }
        })
        .collect()
}

/// Render a label map back to `k=v, k=v` form, or `-` when empty
pub fn format_labels(labels: &BTreeMap<String, String>) -> String {
    if labels.is_empty() {
        return EMPTY_PLACEHOLDER.to_string();
    }

    labels
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Split a comma-joined list (role resources, verbs) into trimmed items
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
