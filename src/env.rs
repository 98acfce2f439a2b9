//! Environment-variable lookup for declared conffile keys.
//!
//! A parameter's environment variable is `{prefix}{conffile_key}`. The
//! snapshot is passed in as a map so tests can use synthetic data instead of
//! `std::env::vars()`.

use std::collections::HashMap;

/// Snapshot the process environment.
pub(crate) fn snapshot() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Find declared keys that are present in the environment snapshot.
///
/// Returns `(full_variable_name, conffile_key, value)` triples in the order
/// the keys were supplied.
pub(crate) fn matching<'a>(
    prefix: &str,
    keys: impl IntoIterator<Item = &'a str>,
    vars: &HashMap<String, String>,
) -> Vec<(String, &'a str, String)> {
    let mut found = Vec::new();
    for key in keys {
        let var = format!("{prefix}{key}");
        if let Some(value) = vars.get(&var) {
            found.push((var, key, value.clone()));
        }
    }
    found
}
