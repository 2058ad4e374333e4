//! Environment variable naming for the LiveClass service.
//!
//! Plain settings are overridden through `LIVECLASS__SECTION__KEY`. Signing
//! material is never written to config files; a file holds the
//! `"secret_from_env"` marker instead and the value is read from
//! `LIVECLASS_SECRET_SECTION_KEY`, or from the bare `SECTION_KEY` name.

use serde_json::Value;
use std::env;
use tracing::{debug, warn};

pub const DEFAULT_PREFIX: &str = "LIVECLASS";

/// Overrides [`DEFAULT_PREFIX`] when set.
pub const PREFIX_OVERRIDE_VAR: &str = "LIVECLASS_ENV_PREFIX";

pub const SECRET_PREFIX: &str = "LIVECLASS_SECRET";

/// Section separator of plain overrides.
pub const CONFIG_SEPARATOR: &str = "__";

pub const SECRET_SEPARATOR: &str = "_";

/// Config file value that is replaced from the environment.
pub const SECRET_MARKER: &str = "secret_from_env";

/// Path fragments that mark a field as signing material.
const SECRET_FRAGMENTS: [&str; 5] = ["secret", "key", "password", "token", "team_id"];

pub fn get_config_prefix() -> String {
    env::var(PREFIX_OVERRIDE_VAR).unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// `"server.host"` becomes `"LIVECLASS__SERVER__HOST"`.
pub fn config_path_to_env_var(path: &str) -> String {
    std::iter::once(get_config_prefix().as_str())
        .chain(path.split('.'))
        .collect::<Vec<_>>()
        .join(CONFIG_SEPARATOR)
        .to_uppercase()
}

/// `"apns.private_key"` becomes `"LIVECLASS_SECRET_APNS_PRIVATE_KEY"`.
pub fn secret_path_to_env_var(path: &str) -> String {
    std::iter::once(SECRET_PREFIX)
        .chain(path.split('.'))
        .collect::<Vec<_>>()
        .join(SECRET_SEPARATOR)
        .to_uppercase()
}

/// `"apns.private_key"` becomes `"APNS_PRIVATE_KEY"`.
pub fn legacy_secret_path_to_env_var(path: &str) -> String {
    path.replace('.', SECRET_SEPARATOR).to_uppercase()
}

pub fn is_secret_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    SECRET_FRAGMENTS.iter().any(|fragment| lower.contains(fragment))
}

/// Looks up the variable backing `path`. Secrets try the prefixed name
/// before the bare one.
pub fn get_env_var(path: &str) -> Option<String> {
    let candidates = if is_secret_path(path) {
        vec![
            secret_path_to_env_var(path),
            legacy_secret_path_to_env_var(path),
        ]
    } else {
        vec![config_path_to_env_var(path)]
    };

    candidates.into_iter().find_map(|name| {
        let value = env::var(&name).ok()?;
        debug!(variable = %name, "resolved config marker");
        Some(value)
    })
}

/// Replaces every [`SECRET_MARKER`] string inside `value` with the matching
/// environment variable and returns whether anything was replaced.
///
/// Markers without a variable become `null`, so optional fields read as
/// absent instead of carrying the marker text.
pub fn inject_env_vars(value: &mut Value) -> bool {
    let mut path = Vec::new();
    resolve_markers(&mut path, value)
}

fn resolve_markers(path: &mut Vec<String>, value: &mut Value) -> bool {
    match value {
        Value::Object(map) => map.iter_mut().fold(false, |replaced, (key, child)| {
            path.push(key.clone());
            let child_replaced = resolve_markers(path, child);
            path.pop();
            replaced | child_replaced
        }),
        Value::Array(items) => items
            .iter_mut()
            .enumerate()
            .fold(false, |replaced, (index, child)| {
                path.push(index.to_string());
                let child_replaced = resolve_markers(path, child);
                path.pop();
                replaced | child_replaced
            }),
        Value::String(s) if s == SECRET_MARKER => {
            let dotted = path.join(".");
            match get_env_var(&dotted) {
                Some(resolved) => {
                    *value = Value::String(resolved);
                    true
                }
                None => {
                    warn!(path = %dotted, "no environment value for config marker");
                    *value = Value::Null;
                    false
                }
            }
        }
        _ => false,
    }
}
