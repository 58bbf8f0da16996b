//! Environment variable overrides.
//!
//! Variables named `CONFIG_FORCE_<path>` override any file-based value.
//! Underscore runs in `<path>` encode the characters a variable name cannot
//! hold: `_` is `.`, `__` is `-` and `___` is a literal `_`.
//!
//! `CONFIG_FORCE_netflix_iep_archaius_use__dynamic=false` therefore sets
//! `netflix.iep.archaius.use-dynamic`.

use crate::config::tree::ConfigTree;
use crate::config::value::ConfigValue;

pub const OVERRIDE_PREFIX: &str = "CONFIG_FORCE_";

/// Build the override layer from a set of environment variables.
pub fn env_overrides<I, K, V>(vars: I) -> ConfigTree
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    vars.into_iter()
        .filter_map(|(name, value)| {
            let key = override_key(name.as_ref())?;
            Some((key, ConfigValue::from(value.as_ref())))
        })
        .collect()
}

/// Map an override variable name to its config key.
pub fn override_key(var: &str) -> Option<String> {
    let encoded = var.strip_prefix(OVERRIDE_PREFIX)?;
    if encoded.is_empty() {
        return None;
    }

    let mut key = String::with_capacity(encoded.len());
    let mut underscores = 0usize;
    for c in encoded.chars() {
        if c == '_' {
            underscores += 1;
            continue;
        }
        push_underscore_run(&mut key, underscores);
        underscores = 0;
        key.push(c);
    }
    push_underscore_run(&mut key, underscores);
    Some(key)
}

fn push_underscore_run(key: &mut String, run: usize) {
    for _ in 0..run / 3 {
        key.push('_');
    }
    match run % 3 {
        1 => key.push('.'),
        2 => key.push('-'),
        _ => {}
    }
}

/// Variables from the process environment that look like overrides.
pub(crate) fn process_overrides() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .filter(|(k, _)| k.starts_with(OVERRIDE_PREFIX))
        .collect()
}
