// field extraction - a matched rule + the raw line into a FieldMap

use crate::dialect::{AliasTable, Capture, DialectRule};
use crate::FieldMap;
use regex::{Captures, Regex};

/// Fields captured by `rule` on `line`, without the rule's constant tags.
///
/// `captures` is the match the decision policy already made for positional
/// rules; key=value rules always rescan the whole line.
pub fn extract(rule: &DialectRule, line: &str, captures: Option<&Captures<'_>>) -> FieldMap {
    match &rule.capture {
        Capture::Positional(names) => match captures {
            Some(caps) => bind_positional(names, caps),
            None => rule
                .pattern
                .captures(line)
                .map(|caps| bind_positional(names, &caps))
                .unwrap_or_default(),
        },
        Capture::KeyValue(aliases) => scan_key_values(&rule.pattern, aliases, line),
    }
}

fn bind_positional(names: &[&'static str], caps: &Captures<'_>) -> FieldMap {
    let mut fields = FieldMap::new();
    for (idx, name) in names.iter().enumerate() {
        if let Some(m) = caps.get(idx + 1) {
            fields.insert(*name, m.as_str());
        }
    }
    fields
}

/// Unanchored scan for `key=value` / `key="quoted value"`. Later duplicates
/// overwrite earlier ones.
fn scan_key_values(pattern: &Regex, aliases: &AliasTable, line: &str) -> FieldMap {
    let mut fields = FieldMap::new();
    for caps in pattern.captures_iter(line) {
        let Some(key) = caps.get(1) else { continue };
        // quoted group wins when it participated, even if empty
        let Some(value) = caps.get(2).or_else(|| caps.get(3)) else {
            continue;
        };
        fields.insert(aliases.canonical(key.as_str()), value.as_str());
    }
    fields
}
