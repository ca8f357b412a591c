//! dialect registry - per-vendor rule sets that drive the generic decoder

pub mod stormshield;
pub mod synology;

use crate::classify::Classifier;
use crate::decoder::Decoder;
use crate::error::PatternError;
use crate::normalize::NormalizeStep;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

// ALIAS TABLE //

/// Raw key token -> canonical field name. Unknown keys keep their own name.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: HashMap<&'static str, &'static str>,
}

impl AliasTable {
    pub fn new(pairs: &[(&'static str, &'static str)]) -> Self {
        Self { aliases: pairs.iter().copied().collect() }
    }

    pub fn canonical<'a>(&'a self, key: &'a str) -> &'a str {
        self.aliases.get(key).copied().unwrap_or(key)
    }
}

// RULES //

/// How a rule's pattern turns into fields.
#[derive(Debug, Clone)]
pub enum Capture {
    /// capture groups bound in order to these field names
    Positional(Vec<&'static str>),
    /// every `key=value` match on the line, keys mapped through the table
    KeyValue(AliasTable),
}

#[derive(Debug, Clone)]
pub struct DialectRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub capture: Capture,
    /// constant fields written ahead of the captured ones
    pub tags: Vec<(&'static str, &'static str)>,
}

impl DialectRule {
    pub fn positional(
        name: &'static str,
        pattern: &str,
        fields: &[&'static str],
    ) -> Result<Self, PatternError> {
        Ok(Self {
            name,
            pattern: compile(name, pattern)?,
            capture: Capture::Positional(fields.to_vec()),
            tags: Vec::new(),
        })
    }

    pub fn key_value(
        name: &'static str,
        pattern: &str,
        aliases: AliasTable,
    ) -> Result<Self, PatternError> {
        Ok(Self {
            name,
            pattern: compile(name, pattern)?,
            capture: Capture::KeyValue(aliases),
            tags: Vec::new(),
        })
    }

    pub fn with_tag(mut self, field: &'static str, value: &'static str) -> Self {
        self.tags.push((field, value));
        self
    }
}

pub(crate) fn compile(rule: &str, pattern: &str) -> Result<Regex, PatternError> {
    Regex::new(pattern).map_err(|source| PatternError {
        rule: rule.to_string(),
        source,
    })
}

// DIALECT //

/// Decides whether a line belongs to the dialect at all.
#[derive(Debug, Clone)]
pub enum Membership {
    /// fixed token that must appear somewhere in the line (e.g. `id=firewall`)
    Token(&'static str),
    /// the line belongs if any rule pattern matches, tried in order
    FirstMatch,
}

/// Everything vendor specific; the decoding pipeline itself is shared.
#[derive(Debug, Clone)]
pub struct Dialect {
    pub vendor: &'static str,
    pub membership: Membership,
    pub rules: Vec<DialectRule>,
    pub steps: Vec<NormalizeStep>,
    pub classifier: Classifier,
}

impl Dialect {
    pub fn new(vendor: &'static str, membership: Membership, classifier: Classifier) -> Self {
        Self {
            vendor,
            membership,
            rules: Vec::new(),
            steps: Vec::new(),
            classifier,
        }
    }

    pub fn rule(mut self, rule: DialectRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn step(mut self, step: NormalizeStep) -> Self {
        self.steps.push(step);
        self
    }
}

// REGISTRY //

/// Decoders by vendor tag, built once at startup and shared read-only.
#[derive(Default)]
pub struct DecoderRegistry {
    decoders: HashMap<String, Arc<Decoder>>,
}

impl DecoderRegistry {
    pub fn new() -> Self {
        Self { decoders: HashMap::new() }
    }

    /// Registry with every built-in vendor dialect.
    pub fn with_builtin() -> Result<Self, PatternError> {
        let mut registry = Self::new();
        registry.register(Decoder::new(stormshield::dialect()?));
        registry.register(Decoder::new(synology::dialect()?));
        Ok(registry)
    }

    pub fn register(&mut self, decoder: Decoder) {
        self.decoders
            .insert(decoder.vendor().to_string(), Arc::new(decoder));
    }

    pub fn get(&self, vendor: &str) -> Option<Arc<Decoder>> {
        self.decoders.get(vendor).cloned()
    }

    pub fn vendors(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.decoders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
