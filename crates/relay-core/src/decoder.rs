//! Generic decoder - discriminate, extract, normalize, wrap.
//!
//! One [`Decoder`] per vendor, all sharing this pipeline; only the
//! [`Dialect`] differs. A decoder holds nothing mutable, so one instance can
//! be shared across threads and tasks without locking.

use crate::dialect::{stormshield, synology, Capture, Dialect, DialectRule, Membership};
use crate::error::{DecodeError, PatternError};
use crate::extract::extract;
use crate::normalize::normalize;
use crate::{Envelope, FieldMap};
use regex::Captures;
use tracing::{debug, error, info, warn};

/// Outcome of the decision policy for one line.
pub enum Decision<'d, 'l> {
    Matched {
        rule: &'d DialectRule,
        /// set for positional rules, key=value rules rescan the line
        captures: Option<Captures<'l>>,
    },
    NoMatch,
}

impl Decision<'_, '_> {
    pub fn is_match(&self) -> bool {
        matches!(self, Decision::Matched { .. })
    }
}

#[derive(Debug, Clone)]
pub struct Decoder {
    dialect: Dialect,
}

impl Decoder {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn stormshield() -> Result<Self, PatternError> {
        Ok(Self::new(stormshield::dialect()?))
    }

    pub fn synology() -> Result<Self, PatternError> {
        Ok(Self::new(synology::dialect()?))
    }

    pub fn vendor(&self) -> &'static str {
        self.dialect.vendor
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Does `line` belong to this dialect, and through which rule.
    pub fn decide<'d, 'l>(&'d self, line: &'l str) -> Decision<'d, 'l> {
        let gated = match self.dialect.membership {
            Membership::Token(token) => {
                if !line.contains(token) {
                    return Decision::NoMatch;
                }
                true
            }
            Membership::FirstMatch => false,
        };

        for rule in &self.dialect.rules {
            match &rule.capture {
                Capture::KeyValue(_) if gated || rule.pattern.is_match(line) => {
                    return Decision::Matched { rule, captures: None };
                }
                Capture::KeyValue(_) => {}
                Capture::Positional(_) => {
                    if let Some(captures) = rule.pattern.captures(line) {
                        return Decision::Matched {
                            rule,
                            captures: Some(captures),
                        };
                    }
                }
            }
        }
        Decision::NoMatch
    }

    /// Decode one line into its envelope.
    pub fn decode(&self, line: &str) -> Result<Envelope, DecodeError> {
        let vendor = self.vendor();
        let Decision::Matched { rule, captures } = self.decide(line) else {
            return Err(DecodeError::NoDialectMatch { vendor });
        };

        let extracted = extract(rule, line, captures.as_ref());
        if extracted.is_empty() {
            return Err(DecodeError::ExtractionEmpty { vendor });
        }

        let mut fields: FieldMap = rule.tags.iter().copied().collect();
        for (key, value) in extracted.iter() {
            fields.insert(key, value);
        }
        normalize(&self.dialect.steps, &mut fields);

        Ok(Envelope::new(vendor, fields))
    }

    /// Decode to the JSON line sent downstream.
    pub fn decode_json(&self, line: &str) -> Result<String, DecodeError> {
        let envelope = self.decode(line)?;
        let json = envelope.to_json().map_err(|source| DecodeError::Serialize {
            vendor: self.vendor(),
            source,
        })?;

        let summary = self.dialect.classifier.summarize(&envelope.fields);
        info!(
            vendor = self.vendor(),
            category = ?summary.category(),
            "{}",
            summary
        );
        Ok(json)
    }

    /// Total entry point: JSON on success, the untouched line otherwise.
    pub fn process(&self, line: &str) -> String {
        match self.decode_json(line) {
            Ok(json) => json,
            Err(err) => {
                match &err {
                    DecodeError::NoDialectMatch { .. } => debug!("{}, passing through", err),
                    DecodeError::ExtractionEmpty { .. } => warn!("{}, passing through", err),
                    DecodeError::Serialize { .. } => error!("{}, passing through", err),
                }
                line.to_string()
            }
        }
    }
}
