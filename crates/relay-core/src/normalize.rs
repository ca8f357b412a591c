//! Field normalization - dialect specific clean-up run after extraction.
//!
//! Every step is a pure function of the field map and idempotent: running the
//! whole list a second time never changes the result.

use crate::dialect::compile;
use crate::error::PatternError;
use crate::FieldMap;
use regex::Regex;

#[derive(Debug, Clone)]
pub enum NormalizeStep {
    /// trim surrounding whitespace from every value
    TrimWhitespace,

    /// `DOMAIN\user` -> domain + bare user. Splits at the last separator, so
    /// `A\B\c` gives domain `A\B` and user `c`. Splitting at the first one
    /// would leave `B\c` as the user and split again on the next run.
    SplitIdentity {
        field: &'static str,
        domain: &'static str,
        separator: char,
    },

    /// drop trailing delimiter characters (and whitespace) left by a greedy group
    StripTrailing {
        field: &'static str,
        chars: &'static [char],
    },

    /// admin logins carry the client address inside the message body; it wins
    /// over anything already extracted. Otherwise the contact address falls
    /// back to the source address.
    AdminAddress {
        message: &'static str,
        contact: &'static str,
        source: &'static str,
        pattern: Regex,
    },
}

impl NormalizeStep {
    pub fn admin_address(
        message: &'static str,
        contact: &'static str,
        source: &'static str,
        pattern: &str,
    ) -> Result<Self, PatternError> {
        Ok(Self::AdminAddress {
            message,
            contact,
            source,
            pattern: compile("admin_address", pattern)?,
        })
    }

    pub fn apply(&self, fields: &mut FieldMap) {
        match self {
            Self::TrimWhitespace => {
                for value in fields.values_mut() {
                    let trimmed = value.trim();
                    if trimmed.len() != value.len() {
                        *value = trimmed.to_string();
                    }
                }
            }
            Self::SplitIdentity {
                field,
                domain,
                separator,
            } => {
                let Some((dom, user)) = fields
                    .get(field)
                    .and_then(|v| v.rsplit_once(*separator))
                    .map(|(d, u)| (d.trim().to_string(), u.trim().to_string()))
                else {
                    return;
                };
                fields.insert(*field, user);
                if !dom.is_empty() {
                    fields.insert(*domain, dom);
                }
            }
            Self::StripTrailing { field, chars } => {
                if let Some(value) = fields.get_mut(field) {
                    let stripped = value.trim_end_matches(|c: char| chars.contains(&c) || c.is_whitespace());
                    if stripped.len() != value.len() {
                        *value = stripped.to_string();
                    }
                }
            }
            Self::AdminAddress {
                message,
                contact,
                source,
                pattern,
            } => {
                let admin_ip = fields
                    .get(message)
                    .and_then(|msg| pattern.captures(msg))
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string());

                if let Some(ip) = admin_ip {
                    fields.insert(*contact, ip.clone());
                    fields.insert(*source, ip);
                    return;
                }

                // keep one consistent identity address whichever part carried it
                let contact_unset = fields.get(contact).map_or(true, str::is_empty);
                if contact_unset {
                    if let Some(src) = fields.get(source).filter(|s| !s.is_empty()) {
                        let src = src.to_string();
                        fields.insert(*contact, src);
                    }
                }
            }
        }
    }
}

/// Run every step in order.
pub fn normalize(steps: &[NormalizeStep], fields: &mut FieldMap) {
    for step in steps {
        step.apply(fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{stormshield, synology};

    fn split() -> NormalizeStep {
        NormalizeStep::SplitIdentity {
            field: "user",
            domain: "domain",
            separator: '\\',
        }
    }

    #[test]
    fn test_split_identity_with_domain() {
        let mut fields: FieldMap = [("user", "CORP\\jdoe")].into_iter().collect();
        split().apply(&mut fields);
        assert_eq!(fields.get("domain"), Some("CORP"));
        assert_eq!(fields.get("user"), Some("jdoe"));
    }

    #[test]
    fn test_split_identity_nested_domain() {
        let mut fields: FieldMap = [("user", r"A\B\c")].into_iter().collect();
        split().apply(&mut fields);
        assert_eq!(fields.get("domain"), Some(r"A\B"));
        assert_eq!(fields.get("user"), Some("c"));

        // a second pass leaves both alone
        split().apply(&mut fields);
        assert_eq!(fields.get("domain"), Some(r"A\B"));
        assert_eq!(fields.get("user"), Some("c"));
    }

    #[test]
    fn test_split_identity_without_domain() {
        let mut fields: FieldMap = [("user", "jdoe")].into_iter().collect();
        split().apply(&mut fields);
        assert_eq!(fields.get("user"), Some("jdoe"));
        assert!(!fields.contains_key("domain"));
    }

    #[test]
    fn test_split_identity_empty_domain_omitted() {
        let mut fields: FieldMap = [("user", "\\jdoe")].into_iter().collect();
        split().apply(&mut fields);
        assert_eq!(fields.get("user"), Some("jdoe"));
        assert!(!fields.contains_key("domain"));
    }

    #[test]
    fn test_strip_trailing() {
        let step = NormalizeStep::StripTrailing {
            field: "share",
            chars: &['.'],
        };
        let mut fields: FieldMap = [("share", "data. .")].into_iter().collect();
        step.apply(&mut fields);
        assert_eq!(fields.get("share"), Some("data"));
    }

    #[test]
    fn test_admin_address_overrides_source() {
        let step = NormalizeStep::admin_address("msg", "address", "srcip", stormshield::ADMIN_IP_PATTERN).unwrap();
        let mut fields: FieldMap = [
            ("srcip", "192.168.1.1"),
            ("address", "192.168.1.2"),
            ("msg", "Login by administrative intervention (10.0.0.5)"),
        ]
        .into_iter()
        .collect();
        step.apply(&mut fields);
        assert_eq!(fields.get("address"), Some("10.0.0.5"));
        assert_eq!(fields.get("srcip"), Some("10.0.0.5"));
    }

    #[test]
    fn test_admin_address_falls_back_to_source() {
        let step = NormalizeStep::admin_address("msg", "address", "srcip", stormshield::ADMIN_IP_PATTERN).unwrap();

        let mut fields: FieldMap = [("srcip", "10.1.1.1"), ("address", "")].into_iter().collect();
        step.apply(&mut fields);
        assert_eq!(fields.get("address"), Some("10.1.1.1"));

        let mut kept: FieldMap = [("srcip", "10.1.1.1"), ("address", "10.9.9.9")].into_iter().collect();
        step.apply(&mut kept);
        assert_eq!(kept.get("address"), Some("10.9.9.9"));

        let mut nothing: FieldMap = [("msg", "hello")].into_iter().collect();
        step.apply(&mut nothing);
        assert!(!nothing.contains_key("address"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let steps = synology::dialect().unwrap().steps;
        let inputs = [
            vec![("user", " CORP\\jdoe "), ("share", " data. ")],
            vec![("user", "A\\B\\C"), ("share", "x . .")],
            vec![("user", "CORP\\"), ("computer", "pc ")],
            vec![("share", "")],
        ];
        for input in inputs {
            let mut once: FieldMap = input.into_iter().collect();
            normalize(&steps, &mut once);
            let mut twice = once.clone();
            normalize(&steps, &mut twice);
            assert_eq!(once, twice);
        }

        let steps = stormshield::dialect().unwrap().steps;
        let mut once: FieldMap = [
            ("srcip", "1.1.1.1"),
            ("msg", "administrative intervention (10.0.0.5)"),
        ]
        .into_iter()
        .collect();
        normalize(&steps, &mut once);
        let mut twice = once.clone();
        normalize(&steps, &mut twice);
        assert_eq!(once, twice);
    }
}
