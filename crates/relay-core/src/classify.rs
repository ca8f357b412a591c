// Summary classification - one human readable line per decoded record.
// Purely for the diagnostics log, never changes the JSON payload.

use crate::FieldMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Alarm,
    Auth,
    Vpn,
    AdminSession,
    Login,
    Connection,
    FileShare,
    FileTransfer,
    Unclassified,
}

#[derive(Debug, Clone)]
struct ClassifierRule {
    value: &'static str,
    // (field, needle) that must also be present
    requires: Option<(&'static str, &'static str)>,
    category: Category,
}

/// Maps the value of one discriminating field to a category, first rule wins.
#[derive(Debug, Clone)]
pub struct Classifier {
    field: &'static str,
    rules: Vec<ClassifierRule>,
}

impl Classifier {
    pub fn new(field: &'static str) -> Self {
        Self { field, rules: Vec::new() }
    }

    pub fn rule(mut self, value: &'static str, category: Category) -> Self {
        self.rules.push(ClassifierRule { value, requires: None, category });
        self
    }

    /// Like [`Classifier::rule`] but only when `field` contains `needle`.
    pub fn rule_when(
        mut self,
        value: &'static str,
        field: &'static str,
        needle: &'static str,
        category: Category,
    ) -> Self {
        self.rules.push(ClassifierRule {
            value,
            requires: Some((field, needle)),
            category,
        });
        self
    }

    pub fn classify(&self, fields: &FieldMap) -> Category {
        let Some(kind) = fields.get(self.field) else {
            return Category::Unclassified;
        };
        self.rules
            .iter()
            .find(|rule| {
                rule.value == kind
                    && rule
                        .requires
                        .map_or(true, |(f, needle)| fields.get_or_empty(f).contains(needle))
            })
            .map(|rule| rule.category)
            .unwrap_or(Category::Unclassified)
    }

    pub fn summarize<'a>(&self, fields: &'a FieldMap) -> Summary<'a> {
        Summary {
            category: self.classify(fields),
            kind: fields.get(self.field).unwrap_or("unknown"),
            fields,
        }
    }
}

pub struct Summary<'a> {
    category: Category,
    kind: &'a str,
    fields: &'a FieldMap,
}

impl Summary<'_> {
    pub fn category(&self) -> Category {
        self.category
    }
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let get = |key: &'static str| self.fields.get_or_empty(key);
        let kind = self.kind.to_uppercase();
        match self.category {
            Category::Alarm => write!(
                f,
                "ALARM: {} -> {} | {} | {}",
                get("srcip"),
                get("dstip"),
                get("action"),
                get("msg")
            ),
            Category::Auth => write!(
                f,
                "AUTH: {}@{} | error={}",
                get("user"),
                get("address"),
                self.fields.get("error").unwrap_or("none")
            ),
            Category::Vpn => write!(f, "VPN: {} -> {} | {}", get("srcip"), get("dstip"), get("msg")),
            Category::AdminSession => {
                write!(f, "ADMIN: {}@{} | {}", get("user"), get("address"), get("msg"))
            }
            Category::Login => {
                write!(f, "LOGIN: {}@{} | {}", get("user"), get("address"), get("msg"))
            }
            Category::Connection => write!(
                f,
                "{}: {}:{} -> {}:{} | {}",
                kind,
                get("srcip"),
                get("srcport"),
                get("dstip"),
                get("dstport"),
                get("action")
            ),
            Category::FileShare => write!(
                f,
                "CONNECTION: {}@{} -> {} via {}",
                get("user"),
                get("srcip"),
                get("share"),
                get("protocol")
            ),
            Category::FileTransfer => write!(
                f,
                "{}: {}@{} {} {}",
                kind,
                get("user"),
                get("srcip"),
                get("action"),
                get("path")
            ),
            Category::Unclassified => {
                // whatever identifies the record best
                let origin = ["fw", "computer", "srcip"]
                    .into_iter()
                    .map(get)
                    .find(|v| !v.is_empty())
                    .unwrap_or("");
                let detail = Some(get("msg"))
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| get("action"));
                write!(f, "{}: {} | {}", kind, origin, detail)
            }
        }
    }
}
