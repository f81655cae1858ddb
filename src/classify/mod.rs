//! Command classification for observability.
//!
//! # Responsibilities
//! - Map a decoded request onto semantically named fields (`key`, `value`, ...)
//! - Provide a bounded label for per-command metrics
//!
//! # Design Decisions
//! - Pure: no I/O, input is borrowed and never modified
//! - Never fails; short argument lists yield whatever prefix of fields exists
//! - Verb matching is case-insensitive against a fixed table

pub mod table;

use std::fmt;

use serde::Serialize;

use crate::protocol::Command;
use table::{lookup, CommandFamily};

/// Metric label for verbs outside the command table.
pub const OTHER_LABEL: &str = "OTHER";

/// Value of a classified field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Str(String),
    List(Vec<String>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => f.write_str(s),
            FieldValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// One named observability field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedField {
    pub name: &'static str,
    pub value: FieldValue,
}

impl ClassifiedField {
    fn str(name: &'static str, value: &str) -> Self {
        Self {
            name,
            value: FieldValue::Str(value.to_string()),
        }
    }

    fn list(name: &'static str, values: Vec<String>) -> Self {
        Self {
            name,
            value: FieldValue::List(values),
        }
    }
}

/// Derive the observability fields for a command.
pub fn classify(command: &Command) -> Vec<ClassifiedField> {
    let args = command.args.as_slice();
    if args.is_empty() {
        return Vec::new();
    }

    let Some((_, family)) = lookup(&command.name) else {
        return vec![ClassifiedField::list("args", args.to_vec())];
    };

    let mut fields = Vec::with_capacity(4);
    match family {
        CommandFamily::Set => {
            fields.push(ClassifiedField::str("key", &args[0]));
            if let Some(value) = args.get(1) {
                fields.push(ClassifiedField::str("value", value));
            }
            let options = set_options(args.get(2..).unwrap_or_default());
            if !options.is_empty() {
                fields.push(ClassifiedField::list("options", options));
            }
        }
        CommandFamily::MultiKey => {
            fields.push(ClassifiedField::list("keys", args.to_vec()));
        }
        CommandFamily::SingleKey => {
            fields.push(ClassifiedField::str("key", &args[0]));
        }
        CommandFamily::Counter => {
            fields.push(ClassifiedField::str("key", &args[0]));
            if let Some(amount) = args.get(1) {
                fields.push(ClassifiedField::str("amount", amount));
            }
        }
        CommandFamily::Hash => {
            fields.push(ClassifiedField::str("key", &args[0]));
            if let Some(field) = args.get(1) {
                fields.push(ClassifiedField::str("field", field));
            }
            if let Some(value) = args.get(2) {
                fields.push(ClassifiedField::str("value", value));
            }
        }
        CommandFamily::ListPush => {
            fields.push(ClassifiedField::str("key", &args[0]));
            if args.len() > 1 {
                fields.push(ClassifiedField::list("values", args[1..].to_vec()));
            }
        }
        CommandFamily::SetMembers => {
            fields.push(ClassifiedField::str("key", &args[0]));
            if args.len() > 1 {
                fields.push(ClassifiedField::list("members", args[1..].to_vec()));
            }
        }
        CommandFamily::SetSample => {
            fields.push(ClassifiedField::str("key", &args[0]));
            if let Some(count) = args.get(1) {
                fields.push(ClassifiedField::str("count", count));
            }
        }
        CommandFamily::SortedSetAdd => {
            fields.push(ClassifiedField::str("key", &args[0]));
            let pairs: Vec<String> = args[1..]
                .chunks_exact(2)
                .map(|pair| format!("{}={}", pair[0], pair[1]))
                .collect();
            if !pairs.is_empty() {
                fields.push(ClassifiedField::list("score_member_pairs", pairs));
            }
        }
    }
    fields
}

/// Bounded metric label: the canonical verb if known, otherwise [`OTHER_LABEL`].
pub fn metric_label(name: &str) -> &'static str {
    lookup(name).map(|(verb, _)| verb).unwrap_or(OTHER_LABEL)
}

/// Scan `SET` trailing arguments for recognised options.
///
/// Unrecognised tokens are skipped, as is a value-taking option with no value.
fn set_options(rest: &[String]) -> Vec<String> {
    let mut options = Vec::new();
    let mut tokens = rest.iter();
    while let Some(token) = tokens.next() {
        let upper = token.to_ascii_uppercase();
        match upper.as_str() {
            "EX" | "PX" | "EXAT" | "PXAT" => {
                if let Some(value) = tokens.next() {
                    options.push(format!("{}={}", upper, value));
                }
            }
            "NX" | "XX" | "KEEPTTL" => options.push(upper),
            _ => {}
        }
    }
    options
}
