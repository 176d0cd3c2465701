//! Declarative option tables for commands without a dedicated options type.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

use super::{OptionField, OptionKind, OptionSchema, OptionValue};
use crate::error::SchemaError;

/// One row of an option table. `kind` is a type name such as `"int"` or
/// `"duration"`, checked when the schema is built.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldSpec {
    pub flag: String,
    pub kind: String,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub usage: Option<String>,
}

impl FieldSpec {
    pub fn new(flag: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            flag: flag.into(),
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_default(mut self, raw: impl Into<String>) -> Self {
        self.default = Some(raw.into());
        self
    }

    pub fn with_usage(mut self, text: impl Into<String>) -> Self {
        self.usage = Some(text.into());
        self
    }
}

/// Option values keyed by flag name. Only flags that were given or have a
/// default are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionMap {
    values: BTreeMap<String, OptionValue>,
}

impl OptionMap {
    pub fn get(&self, flag: &str) -> Option<&OptionValue> {
        self.values.get(flag)
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.values.contains_key(flag)
    }

    pub fn int(&self, flag: &str) -> Option<i64> {
        match self.get(flag)? {
            OptionValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn uint(&self, flag: &str) -> Option<u64> {
        match self.get(flag)? {
            OptionValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn float(&self, flag: &str) -> Option<f64> {
        match self.get(flag)? {
            OptionValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn str(&self, flag: &str) -> Option<&str> {
        match self.get(flag)? {
            OptionValue::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Absent switches read as `false`.
    pub fn flag(&self, flag: &str) -> bool {
        matches!(self.get(flag), Some(OptionValue::Bool(true)))
    }

    pub fn duration(&self, flag: &str) -> Option<TimeDelta> {
        match self.get(flag)? {
            OptionValue::Duration(v) => Some(*v),
            _ => None,
        }
    }

    pub fn timestamp(&self, flag: &str) -> Option<DateTime<Utc>> {
        match self.get(flag)? {
            OptionValue::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    fn insert(&mut self, flag: &str, value: OptionValue) {
        self.values.insert(flag.to_string(), value);
    }
}

impl OptionSchema<OptionMap> {
    /// Build a schema from a table of field specs.
    pub fn from_table(specs: &[FieldSpec]) -> Result<Self, SchemaError> {
        let mut builder = OptionSchema::builder();
        for spec in specs {
            let flag = spec.flag.trim_start_matches('-').to_string();
            let kind: OptionKind = spec
                .kind
                .parse()
                .map_err(|kind| SchemaError::UnsupportedKind {
                    flag: flag.clone(),
                    kind,
                })?;

            let key = flag.clone();
            let mut field = OptionField::dynamic(flag, kind, move |map: &mut OptionMap, value| {
                map.insert(&key, value)
            });
            if let Some(raw) = &spec.default {
                field = field.default(raw.clone());
            }
            if let Some(text) = &spec.usage {
                field = field.usage(text.clone());
            }
            builder = builder.field(field);
        }
        builder.build()
    }
}
