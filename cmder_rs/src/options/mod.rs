//! Typed, flag-based command options.
//!
//! An [`OptionSchema`] is declared once per command with one
//! [`OptionField`] per flag. Each field pairs a flag name and a kind with a
//! setter that writes the coerced value into the command's options type:
//!
//! ```
//! use cmder::options::{OptionField, OptionSchema};
//!
//! #[derive(Default)]
//! struct Opts {
//!     count: i64,
//!     verbose: bool,
//! }
//!
//! let schema = OptionSchema::builder()
//!     .field(OptionField::int("n", |o: &mut Opts, v| o.count = v).default("3"))
//!     .field(OptionField::boolean("v", |o: &mut Opts, v| o.verbose = v))
//!     .build()
//!     .unwrap();
//!
//! let tokens: Vec<String> = ["-v", "file.txt"].iter().map(|s| s.to_string()).collect();
//! let (opts, rest) = schema.parse(&tokens).unwrap();
//! assert_eq!(opts.count, 3);
//! assert!(opts.verbose);
//! assert_eq!(rest, ["file.txt"]);
//! ```
//!
//! Data-driven commands can use [`FieldSpec`] tables and [`OptionMap`]
//! instead of a dedicated struct.

mod coerce;
mod duration;
mod table;
mod timestamp;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{OptionError, SchemaError};

pub use coerce::coerce;
pub use duration::parse_duration;
pub use table::{FieldSpec, OptionMap};
pub use timestamp::parse_timestamp;

/// Value type of an option flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Int,
    Uint,
    Str,
    Float,
    Bool,
    Duration,
    Timestamp,
}

impl OptionKind {
    /// Name shown in usage text and error messages.
    pub fn name(self) -> &'static str {
        match self {
            OptionKind::Int => "int",
            OptionKind::Uint => "uint",
            OptionKind::Str => "string",
            OptionKind::Float => "float",
            OptionKind::Bool => "bool",
            OptionKind::Duration => "duration",
            OptionKind::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OptionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" | "integer" | "i64" => Ok(OptionKind::Int),
            "uint" | "unsigned" | "u64" => Ok(OptionKind::Uint),
            "string" | "str" => Ok(OptionKind::Str),
            "float" | "f64" => Ok(OptionKind::Float),
            "bool" | "boolean" => Ok(OptionKind::Bool),
            "duration" => Ok(OptionKind::Duration),
            "timestamp" | "time" => Ok(OptionKind::Timestamp),
            other => Err(other.to_string()),
        }
    }
}

/// A coerced option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Int(i64),
    Uint(u64),
    Str(String),
    Float(f64),
    Bool(bool),
    Duration(TimeDelta),
    Timestamp(DateTime<Utc>),
}

type Setter<O> = Box<dyn Fn(&mut O, OptionValue) + Send + Sync>;

/// Declaration of one flag.
pub struct OptionField<O> {
    flag: String,
    kind: OptionKind,
    default: Option<String>,
    usage: Option<String>,
    set: Setter<O>,
}

macro_rules! typed_field {
    ($(#[$doc:meta])* $ctor:ident, $kind:ident, $variant:ident, $ty:ty) => {
        $(#[$doc])*
        pub fn $ctor(
            flag: impl Into<String>,
            set: impl Fn(&mut O, $ty) + Send + Sync + 'static,
        ) -> Self {
            Self::new(
                flag,
                OptionKind::$kind,
                Box::new(move |opts, value| {
                    if let OptionValue::$variant(v) = value {
                        set(opts, v)
                    }
                }),
            )
        }
    };
}

impl<O: 'static> OptionField<O> {
    fn new(flag: impl Into<String>, kind: OptionKind, set: Setter<O>) -> Self {
        Self {
            flag: flag.into(),
            kind,
            default: None,
            usage: None,
            set,
        }
    }

    typed_field!(
        /// Signed 64-bit integer flag.
        int, Int, Int, i64
    );
    typed_field!(
        /// Unsigned 64-bit integer flag.
        uint, Uint, Uint, u64
    );
    typed_field!(
        /// Free-text flag.
        string, Str, Str, String
    );
    typed_field!(float, Float, Float, f64);
    typed_field!(
        /// Switch; `-flag`, `-flag true|false` or `-flag=true|false`.
        ///
        /// A default must be exactly `true` or `false`; anything else (such
        /// as `"yes"`) makes [`OptionSchemaBuilder::build`] fail.
        boolean, Bool, Bool, bool
    );
    typed_field!(
        /// Compound duration such as `1h30m`.
        duration, Duration, Duration, TimeDelta
    );
    typed_field!(
        /// Date/time in one of the accepted layouts, or epoch seconds.
        timestamp, Timestamp, Timestamp, DateTime<Utc>
    );

    /// Field of a kind chosen at runtime; the setter receives the raw
    /// [`OptionValue`].
    pub fn dynamic(
        flag: impl Into<String>,
        kind: OptionKind,
        set: impl Fn(&mut O, OptionValue) + Send + Sync + 'static,
    ) -> Self {
        Self::new(flag, kind, Box::new(set))
    }

    /// Raw default, coerced when the schema is built.
    pub fn default(mut self, raw: impl Into<String>) -> Self {
        self.default = Some(raw.into());
        self
    }

    pub fn usage(mut self, text: impl Into<String>) -> Self {
        self.usage = Some(text.into());
        self
    }
}

/// Collects field declarations; [`build`](Self::build) validates them.
pub struct OptionSchemaBuilder<O> {
    fields: Vec<OptionField<O>>,
}

impl<O> OptionSchemaBuilder<O> {
    pub fn field(mut self, field: OptionField<O>) -> Self {
        self.fields.push(field);
        self
    }

    /// Validate declarations and coerce every default.
    ///
    /// Leading dashes in flag names are ignored, so `"-lang"` and `"lang"`
    /// declare the same flag.
    pub fn build(self) -> Result<OptionSchema<O>, SchemaError> {
        let mut fields = Vec::with_capacity(self.fields.len());
        let mut index = HashMap::new();

        for decl in self.fields {
            let flag = decl.flag.trim_start_matches('-').to_string();
            if flag.is_empty() {
                return Err(SchemaError::EmptyFlag);
            }
            if index.contains_key(&flag) {
                return Err(SchemaError::DuplicateFlag(flag));
            }

            let default = match decl.default {
                Some(raw) => {
                    let value =
                        coerce(decl.kind, &raw).map_err(|reason| SchemaError::InvalidDefault {
                            flag: flag.clone(),
                            value: raw.clone(),
                            reason,
                        })?;
                    Some((raw, value))
                }
                None => None,
            };

            index.insert(flag.clone(), fields.len());
            fields.push(BoundField {
                flag,
                kind: decl.kind,
                default,
                usage: decl.usage.unwrap_or_default(),
                set: decl.set,
            });
        }

        Ok(OptionSchema { fields, index })
    }
}

struct BoundField<O> {
    flag: String,
    kind: OptionKind,
    /// Raw text (for usage) and its coerced value.
    default: Option<(String, OptionValue)>,
    usage: String,
    set: Setter<O>,
}

impl<O> BoundField<O> {
    fn coerce(&self, raw: &str) -> Result<OptionValue, OptionError> {
        coerce(self.kind, raw).map_err(|reason| OptionError::InvalidValue {
            flag: self.flag.clone(),
            kind: self.kind.name(),
            value: raw.to_string(),
            reason,
        })
    }

    /// Bind `-flag` followed by `rest`; returns how many tokens of `rest`
    /// were consumed.
    fn bind_separate(&self, opts: &mut O, rest: &[String]) -> Result<usize, OptionError> {
        if self.kind == OptionKind::Bool {
            let (value, used) = match rest.first().map(String::as_str) {
                Some("true") => (true, 1),
                Some("false") => (false, 1),
                _ => (true, 0),
            };
            (self.set)(opts, OptionValue::Bool(value));
            return Ok(used);
        }

        let Some(raw) = rest.first() else {
            return Err(OptionError::MissingValue {
                flag: self.flag.clone(),
            });
        };
        (self.set)(opts, self.coerce(raw)?);
        Ok(1)
    }

    /// Bind `-flag=value`.
    fn bind_inline(&self, opts: &mut O, raw: &str) -> Result<(), OptionError> {
        let value = if self.kind == OptionKind::Bool {
            OptionValue::Bool(coerce::inline_bool(raw))
        } else {
            self.coerce(raw)?
        };
        (self.set)(opts, value);
        Ok(())
    }

    fn usage_line(&self) -> String {
        match &self.default {
            Some((raw, _)) => format!(
                "  -{} {} {} (default: {})",
                self.flag, self.kind, self.usage, raw
            ),
            None => format!("  -{} {} {}", self.flag, self.kind, self.usage),
        }
    }
}

/// Validated set of flags for one command.
pub struct OptionSchema<O> {
    fields: Vec<BoundField<O>>,
    index: HashMap<String, usize>,
}

impl<O> OptionSchema<O> {
    pub fn builder() -> OptionSchemaBuilder<O> {
        OptionSchemaBuilder { fields: Vec::new() }
    }

    fn lookup(&self, flag: &str) -> Option<&BoundField<O>> {
        self.index.get(flag).map(|&i| &self.fields[i])
    }

    /// Declared flag names in declaration order.
    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.flag.as_str())
    }

    /// One line per flag, in declaration order.
    pub fn usage(&self) -> String {
        self.fields
            .iter()
            .map(BoundField::usage_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Bind `tokens` into a fresh options value with defaults applied.
    ///
    /// Tokens that are neither a known flag nor a flag's value are returned
    /// as positional arguments, in order. Unknown `-flags` are positional
    /// too.
    pub fn parse(&self, tokens: &[String]) -> Result<(O, Vec<String>), OptionError>
    where
        O: Default,
    {
        let mut opts = O::default();
        for field in &self.fields {
            if let Some((_, value)) = &field.default {
                (field.set)(&mut opts, value.clone());
            }
        }

        let mut positional = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            i += 1;
            if !token.starts_with('-') {
                positional.push(token.clone());
                continue;
            }

            let name = token.trim_start_matches('-');
            if let Some(eq) = name.find('=').filter(|&eq| eq > 0) {
                match self.lookup(&name[..eq]) {
                    Some(field) => field.bind_inline(&mut opts, &name[eq + 1..])?,
                    None => positional.push(token.clone()),
                }
                continue;
            }

            match self.lookup(name) {
                Some(field) => i += field.bind_separate(&mut opts, &tokens[i..])?,
                None => positional.push(token.clone()),
            }
        }

        Ok((opts, positional))
    }
}

impl<O> fmt::Debug for OptionSchema<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.flags()).finish()
    }
}
