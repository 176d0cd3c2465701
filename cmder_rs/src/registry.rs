//! Command registry.
//!
//! Every command is registered once, at startup, under an explicit name.
//! Handlers come in four shapes, picked at the call site through the
//! [`Handler`] constructors; registration folds all of them into the same
//! `Fn(&[String]) -> String` adapter so dispatch never cares which shape it
//! is calling.
//!
//! ```
//! use cmder::{Cmder, Handler};
//!
//! let mut cmder = Cmder::new("/");
//! cmder
//!     .register("echo", "repeat the arguments", Handler::positional(|args| args.join(" ")))
//!     .unwrap();
//! assert_eq!(cmder.exec("/echo hi there"), "hi there");
//! ```

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::{RegisterError, SchemaError};
use crate::options::OptionSchemaBuilder;

/// Normalized calling convention shared by every command.
pub(crate) type Adapter = Box<dyn Fn(&[String]) -> String + Send + Sync>;

/// Parameter structure a handler was registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerShape {
    /// `fn() -> String`
    NoInput,
    /// `fn(&[String]) -> String`
    Positional,
    /// `fn(Options) -> String`
    Options,
    /// `fn(Options, &[String]) -> String`
    OptionsWithArgs,
}

/// A handler wrapped for registration.
pub struct Handler {
    shape: HandlerShape,
    bound: Result<(Adapter, Option<String>), SchemaError>,
}

impl Handler {
    /// Handler that takes no input. Any arguments are ignored.
    pub fn no_input<F>(f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self {
            shape: HandlerShape::NoInput,
            bound: Ok((Box::new(move |_| f()), None)),
        }
    }

    /// Handler that receives every token after the command name.
    pub fn positional<F>(f: F) -> Self
    where
        F: Fn(&[String]) -> String + Send + Sync + 'static,
    {
        Self {
            shape: HandlerShape::Positional,
            bound: Ok((Box::new(f), None)),
        }
    }

    /// Handler that receives parsed options. Leftover positional tokens are
    /// dropped.
    pub fn options<O, F>(schema: OptionSchemaBuilder<O>, f: F) -> Self
    where
        O: Default + 'static,
        F: Fn(O) -> String + Send + Sync + 'static,
    {
        Self::with_schema(HandlerShape::Options, schema, move |opts, _| f(opts))
    }

    /// Handler that receives parsed options and the leftover positional
    /// tokens.
    pub fn options_with_args<O, F>(schema: OptionSchemaBuilder<O>, f: F) -> Self
    where
        O: Default + 'static,
        F: Fn(O, &[String]) -> String + Send + Sync + 'static,
    {
        Self::with_schema(HandlerShape::OptionsWithArgs, schema, f)
    }

    fn with_schema<O, F>(shape: HandlerShape, schema: OptionSchemaBuilder<O>, f: F) -> Self
    where
        O: Default + 'static,
        F: Fn(O, &[String]) -> String + Send + Sync + 'static,
    {
        let bound = schema.build().map(|schema| {
            let usage = schema.usage();
            let adapter: Adapter = Box::new(move |tokens| match schema.parse(tokens) {
                Ok((opts, args)) => f(opts, &args),
                Err(e) => e.to_string(),
            });
            (adapter, Some(usage))
        });
        Self { shape, bound }
    }

    pub fn shape(&self) -> HandlerShape {
        self.shape
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("shape", &self.shape)
            .field("valid", &self.bound.is_ok())
            .finish()
    }
}

/// A registered command.
pub struct Command {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) usage: String,
    pub(crate) shape: HandlerShape,
    pub(crate) run: Adapter,
}

impl Command {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Invocation and option lines; empty for handlers without input.
    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn shape(&self) -> HandlerShape {
        self.shape
    }

    /// Run the command with the tokens that followed its name.
    pub fn call(&self, args: &[String]) -> String {
        (self.run)(args)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("shape", &self.shape)
            .finish()
    }
}

/// The interpreter: a command prefix plus the registered commands.
///
/// Build it mutably during startup, then share it (typically behind an
/// `Arc`) for serving; [`exec`](Cmder::exec) only needs `&self`.
pub struct Cmder {
    pub(crate) prefix: String,
    pub(crate) commands: Vec<Command>,
    index: HashMap<String, usize>,
}

impl Cmder {
    /// `prefix` marks a line as a command, e.g. `"/"`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            commands: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Add a command.
    ///
    /// Fails on an empty or already registered name, or when the handler's
    /// option schema is invalid (bad default, duplicate flag, ...).
    /// Registration errors are configuration defects; hosts are expected to
    /// abort startup on them.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: Handler,
    ) -> Result<(), RegisterError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegisterError::EmptyName);
        }
        if self.index.contains_key(&name) {
            return Err(RegisterError::Duplicate(name));
        }

        let (run, option_usage) = handler.bound.map_err(|source| RegisterError::Schema {
            command: name.clone(),
            source,
        })?;

        let invocation = format!("  {}{}", self.prefix, name);
        let usage = match (handler.shape, option_usage) {
            (HandlerShape::NoInput, _) => String::new(),
            (HandlerShape::Positional, _) => format!("{invocation} [args ...]"),
            (HandlerShape::Options, Some(options)) => {
                format!("{invocation} options\noptions:\n{options}")
            }
            (HandlerShape::OptionsWithArgs, Some(options)) => {
                format!("{invocation} options [args ...]\noptions:\n{options}")
            }
            (_, None) => invocation,
        };

        debug!(command = %name, shape = ?handler.shape, "registered command");
        self.index.insert(name.clone(), self.commands.len());
        self.commands.push(Command {
            name,
            description: description.into(),
            usage,
            shape: handler.shape,
            run,
        });
        Ok(())
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.index.get(name).map(|&i| &self.commands[i])
    }

    /// Commands in registration order.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Debug for Cmder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cmder")
            .field("prefix", &self.prefix)
            .field("commands", &self.commands)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{OptionField, OptionSchema};

    #[derive(Default)]
    struct LangOptions {
        lang: String,
    }

    fn lang_schema() -> OptionSchemaBuilder<LangOptions> {
        OptionSchema::builder().field(
            OptionField::string("lang", |o: &mut LangOptions, v| o.lang = v)
                .default("cn")
                .usage("reply language"),
        )
    }

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_register_four_shapes() {
        let mut cmder = Cmder::new("/");
        cmder
            .register("now", "", Handler::no_input(|| "tick".to_string()))
            .unwrap();
        cmder
            .register("echo", "", Handler::positional(|a| a.join(" ")))
            .unwrap();
        cmder
            .register(
                "lang",
                "",
                Handler::options(lang_schema(), |o: LangOptions| o.lang),
            )
            .unwrap();
        cmder
            .register(
                "greet",
                "",
                Handler::options_with_args(lang_schema(), |o: LangOptions, a: &[String]| {
                    format!("{}:{}", o.lang, a.join(","))
                }),
            )
            .unwrap();

        assert_eq!(cmder.len(), 4);
        assert_eq!(cmder.get("now").unwrap().call(&args(&["x"])), "tick");
        assert_eq!(cmder.get("echo").unwrap().call(&args(&["a", "b"])), "a b");
        assert_eq!(
            cmder.get("lang").unwrap().call(&args(&["-lang", "en", "x"])),
            "en"
        );
        assert_eq!(
            cmder.get("greet").unwrap().call(&args(&["a", "-lang=en", "b"])),
            "en:a,b"
        );
    }

    #[test]
    fn test_usage_per_shape() {
        let mut cmder = Cmder::new("/");
        cmder
            .register("now", "", Handler::no_input(String::new))
            .unwrap();
        cmder
            .register("echo", "", Handler::positional(|a| a.join(" ")))
            .unwrap();
        cmder
            .register("lang", "", Handler::options(lang_schema(), |o: LangOptions| o.lang))
            .unwrap();
        cmder
            .register(
                "greet",
                "",
                Handler::options_with_args(lang_schema(), |o: LangOptions, _: &[String]| o.lang),
            )
            .unwrap();

        assert_eq!(cmder.get("now").unwrap().usage(), "");
        assert_eq!(cmder.get("echo").unwrap().usage(), "  /echo [args ...]");
        assert_eq!(
            cmder.get("lang").unwrap().usage(),
            "  /lang options\noptions:\n  -lang string reply language (default: cn)"
        );
        assert_eq!(
            cmder.get("greet").unwrap().usage(),
            "  /greet options [args ...]\noptions:\n  -lang string reply language (default: cn)"
        );
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut cmder = Cmder::new("/");
        cmder
            .register("echo", "", Handler::positional(|a| a.join(" ")))
            .unwrap();
        let err = cmder
            .register("echo", "again", Handler::no_input(String::new))
            .unwrap_err();
        assert_eq!(err, RegisterError::Duplicate("echo".to_string()));
        assert_eq!(cmder.len(), 1);
        assert_eq!(cmder.get("echo").unwrap().shape(), HandlerShape::Positional);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut cmder = Cmder::new("/");
        let err = cmder
            .register("", "", Handler::no_input(String::new))
            .unwrap_err();
        assert_eq!(err, RegisterError::EmptyName);
    }

    #[test]
    fn test_invalid_default_rejected_at_registration() {
        let mut cmder = Cmder::new("/");
        let schema = OptionSchema::builder()
            .field(OptionField::int("n", |o: &mut LangOptions, v| o.lang = v.to_string()).default("many"));
        let err = cmder
            .register("count", "", Handler::options(schema, |o: LangOptions| o.lang))
            .unwrap_err();
        match err {
            RegisterError::Schema { command, source } => {
                assert_eq!(command, "count");
                assert!(matches!(source, SchemaError::InvalidDefault { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(cmder.is_empty());
    }

    #[test]
    fn test_option_error_is_reply() {
        let mut cmder = Cmder::new("/");
        cmder
            .register("lang", "", Handler::options(lang_schema(), |o: LangOptions| o.lang))
            .unwrap();
        assert_eq!(
            cmder.get("lang").unwrap().call(&args(&["-lang"])),
            "lang: miss param"
        );
    }

    #[test]
    fn test_cmder_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Cmder>();
    }
}
