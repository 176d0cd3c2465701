//! cmder - chat-command interpreter for robots.
//!
//! A chat line such as `/greet -lang en Ada` is turned into a reply string:
//!
//! - [`tokenizer`] splits the line shell-style (quotes, backslash escapes)
//! - [`options`] declares typed flags and coerces them into a command's
//!   options value
//! - [`registry`] holds the commands, [`Cmder::exec`] dispatches a line
//! - [`qa`] adapts chat events (single, group, team post) to the interpreter
//!
//! ```
//! use cmder::{Cmder, Handler};
//!
//! let mut cmder = Cmder::new("/");
//! cmder
//!     .register("ping", "liveness check", Handler::no_input(|| "pong".to_string()))
//!     .unwrap();
//!
//! assert_eq!(cmder.exec("/ping"), "pong");
//! assert_eq!(cmder.exec("ping"), "");
//! assert!(cmder.exec("/unknown").starts_with("Commands:\n"));
//! ```

pub mod builtins;
pub mod config;
mod dispatch;
pub mod error;
pub mod options;
pub mod qa;
pub mod registry;
pub mod tokenizer;

pub use config::CmderConfig;
pub use error::{OptionError, RegisterError, SchemaError, TokenizeError};
pub use options::{FieldSpec, OptionField, OptionKind, OptionMap, OptionSchema, OptionValue};
pub use qa::{Answer, Conversation, QaOptions, Question, Replier, Responder};
pub use registry::{Cmder, Command, Handler, HandlerShape};
pub use tokenizer::tokenize;
