//! Line dispatch: prefix check, tokenizing, command lookup, usage fallback.

use std::fmt::Write as _;

use tracing::debug;

use crate::registry::Cmder;
use crate::tokenizer::tokenize;

impl Cmder {
    /// Interpret one chat line and return the reply.
    ///
    /// - a line without the prefix is not a command: empty reply
    /// - a malformed line (open quote, trailing `\`) replies with the error
    /// - a bare prefix or an unknown command replies with [`usage`](Self::usage)
    /// - otherwise the command's handler output is returned unchanged; an
    ///   empty string means "do not reply"
    pub fn exec(&self, line: &str) -> String {
        let Some(rest) = line.strip_prefix(self.prefix.as_str()) else {
            return String::new();
        };

        let tokens = match tokenize(rest.trim()) {
            Ok(tokens) => tokens,
            Err(e) => {
                debug!(error = %e, "malformed command line");
                return e.to_string();
            }
        };

        let Some((name, args)) = tokens.split_first() else {
            return self.usage();
        };

        match self.get(name) {
            Some(command) => {
                debug!(command = %name, args = args.len(), "dispatching command");
                command.call(args)
            }
            None => {
                debug!(command = %name, "unknown command, replying with usage");
                self.usage()
            }
        }
    }

    /// Listing of every command with its description and usage, in
    /// registration order.
    pub fn usage(&self) -> String {
        let mut out = String::from("Commands:\n");
        for command in &self.commands {
            let _ = write!(
                out,
                "\n{}{}: {}\n",
                self.prefix, command.name, command.description
            );
            if !command.usage.is_empty() {
                out.push_str("usage:\n");
                out.push_str(&command.usage);
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::options::{OptionField, OptionSchema};
    use crate::registry::{Cmder, Handler};

    #[derive(Default)]
    struct LangOptions {
        lang: String,
    }

    fn sample() -> Cmder {
        let mut cmder = Cmder::new("/");
        cmder
            .register("now", "now time", Handler::no_input(|| "noon".to_string()))
            .unwrap();
        cmder
            .register("echo", "", Handler::positional(|args| args.join(" ")))
            .unwrap();
        cmder
            .register(
                "greet",
                "greet users",
                Handler::options_with_args(
                    OptionSchema::builder().field(
                        OptionField::string("lang", |o: &mut LangOptions, v| o.lang = v)
                            .default("cn")
                            .usage("language"),
                    ),
                    |o: LangOptions, args: &[String]| format!("[{}] {}", o.lang, args.join(" ")),
                ),
            )
            .unwrap();
        cmder
            .register("quiet", "never replies", Handler::no_input(String::new))
            .unwrap();
        cmder
    }

    #[test]
    fn test_non_command_lines_are_ignored() {
        let cmder = sample();
        assert_eq!(cmder.exec("hello there"), "");
        assert_eq!(cmder.exec(" /echo hi"), "");
        assert_eq!(cmder.exec(""), "");
    }

    #[test]
    fn test_dispatch_to_handler() {
        let cmder = sample();
        assert_eq!(cmder.exec("/now"), "noon");
        assert_eq!(cmder.exec("/ echo  'a  b'  c "), "a  b c");
        assert_eq!(cmder.exec("/greet -lang en Ada"), "[en] Ada");
        assert_eq!(cmder.exec("/greet Ada"), "[cn] Ada");
    }

    #[test]
    fn test_empty_reply_passes_through() {
        assert_eq!(sample().exec("/quiet"), "");
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let cmder = sample();
        assert_eq!(cmder.exec("/Echo hi"), cmder.usage());
    }

    #[test]
    fn test_unknown_command_is_usage() {
        let cmder = sample();
        assert_eq!(cmder.exec("/nope"), cmder.exec("/"));
        assert_eq!(cmder.exec("/   "), cmder.usage());
    }

    #[test]
    fn test_usage_listing() {
        let expected = "Commands:\n\
            \n/now: now time\n\
            \n/echo: \nusage:\n  /echo [args ...]\n\
            \n/greet: greet users\nusage:\n  /greet options [args ...]\noptions:\n  -lang string language (default: cn)\n\
            \n/quiet: never replies\n";
        assert_eq!(sample().usage(), expected);
    }

    #[test]
    fn test_tokenize_error_is_reply() {
        let cmder = sample();
        assert_eq!(
            cmder.exec("/echo 'abc"),
            "parse token: pos 5: not closed single quotation mark('): 'abc"
        );
        assert_eq!(
            cmder.exec("/echo abc\\"),
            "parse token: pos 8: unexpected end of line(\\)"
        );
    }

    #[test]
    fn test_option_error_is_reply() {
        assert_eq!(sample().exec("/greet -lang"), "lang: miss param");
    }

    #[test]
    fn test_exec_is_idempotent() {
        let cmder = sample();
        let line = "/greet -lang=en \"Grace Hopper\"";
        assert_eq!(cmder.exec(line), cmder.exec(line));
    }

    #[test]
    fn test_multichar_and_empty_prefix() {
        let mut bang = Cmder::new("!!");
        bang.register("ping", "", Handler::no_input(|| "pong".to_string()))
            .unwrap();
        assert_eq!(bang.exec("!!ping"), "pong");
        assert_eq!(bang.exec("!ping"), "");

        let mut bare = Cmder::new("");
        bare.register("ping", "", Handler::no_input(|| "pong".to_string()))
            .unwrap();
        assert_eq!(bare.exec("  ping  "), "pong");
    }

    #[test]
    fn test_concurrent_exec() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut cmder = Cmder::new("/");
        let counter = Arc::clone(&calls);
        cmder
            .register(
                "count",
                "",
                Handler::positional(move |args| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    args.len().to_string()
                }),
            )
            .unwrap();
        let cmder = Arc::new(cmder);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cmder = Arc::clone(&cmder);
                std::thread::spawn(move || cmder.exec(&format!("/count {}", "x ".repeat(i))))
            })
            .collect();
        let replies: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(calls.load(Ordering::SeqCst), 8);
        for (i, reply) in replies.iter().enumerate() {
            assert_eq!(reply, &i.to_string());
        }
    }
}
