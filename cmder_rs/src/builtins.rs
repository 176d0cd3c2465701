//! Demo commands shipped with the console host.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Local, TimeDelta, Utc};

use crate::error::RegisterError;
use crate::options::{OptionField, OptionSchema};
use crate::registry::{Cmder, Handler};

#[derive(Debug, Default)]
struct GreetOptions {
    language: String,
}

fn greet(opts: GreetOptions, names: &[String]) -> String {
    if names.is_empty() {
        return "argument error: at least one name is required".to_string();
    }
    if opts.language == "en" {
        return format!("Hello {}!", names.join(", "));
    }
    if let [name] = names {
        return format!("{name}你好！");
    }
    format!("{}，你们好！", names.join("，"))
}

fn now() -> String {
    let now = Local::now();
    format!(
        "{}\nunix timestamp: {}",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        now.timestamp()
    )
}

#[derive(Debug, Default)]
struct Base64Options {
    decode: bool,
}

fn base64_command(opts: Base64Options, texts: &[String]) -> String {
    let convert = |text: &str| -> Result<String, String> {
        if opts.decode {
            STANDARD
                .decode(text)
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .map_err(|e| e.to_string())
        } else {
            Ok(STANDARD.encode(text))
        }
    };

    match texts {
        [] => "argument error: missing text to encode/decode".to_string(),
        [text] => convert(text).unwrap_or_else(|e| e),
        _ => texts
            .iter()
            .enumerate()
            .map(|(i, text)| match convert(text) {
                Ok(out) => format!("{}: {}", i + 1, out),
                Err(e) => format!("{}: {}", i + 1, e),
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[derive(Debug, Default)]
struct ShiftOptions {
    from: DateTime<Utc>,
    by: TimeDelta,
}

fn shift(opts: ShiftOptions) -> String {
    match opts.from.checked_add_signed(opts.by) {
        Some(ts) => ts.to_rfc3339(),
        None => "argument error: result out of range".to_string(),
    }
}

/// Register `greet`, `now`, `base64`, `echo` and `shift`.
pub fn register_builtins(cmder: &mut Cmder) -> Result<(), RegisterError> {
    cmder.register(
        "greet",
        "greet users",
        Handler::options_with_args(
            OptionSchema::builder().field(
                OptionField::string("lang", |o: &mut GreetOptions, v| o.language = v)
                    .default("cn")
                    .usage("reply language, cn or en"),
            ),
            greet,
        ),
    )?;

    cmder.register("now", "now time", Handler::no_input(now))?;

    cmder.register(
        "base64",
        "base64 encoding text",
        Handler::options_with_args(
            OptionSchema::builder().field(
                OptionField::boolean("d", |o: &mut Base64Options, v| o.decode = v)
                    .usage("decode the text"),
            ),
            base64_command,
        ),
    )?;

    cmder.register(
        "echo",
        "repeat the arguments",
        Handler::positional(|args| args.join(" ")),
    )?;

    cmder.register(
        "shift",
        "add a duration to a timestamp",
        Handler::options(
            OptionSchema::builder()
                .field(
                    OptionField::timestamp("from", |o: &mut ShiftOptions, v| o.from = v)
                        .default("0")
                        .usage("start time"),
                )
                .field(
                    OptionField::duration("by", |o: &mut ShiftOptions, v| o.by = v)
                        .default("0s")
                        .usage("offset such as 1h30m"),
                ),
            shift,
        ),
    )?;

    Ok(())
}
