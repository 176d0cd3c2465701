//! # cmder
//!
//! Console host for the chat-command interpreter. Every stdin line is one
//! chat message; replies go to stdout in input order, logs go to stderr.
//!
//! ```bash
//! echo '/greet -lang en Ada' | cmder
//! cmder --conversation group --robot-name bot --prefix '!'
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use cmder::builtins::register_builtins;
use cmder::config::DEFAULT_CONFIG_FILE;
use cmder::qa::Qa;
use cmder::{Answer, Cmder, CmderConfig, Conversation, Question, Replier, Responder};

#[derive(Parser, Debug)]
#[command(name = "cmder")]
#[command(about = "Chat-command interpreter reading messages from stdin")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Command prefix, overrides the config file
    #[arg(long)]
    prefix: Option<String>,

    /// Robot name used for mentions, overrides the config file
    #[arg(long)]
    robot_name: Option<String>,

    /// Account name attached to every message
    #[arg(long, default_value = "console")]
    sender: String,

    /// Conversation kind the messages are treated as
    #[arg(long, value_enum, default_value_t = ConversationArg::Single)]
    conversation: ConversationArg,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ConversationArg {
    Single,
    Group,
    Team,
}

impl From<ConversationArg> for Conversation {
    fn from(arg: ConversationArg) -> Self {
        match arg {
            ConversationArg::Single => Conversation::Single,
            ConversationArg::Group => Conversation::Group,
            ConversationArg::Team => Conversation::TeamPost,
        }
    }
}

/// Prints answers to stdout, one reply per block.
struct StdoutReplier;

impl Replier for StdoutReplier {
    fn reply(&self, _question: &Question, answer: &Answer) -> Result<()> {
        let mut out = std::io::stdout().lock();
        if let Some(who) = &answer.mention {
            write!(out, "@{who} ")?;
        }
        writeln!(out, "{}", answer.text)?;
        out.flush()?;
        Ok(())
    }
}

type Pending = (Question, JoinHandle<Option<Answer>>);

async fn run() -> Result<()> {
    let args = Args::parse();

    // stdout carries replies only
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.parse().unwrap_or_default()),
        )
        .init();

    let mut config = CmderConfig::load_from_path(&args.config);
    if let Some(prefix) = args.prefix {
        config.prefix = prefix;
    }
    if let Some(name) = args.robot_name {
        config.qa.robot_name = name;
    }

    let mut cmder = Cmder::new(config.prefix.clone());
    register_builtins(&mut cmder).context("failed to register built-in commands")?;
    info!(
        "Starting cmder v{} with {} commands (prefix {:?})",
        env!("CARGO_PKG_VERSION"),
        cmder.len(),
        cmder.prefix()
    );

    let cmder = Arc::new(cmder);
    let qa: Qa = Arc::new(move |line: &str| cmder.exec(line));
    let responder = Arc::new(Responder::new(qa, config.qa, Arc::new(StdoutReplier)));

    let (tx, mut rx) = mpsc::unbounded_channel::<Pending>();
    let printer = {
        let responder = Arc::clone(&responder);
        tokio::spawn(async move {
            while let Some((question, handle)) = rx.recv().await {
                match handle.await {
                    Ok(Some(answer)) => responder.deliver(&question, &answer),
                    Ok(None) => {}
                    Err(e) => warn!(message_id = %question.message_id, "answer task failed: {e}"),
                }
            }
        })
    };

    let conversation = Conversation::from(args.conversation);
    let mention = format!("@{}", responder.options().robot_name);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_no: u64 = 0;

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        line_no += 1;
        let mut question = Question::new(conversation, line);
        question.at_me = mention.len() > 1 && question.text.contains(&mention);
        question.sender = args.sender.clone();
        question.message_id = line_no.to_string();
        if let Ok(json) = serde_json::to_string(&question) {
            debug!(question = %json, "received");
        }

        let handle = {
            let responder = Arc::clone(&responder);
            let question = question.clone();
            tokio::spawn(async move { responder.answer(&question) })
        };
        if tx.send((question, handle)).is_err() {
            break;
        }
    }

    drop(tx);
    printer.await.context("printer task failed")?;
    debug!(lines = line_no, "stdin closed");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[cmder] Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
