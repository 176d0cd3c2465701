//! Question/answer bridge between chat events and the interpreter.
//!
//! The transport (webhook server, robot client) stays outside this crate.
//! A host converts each inbound message into a [`Question`], asks the
//! [`Responder`] for an [`Answer`], and hands it to its [`Replier`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Where a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conversation {
    /// One-to-one chat with the robot.
    Single,
    Group,
    /// Post (or reply) in a team channel. Rendered as HTML.
    TeamPost,
}

/// An inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub conversation: Conversation,
    pub text: String,
    /// The robot was mentioned.
    #[serde(default)]
    pub at_me: bool,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub message_id: String,
}

impl Question {
    pub fn new(conversation: Conversation, text: impl Into<String>) -> Self {
        Self {
            conversation,
            text: text.into(),
            at_me: false,
            sender: String::new(),
            message_id: String::new(),
        }
    }
}

/// Reply produced for a [`Question`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub text: String,
    /// Account to mention in the reply.
    pub mention: Option<String>,
    /// Message id to quote in the reply.
    pub quote: Option<String>,
}

/// Answering policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QaOptions {
    /// In groups and team posts, only answer when the robot is mentioned.
    pub only_at_me: bool,
    /// In groups and team posts, strip `@<robot_name> ` before answering.
    pub trim_at_me: bool,
    pub robot_name: String,
    /// In groups and team posts, mention the asker in the reply.
    pub at_questioner: bool,
    /// In single and group chats, quote the question in the reply.
    pub reference: bool,
}

/// Sends answers back through the chat transport.
pub trait Replier: Send + Sync {
    fn reply(&self, question: &Question, answer: &Answer) -> anyhow::Result<()>;
}

/// Question → answer function, normally [`Cmder::exec`](crate::Cmder::exec).
pub type Qa = Arc<dyn Fn(&str) -> String + Send + Sync>;

pub struct Responder {
    qa: Qa,
    options: QaOptions,
    replier: Arc<dyn Replier>,
}

impl Responder {
    pub fn new(qa: Qa, options: QaOptions, replier: Arc<dyn Replier>) -> Self {
        Self {
            qa,
            options,
            replier,
        }
    }

    pub fn options(&self) -> &QaOptions {
        &self.options
    }

    /// Decide whether and what to answer. `None` means stay silent.
    pub fn answer(&self, question: &Question) -> Option<Answer> {
        if question.text.is_empty() {
            return None;
        }

        let shared = question.conversation != Conversation::Single;
        if shared && self.options.only_at_me && !question.at_me {
            debug!(message_id = %question.message_id, "ignoring message without mention");
            return None;
        }

        let text = if shared {
            self.trim_at_me(&question.text)
        } else {
            question.text.clone()
        };

        let mut reply = (self.qa)(&text);
        if reply.is_empty() {
            return None;
        }
        if question.conversation == Conversation::TeamPost {
            reply = reply.replace('\n', "<br/>");
        }

        let mention = (shared && self.options.at_questioner && !question.sender.is_empty())
            .then(|| question.sender.clone());
        let quote = (question.conversation != Conversation::TeamPost
            && self.options.reference
            && !question.message_id.is_empty())
        .then(|| question.message_id.clone());

        Some(Answer {
            text: reply,
            mention,
            quote,
        })
    }

    /// Send `answer` through the replier. Delivery failures are logged, not
    /// returned: the question has been handled either way.
    pub fn deliver(&self, question: &Question, answer: &Answer) {
        if let Err(e) = self.replier.reply(question, answer) {
            warn!(
                message_id = %question.message_id,
                question = ?question.text,
                answer = ?answer.text,
                "reply failed: {e:#}"
            );
        }
    }

    /// [`answer`](Self::answer) then [`deliver`](Self::deliver).
    pub fn respond(&self, question: &Question) -> Option<Answer> {
        let answer = self.answer(question)?;
        self.deliver(question, &answer);
        Some(answer)
    }

    fn trim_at_me(&self, text: &str) -> String {
        if !self.options.trim_at_me || self.options.robot_name.is_empty() {
            return text.to_string();
        }
        text.replace(&format!("@{} ", self.options.robot_name), "")
    }
}
