//! # Prompt
//!
//! Composes the single user prompt sent to the model for one question.
//!
//! ## Format
//!
//! Sections in fixed order, separated by a blank line, each only when present:
//!
//! - **Preamble** (optional): instruction text, verbatim
//! - **Recent history**: `Recent conversation history:` + one line per turn, oldest first
//! - **Similar facts**: `Relevant facts from earlier conversations:` + one line per match
//! - **Question**: `User Question: {question}`
//!
//! With no preamble and no context lines the prompt is exactly the raw question.
//!
//! ## External interactions
//!
//! - **AI models**: output is the user message of an OpenAI Chat Completions request;
//!   [`build_messages`] pairs it with the system instructions.

/// Role of a message, one-to-one with OpenAI Chat Completions API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    /// System instruction (API `role: "system"`).
    System,
    /// User message (API `role: "user"`).
    User,
    /// Assistant message (API `role: "assistant"`).
    Assistant,
}

/// A single chat message, one-to-one with one element of OpenAI `messages` array.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// System instructions used when `LLM_SYSTEM_PROMPT` is not set.
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are a UK Real Estate data analyst.\n\
You have access to a local database via 'run_sql_query'.\n\
The table is 'property_prices'.\n\
Always query the database to answer questions about prices, towns, or trends.\n\
Use simple SQL queries.";

/// Section title for recent turns.
pub const SECTION_RECENT: &str = "Recent conversation history:";

/// Section title for gated similarity matches.
pub const SECTION_SIMILAR: &str = "Relevant facts from earlier conversations:";

/// Label in front of the current question when any other section is present.
pub const QUESTION_LABEL: &str = "User Question: ";

fn push_section(sections: &mut Vec<String>, title: &str, lines: Vec<String>) {
    if lines.is_empty() {
        return;
    }
    let mut block = String::from(title);
    for line in lines {
        block.push('\n');
        block.push_str(&line);
    }
    sections.push(block);
}

/// Composes the prompt for `question` from the optional preamble and context lines.
///
/// `recent` is expected oldest first and `similar` most relevant first; both are
/// written in the given order. Empty or whitespace-only preambles are ignored.
pub fn compose_prompt<R, S, RI, SI>(
    preamble: Option<&str>,
    recent: R,
    similar: S,
    question: &str,
) -> String
where
    R: IntoIterator<Item = RI>,
    RI: AsRef<str>,
    S: IntoIterator<Item = SI>,
    SI: AsRef<str>,
{
    let mut sections = Vec::new();

    if let Some(p) = preamble.map(str::trim).filter(|p| !p.is_empty()) {
        sections.push(p.to_string());
    }
    push_section(
        &mut sections,
        SECTION_RECENT,
        recent.into_iter().map(|r| r.as_ref().to_string()).collect(),
    );
    push_section(
        &mut sections,
        SECTION_SIMILAR,
        similar.into_iter().map(|s| s.as_ref().to_string()).collect(),
    );

    if sections.is_empty() {
        return question.to_string();
    }
    sections.push(format!("{}{}", QUESTION_LABEL, question));
    sections.join("\n\n")
}

/// The request messages for one exchange: optional system instructions, then the composed prompt.
pub fn build_messages(system_message: Option<&str>, prompt: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system_message.filter(|s| !s.trim().is_empty()) {
        messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(prompt));
    messages
}
