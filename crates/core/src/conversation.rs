use crate::classifier;
use crate::dialogue::{DialogueError, DialogueService};
use std::fmt;
use std::str::FromStr;
use trip_assistant_types::{DEMO_USER_ID, Message, QueryRequest, QueryResponse};

/// Shown when the service answers without any usable text.
pub const FALLBACK_REPLY: &str = "Sorry, I didn't understand that.";
/// Shown when the round trip to the service fails.
pub const TRANSPORT_FAILURE_REPLY: &str = "Server error. Please try again later.";

/// Whether the UI expects free text or a fixed yes/no choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    FreeText,
    Confirmation,
}

/// One of the two fixed answers offered while a confirmation is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Yes,
    No,
}

impl Choice {
    pub const ALL: [Choice; 2] = [Choice::Yes, Choice::No];

    pub fn as_str(&self) -> &'static str {
        match self {
            Choice::Yes => "yes",
            Choice::No => "no",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown choice: {0:?}")]
pub struct UnknownChoice(pub String);

impl FromStr for Choice {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Choice::Yes),
            "no" => Ok(Choice::No),
            other => Err(UnknownChoice(other.to_string())),
        }
    }
}

// The pending prompt only exists while a confirmation is outstanding.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum InputState {
    #[default]
    FreeText,
    Confirmation {
        prompt: String,
    },
}

/// Read-only snapshot handed to the render surface after every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationView {
    pub transcript: Vec<Message>,
    pub mode: InputMode,
    pub pending_prompt: Option<String>,
    /// `[yes, no]` while confirming, empty otherwise.
    pub options: Vec<Choice>,
}

/// The single source of truth for the transcript and the input mode.
///
/// The transcript only grows. Every mutation goes through one of the `append_*` operations, so
/// the render surface can be derived from `view()` at any time.
#[derive(Debug)]
pub struct ConversationStore {
    user_id: String,
    transcript: Vec<Message>,
    input: InputState,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(DEMO_USER_ID)
    }
}

impl ConversationStore {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            transcript: Vec::new(),
            input: InputState::FreeText,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn mode(&self) -> InputMode {
        match self.input {
            InputState::FreeText => InputMode::FreeText,
            InputState::Confirmation { .. } => InputMode::Confirmation,
        }
    }

    pub fn pending_prompt(&self) -> Option<&str> {
        match &self.input {
            InputState::FreeText => None,
            InputState::Confirmation { prompt } => Some(prompt),
        }
    }

    pub fn options(&self) -> &'static [Choice] {
        match self.mode() {
            InputMode::Confirmation => &Choice::ALL,
            InputMode::FreeText => &[],
        }
    }

    pub fn view(&self) -> ConversationView {
        ConversationView {
            transcript: self.transcript.clone(),
            mode: self.mode(),
            pending_prompt: self.pending_prompt().map(str::to_string),
            options: self.options().to_vec(),
        }
    }

    /// Appends a user message and leaves confirmation mode.
    ///
    /// Input that is blank after trimming is ignored entirely. Otherwise returns the query to send
    /// for it, carrying the trimmed text and this session's user id.
    pub fn append_user_message(&mut self, text: &str) -> Option<QueryRequest> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            tracing::debug!("ignoring blank submission");
            return None;
        }

        self.transcript.push(Message::user(text));
        if self.mode() == InputMode::Confirmation {
            tracing::debug!("user input closes the pending confirmation");
        }
        self.input = InputState::FreeText;
        Some(QueryRequest::new(trimmed, self.user_id.clone()))
    }

    /// Appends a bot message and derives the input mode from it.
    pub fn append_bot_message(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.input = if classifier::classify(&text) {
            tracing::debug!("reply asks for confirmation");
            InputState::Confirmation {
                prompt: text.clone(),
            }
        } else {
            InputState::FreeText
        };
        self.transcript.push(Message::bot(text));
    }

    /// Appends the fixed transport failure notice. The input mode is left as it was.
    pub fn append_system_error_message(&mut self) {
        self.transcript.push(Message::bot(TRANSPORT_FAILURE_REPLY));
    }

    /// Completes a round trip: the reply text (or the fallback) on success, the failure notice
    /// otherwise.
    pub fn apply_reply(&mut self, result: Result<QueryResponse, DialogueError>) {
        match result {
            Ok(response) => {
                let text = match response.text() {
                    Some(text) => text.to_string(),
                    None => {
                        tracing::debug!("reply had no text, using fallback");
                        FALLBACK_REPLY.to_string()
                    }
                };
                self.append_bot_message(text);
            }
            Err(e) => {
                tracing::warn!("{}", e);
                self.append_system_error_message();
            }
        }
    }

    /// Appends `text` as a user message and, if it was accepted, sends exactly one query and
    /// applies the reply. Transport failures become a bot message and are never returned.
    pub async fn submit<D>(&mut self, service: &D, text: &str)
    where
        D: DialogueService + ?Sized,
    {
        let Some(request) = self.append_user_message(text) else {
            return;
        };
        let result = service.query(request).await;
        self.apply_reply(result);
    }

    /// Same as submitting the literal choice text.
    pub async fn choose_option<D>(&mut self, service: &D, choice: Choice)
    where
        D: DialogueService + ?Sized,
    {
        self.submit(service, choice.as_str()).await;
    }
}
