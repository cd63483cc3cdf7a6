pub mod classifier;
pub mod controller;
pub mod conversation;
pub mod dialogue;

pub use classifier::classify;
pub use controller::{Controller, Reply, UserEvent};
pub use conversation::{
    Choice, ConversationStore, ConversationView, FALLBACK_REPLY, InputMode,
    TRANSPORT_FAILURE_REPLY,
};
pub use dialogue::{DialogueError, DialogueService};
pub use trip_assistant_types as types;

/// Represents commands that the core logic issues to the runtime.
///
/// This enum decouples the conversation's decision-making from the runtime that draws it.
#[derive(Debug, Clone)]
pub enum Command {
    /// Redraw the render surface from this snapshot.
    Render(ConversationView),
}
