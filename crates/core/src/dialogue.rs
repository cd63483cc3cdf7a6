use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use trip_assistant_types::{QueryRequest, QueryResponse};

/// The one failure the conversation core recognizes.
///
/// Network errors, timeouts, bad statuses and unparseable bodies all collapse into this.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DialogueError {
    #[error("transport failure: {0}")]
    Transport(String),
}

// The `DialogueService` trait is the boundary between the conversation state machine and
// whatever actually answers queries. The store and the controller only ever see this trait,
// so tests drive them with `MockDialogueService` and the binary plugs in an HTTP adapter.
//
// `automock` is listed before `async_trait` so the generated mock returns plain values.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DialogueService: Send + Sync {
    /// Sends one query and resolves with the service's reply, or fails with a transport error.
    async fn query(&self, request: QueryRequest) -> Result<QueryResponse, DialogueError>;
}
