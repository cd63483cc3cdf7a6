use async_trait::async_trait;
use dialogue_client::types::{QueryRequest, QueryResponse};
use trip_assistant_core::{DialogueError, DialogueService};

/// An adapter that implements the `DialogueService` trait for the HTTP `dialogue_client::Client`.
///
/// Every `ClientError` collapses into `DialogueError::Transport`; the core does not distinguish
/// between refused connections, timeouts, bad statuses and undecodable bodies.
#[derive(Clone)]
pub struct HttpDialogueService {
    client: dialogue_client::Client,
}

impl HttpDialogueService {
    pub fn new(client: dialogue_client::Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &dialogue_client::Client {
        &self.client
    }
}

#[async_trait]
impl DialogueService for HttpDialogueService {
    async fn query(&self, request: QueryRequest) -> Result<QueryResponse, DialogueError> {
        self.client
            .send(&request)
            .await
            .map_err(|e| DialogueError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialogue_client::Config;
    use dialogue_client::types::DEMO_USER_ID;
    use trip_assistant_core::{ConversationStore, TRANSPORT_FAILURE_REPLY};

    #[tokio::test]
    async fn test_unreachable_service_becomes_transport_failure() {
        // Nothing listens on a port we just released.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = dialogue_client::Client::new(
            Config::builder()
                .with_base_url(&format!("http://{addr}"))
                .build(),
        )
        .unwrap();
        let service = HttpDialogueService::new(client);

        let err = service
            .query(QueryRequest::new("hello", DEMO_USER_ID))
            .await
            .unwrap_err();
        assert!(matches!(err, DialogueError::Transport(_)));

        // And the store turns it into the fixed notice.
        let mut store = ConversationStore::default();
        store.submit(&service, "hello").await;
        assert_eq!(
            store.transcript().last().unwrap().text(),
            TRANSPORT_FAILURE_REPLY
        );
        assert_eq!(service.client().stats().failed(), 2);
    }
}
