use crate::types::{QueryRequest, QueryResponse, Welcome};
use std::sync::{Arc, Mutex};

mod config;
pub mod consts;
mod stats;

pub use config::{Config, ConfigBuilder};
pub use stats::Stats;

/// Everything that can go wrong on the way to the dialogue service and back.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("could not decode reply from {url}: {reason}")]
    Decode { url: String, reason: String },
}

// Holds the pooled HTTP client, the configuration and the request stats.
// Cloning is cheap and every clone shares the same stats.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    config: Arc<Config>,
    stats: Arc<Mutex<Stats>>,
}

impl Client {
    pub fn new(config: Config) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder().user_agent(consts::USER_AGENT);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ClientError::Build)?;

        Ok(Self {
            http,
            config: Arc::new(config),
            stats: Arc::new(Mutex::new(Stats::new())),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A snapshot of the request counters.
    pub fn stats(&self) -> Stats {
        match self.stats.lock() {
            Ok(stats) => stats.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Sends one query and waits for the reply.
    pub async fn send(&self, request: &QueryRequest) -> Result<QueryResponse, ClientError> {
        let url = self.config.query_url();
        self.update_stats(Stats::record_sent);
        tracing::debug!("sending query to {}: {:?}", url, request.query());

        let result = self.post_query(&url, request).await;
        match &result {
            Ok(response) => {
                self.update_stats(Stats::record_answered);
                if let Some(error) = response.error() {
                    tracing::warn!("dialogue service rejected the query: {}", error);
                }
            }
            Err(e) => {
                self.update_stats(Stats::record_failed);
                tracing::warn!("query failed: {}", e);
            }
        }
        result
    }

    /// Fetches the service greeting. Used as a reachability probe at startup.
    pub async fn welcome(&self) -> Result<Welcome, ClientError> {
        let url = self.config.welcome_url();
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| ClientError::Request {
                url: url.clone(),
                source,
            })?;
        let value = Self::read_json_object(&url, response).await?;
        serde_json::from_value(value).map_err(|e| ClientError::Decode {
            url,
            reason: e.to_string(),
        })
    }

    async fn post_query(
        &self,
        url: &str,
        request: &QueryRequest,
    ) -> Result<QueryResponse, ClientError> {
        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|source| ClientError::Request {
                url: url.to_string(),
                source,
            })?;
        let value = Self::read_json_object(url, response).await?;
        serde_json::from_value(value).map_err(|e| ClientError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    // Rejects non-2xx statuses and anything that is not a JSON object.
    async fn read_json_object(
        url: &str,
        response: reqwest::Response,
    ) -> Result<serde_json::Value, ClientError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ClientError::Request {
                url: url.to_string(),
                source,
            })?;
        let value: serde_json::Value =
            serde_json::from_slice(&body).map_err(|e| ClientError::Decode {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        if !value.is_object() {
            return Err(ClientError::Decode {
                url: url.to_string(),
                reason: "expected a JSON object".to_string(),
            });
        }
        Ok(value)
    }

    fn update_stats(&self, update: impl FnOnce(&mut Stats)) {
        if let Ok(mut stats_guard) = self.stats.lock() {
            update(&mut *stats_guard);
        } else {
            tracing::error!("failed to update stats");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEMO_USER_ID;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};

    // Serves the router on an ephemeral local port and returns its base URL.
    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client_for(base_url: &str) -> Client {
        Client::new(Config::builder().with_base_url(base_url).build()).unwrap()
    }

    #[tokio::test]
    async fn test_send_posts_query_and_user_id() {
        // The stub echoes the request body back inside the reply text.
        let router = Router::new().route(
            "/query",
            post(|Json(body): Json<QueryRequest>| async move {
                Json(json!({
                    "response": format!("{}|{}", body.query(), body.user_id())
                }))
            }),
        );
        let client = client_for(&spawn_stub(router).await);

        let reply = client
            .send(&QueryRequest::new("book a flight", DEMO_USER_ID))
            .await
            .unwrap();

        assert_eq!(reply.text(), Some("book a flight|demo_user"));
        let stats = client.stats();
        assert_eq!(stats.sent(), 1);
        assert_eq!(stats.answered(), 1);
        assert_eq!(stats.failed(), 0);
        assert_eq!(stats.pending(), 0);
    }

    #[tokio::test]
    async fn test_send_keeps_service_error_field() {
        let router = Router::new().route(
            "/query",
            post(|| async { Json(json!({ "error": "Query text is required." })) }),
        );
        let client = client_for(&spawn_stub(router).await);

        let reply = client
            .send(&QueryRequest::new("x", DEMO_USER_ID))
            .await
            .unwrap();

        assert_eq!(reply.text(), None);
        assert_eq!(reply.error(), Some("Query text is required."));
    }

    #[tokio::test]
    async fn test_reply_text_survives_malformed_error_field() {
        let router = Router::new().route(
            "/query",
            post(|| async {
                Json(json!({
                    "response": "Your flight AI202 is on time.",
                    "error": { "code": 1 }
                }))
            }),
        );
        let client = client_for(&spawn_stub(router).await);

        let reply = client
            .send(&QueryRequest::new("status of AI202", DEMO_USER_ID))
            .await
            .unwrap();

        assert_eq!(reply.text(), Some("Your flight AI202 is on time."));
        assert_eq!(reply.error(), None);
        assert_eq!(client.stats().answered(), 1);
        assert_eq!(client.stats().failed(), 0);
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let router = Router::new().route(
            "/query",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let client = client_for(&spawn_stub(router).await);

        let err = client
            .send(&QueryRequest::new("status of AI202", DEMO_USER_ID))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ClientError::Status { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
        assert_eq!(client.stats().failed(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_body_is_an_error() {
        let router = Router::new()
            .route("/query", post(|| async { "<html>not json</html>" }))
            .route("/", get(|| async { Json(json!(["not", "an", "object"])) }));
        let client = client_for(&spawn_stub(router).await);

        let err = client
            .send(&QueryRequest::new("hello", DEMO_USER_ID))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));

        let err = client.welcome().await.unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_a_request_error() {
        // Bind and immediately release a port so nothing is listening on it.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = client_for(&format!("http://{addr}"));

        let err = client
            .send(&QueryRequest::new("hello", DEMO_USER_ID))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Request { .. }));
        let stats = client.stats();
        assert_eq!(stats.sent(), 1);
        assert_eq!(stats.failed(), 1);
    }

    #[tokio::test]
    async fn test_welcome_reads_greeting() {
        let router = Router::new().route(
            "/",
            get(|| async { Json(json!({ "message": "Welcome to the Trip Assistant API!" })) }),
        );
        let client = client_for(&spawn_stub(router).await);

        let welcome = client.welcome().await.unwrap();
        assert_eq!(welcome.message(), "Welcome to the Trip Assistant API!");
        // The probe does not count as a query.
        assert_eq!(client.stats().sent(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_stats() {
        let router = Router::new().route(
            "/query",
            post(|Json(_): Json<Value>| async { Json(json!({ "response": "ok" })) }),
        );
        let client = client_for(&spawn_stub(router).await);
        let other = client.clone();

        other
            .send(&QueryRequest::new("one", DEMO_USER_ID))
            .await
            .unwrap();
        client
            .send(&QueryRequest::new("two", DEMO_USER_ID))
            .await
            .unwrap();

        assert_eq!(client.stats().answered(), 2);
    }
}
