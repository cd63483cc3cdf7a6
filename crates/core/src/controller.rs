use crate::Command;
use crate::conversation::{Choice, ConversationStore};
use crate::dialogue::{DialogueError, DialogueService};
use std::sync::Arc;
use tokio::sync::mpsc;
use trip_assistant_types::{QueryRequest, QueryResponse};

/// Discrete user actions coming from the render surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    /// Free text typed by the user.
    Submit(String),
    /// One of the fixed confirmation options was picked.
    Choose(Choice),
}

/// The outcome of one dispatched query.
#[derive(Debug)]
pub struct Reply {
    pub request_id: u64,
    pub result: Result<QueryResponse, DialogueError>,
}

/// Wires user events to the `ConversationStore` and the dialogue service.
///
/// The user half of every event is applied synchronously, so the options disappear before the
/// network round trip starts. Each accepted submission spawns one query. Queries are not
/// serialized: a second submission may go out while the first is still in flight, and replies
/// are applied in the order they arrive.
pub struct Controller<D: ?Sized> {
    store: ConversationStore,
    service: Arc<D>,
    reply_tx: mpsc::UnboundedSender<Reply>,
    reply_rx: mpsc::UnboundedReceiver<Reply>,
    next_request_id: u64,
    in_flight: usize,
}

impl<D> Controller<D>
where
    D: DialogueService + ?Sized + 'static,
{
    pub fn new(store: ConversationStore, service: Arc<D>) -> Self {
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        Self {
            store,
            service,
            reply_tx,
            reply_rx,
            next_request_id: 1,
            in_flight: 0,
        }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn into_store(self) -> ConversationStore {
        self.store
    }

    /// Number of queries dispatched whose reply has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Applies the user half of `event` and dispatches its query.
    ///
    /// Returns the id of the dispatched request, or `None` if the input was blank.
    pub fn handle_event(&mut self, event: UserEvent) -> Option<u64> {
        let text = match &event {
            UserEvent::Submit(text) => text.as_str(),
            UserEvent::Choose(choice) => choice.as_str(),
        };
        let request = self.store.append_user_message(text)?;
        Some(self.dispatch(request))
    }

    fn dispatch(&mut self, request: QueryRequest) -> u64 {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.in_flight += 1;
        tracing::debug!(request_id, query = request.query(), "dispatching query");

        let service = Arc::clone(&self.service);
        let reply_tx = self.reply_tx.clone();
        tokio::spawn(async move {
            let result = service.query(request).await;
            if reply_tx.send(Reply { request_id, result }).is_err() {
                tracing::debug!(request_id, "reply arrived after the controller stopped");
            }
        });
        request_id
    }

    /// Waits for the next reply, in arrival order.
    pub async fn next_reply(&mut self) -> Option<Reply> {
        self.reply_rx.recv().await
    }

    pub fn apply_reply(&mut self, reply: Reply) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match &reply.result {
            Ok(_) => tracing::info!(request_id = reply.request_id, "reply received"),
            Err(e) => tracing::warn!(request_id = reply.request_id, error = %e, "query failed"),
        }
        self.store.apply_reply(reply.result);
    }

    /// Runs the event loop until `events` closes, rendering after every transition.
    ///
    /// Once input is gone the replies still in flight are applied before the store is handed
    /// back. A reply that never comes keeps this future pending.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<UserEvent>,
        commands: mpsc::Sender<Command>,
    ) -> ConversationStore {
        self.render(&commands).await;

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        self.handle_event(event);
                        self.render(&commands).await;
                    }
                    None => break,
                },
                Some(reply) = self.reply_rx.recv() => {
                    self.apply_reply(reply);
                    self.render(&commands).await;
                }
            }
        }

        while self.in_flight > 0 {
            let Some(reply) = self.reply_rx.recv().await else {
                break;
            };
            self.apply_reply(reply);
            self.render(&commands).await;
        }

        self.store
    }

    async fn render(&self, commands: &mpsc::Sender<Command>) {
        if let Err(e) = commands.send(Command::Render(self.store.view())).await {
            tracing::warn!("render surface is gone: {}", e);
        }
    }
}
