use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde_json::json;
use sqlx::{Pool, Sqlite};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::backend::handlers::{load_dashboard, today};
use crate::backend::AppState;
use crate::error::Result;

pub const DASHBOARD_EVENT: &str = "dashboard_update";

/// Fan-out of serialized dashboard updates to every WebSocket subscriber.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<String>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Builds the dashboard as of `now` and sends it to everyone listening.
    /// Returns how many subscribers received it; zero is fine.
    pub async fn publish(&self, pool: &Pool<Sqlite>, now: NaiveDate) -> Result<usize> {
        let payload = load_dashboard(pool, now).await?;
        let message = serde_json::to_string(&json!({ "event": DASHBOARD_EVENT, "data": payload }))?;
        Ok(self.send(message))
    }

    fn send(&self, message: String) -> usize {
        match self.tx.send(message) {
            Ok(receivers) => {
                tracing::debug!(receivers, "dashboard update sent");
                receivers
            }
            Err(_) => {
                tracing::debug!("no realtime subscribers");
                0
            }
        }
    }

    /// Fire-and-forget publish for today's date; failures are only logged.
    pub fn spawn_publish(&self, pool: Pool<Sqlite>) {
        let notifier = self.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.publish(&pool, today()).await {
                tracing::warn!(error = %e, "dashboard push failed");
            }
        });
    }
}

pub fn spawn_periodic_push(notifier: Notifier, pool: Pool<Sqlite>, every: Duration) -> JoinHandle<()> {
    tracing::info!(secs = every.as_secs(), "periodic dashboard push enabled");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if notifier.subscriber_count() == 0 {
                continue;
            }
            if let Err(e) = notifier.publish(&pool, today()).await {
                tracing::warn!(error = %e, "periodic dashboard push failed");
            }
        }
    })
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut rx = state.notifier.subscribe();
    tracing::info!(subscribers = state.notifier.subscriber_count(), "realtime client connected");

    // every subscriber gets a fresh copy when someone joins
    state.notifier.spawn_publish(state.db.clone());

    loop {
        tokio::select! {
            update = rx.recv() => match update {
                Ok(text) => {
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "realtime client lagging, skipped updates");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::info!("realtime client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_without_subscribers_is_not_an_error() {
        let notifier = Notifier::new(4);
        assert_eq!(notifier.subscriber_count(), 0);
        assert_eq!(notifier.send("{}".to_string()), 0);
    }

    #[tokio::test]
    async fn every_subscriber_gets_the_same_message() {
        let notifier = Notifier::new(4);
        let mut a = notifier.subscribe();
        let mut b = notifier.subscribe();

        assert_eq!(notifier.send("hello".to_string()), 2);
        assert_eq!(a.recv().await.unwrap(), "hello");
        assert_eq!(b.recv().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_ahead() {
        let notifier = Notifier::new(1);
        let mut rx = notifier.subscribe();

        notifier.send("first".to_string());
        notifier.send("second".to_string());

        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(1))));
        assert_eq!(rx.recv().await.unwrap(), "second");
    }
}
