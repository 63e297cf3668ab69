//! Log levels of the connection lifecycle.

mod common;

use std::{
    fmt,
    sync::{Arc, Mutex},
    time::Duration,
};

use common::{Script, ScriptedTransport};
use hpx_sse::{SseConfig, SseStream};
use tracing::{
    Level, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{
    Layer,
    layer::{Context, SubscriberExt},
};

type Records = Arc<Mutex<Vec<(Level, String)>>>;

/// Layer keeping the level and message of every event.
struct Capture(Records);

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for Capture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.0
            .lock()
            .expect("lock records")
            .push((*event.metadata().level(), visitor.0));
    }
}

fn level_of(records: &Records, message: &str) -> Option<Level> {
    records
        .lock()
        .expect("lock records")
        .iter()
        .find(|(_, msg)| msg == message)
        .map(|(level, _)| *level)
}

#[tokio::test]
async fn test_clean_end_logs_at_info_and_reconnect_at_warn() {
    let records: Records = Arc::default();
    let subscriber = tracing_subscriber::registry().with(Capture(Arc::clone(&records)));
    let _guard = tracing::subscriber::set_default(subscriber);

    let transport = ScriptedTransport::new(vec![Script::body(&["data: a\n\n"])]);
    let mut stream = SseStream::with_transport(
        SseConfig::new("http://localhost/stream")
            .initial_retry_delay(Duration::from_millis(1))
            .max_retry_delay(Duration::from_millis(1))
            .max_retries(Some(1)),
        transport,
    )
    .expect("valid config");

    while stream.next_event().await.is_some() {}

    assert_eq!(level_of(&records, "SSE stream ended"), Some(Level::INFO));
    assert_eq!(
        level_of(&records, "SSE reconnecting after backoff"),
        Some(Level::WARN)
    );
    assert_eq!(
        level_of(&records, "SSE connection failed"),
        Some(Level::ERROR)
    );
}
