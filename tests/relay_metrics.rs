//! Byte counters for both relay directions.
//!
//! Installs a process-wide metrics recorder, so this file holds a single test.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

mod common;
use common::{request, CapturingSink, WAIT};

/// Keeps every counter in memory, keyed as `name{label=value,...}`.
#[derive(Clone, Default)]
struct CountingRecorder {
    counters: Arc<Mutex<HashMap<String, Arc<AtomicU64>>>>,
}

impl CountingRecorder {
    fn value(&self, key: &str) -> u64 {
        self.counters
            .lock()
            .unwrap()
            .get(key)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

fn render(key: &Key) -> String {
    let labels: Vec<String> = key
        .labels()
        .map(|label| format!("{}={}", label.key(), label.value()))
        .collect();
    format!("{}{{{}}}", key.name(), labels.join(","))
}

impl Recorder for CountingRecorder {
    fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

    fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
        let counter = self
            .counters
            .lock()
            .unwrap()
            .entry(render(key))
            .or_default()
            .clone();
        Counter::from_arc(counter)
    }

    fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}

#[tokio::test]
async fn counts_bytes_in_both_directions() {
    let recorder = CountingRecorder::default();
    metrics::set_global_recorder(recorder.clone()).unwrap();

    let backend = common::start_echo_backend().await;
    let (sink, _records) = CapturingSink::new();
    let proxy = common::start_proxy(backend, sink).await;

    let ping = request(&["PING"]);
    let mut client = TcpStream::connect(proxy.addr).await.unwrap();
    client.write_all(&ping).await.unwrap();
    let mut reply = vec![0u8; ping.len()];
    tokio::time::timeout(WAIT, client.read_exact(&mut reply))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reply, ping);

    // Client-initiated close: the outbound copy is cut short by the session
    // closing, after its bytes were already delivered.
    drop(client);
    tokio::time::timeout(WAIT, proxy.tracker.wait_for_drain())
        .await
        .expect("session was not released");

    let len = ping.len() as u64;
    assert_eq!(
        recorder.value("resp_proxy_bytes_relayed_total{direction=inbound}"),
        len
    );
    assert_eq!(
        recorder.value("resp_proxy_bytes_relayed_total{direction=outbound}"),
        len
    );
    assert_eq!(
        recorder.value("resp_proxy_commands_total{command=OTHER}"),
        1
    );
}
