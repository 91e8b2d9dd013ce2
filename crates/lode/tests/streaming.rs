// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Cursor -> pipe -> encoder streaming.
//!
//! A producer thread scans a row cursor and feeds snapshots through a small
//! pipe; the consumer encodes them as they arrive. Covers ordering,
//! backpressure with a tiny capacity, failure propagation, and release of
//! the cursor chain once the scan ends.

use lode::adapters::{Release, ResultSetAdapter, RowCursor};
use lode::codec::JsonEncoder;
use lode::config::{EncoderConfig, PipeConfig};
use lode::pipe::Pipe;
use lode::{Error, MapView, Result, Value};
use std::sync::{Arc, Mutex};
use std::thread;

type Log = Arc<Mutex<Vec<String>>>;

/// Synthetic `id, square` table that can fail after a given row.
struct SquaresCursor {
    columns: Vec<String>,
    rows: u32,
    current: u32,
    fail_after: Option<u32>,
    log: Log,
}

impl RowCursor for SquaresCursor {
    fn advance(&mut self) -> Result<bool> {
        if self.fail_after == Some(self.current) {
            return Err(Error::Resource(format!("scan failed after row {}", self.current)));
        }
        if self.current == self.rows {
            return Ok(false);
        }
        self.current += 1;
        Ok(true)
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn value(&self, index: usize) -> Result<Value> {
        let id = i64::from(self.current);
        Ok(match index {
            0 => Value::from(id),
            _ => Value::from(id * id),
        })
    }

    fn close(&mut self) -> Result<()> {
        self.log.lock().expect("log").push("cursor".into());
        Ok(())
    }
}

struct Handle {
    name: &'static str,
    log: Log,
}

impl Release for Handle {
    fn close(&mut self) -> Result<()> {
        self.log.lock().expect("log").push(self.name.into());
        Ok(())
    }
}

fn result_set(rows: u32, fail_after: Option<u32>, log: &Log) -> ResultSetAdapter {
    let cursor = SquaresCursor {
        columns: vec!["id".into(), "square".into()],
        rows,
        current: 0,
        fail_after,
        log: Arc::clone(log),
    };
    ResultSetAdapter::new(cursor)
        .with_statement(Handle {
            name: "statement",
            log: Arc::clone(log),
        })
        .with_connection(Handle {
            name: "connection",
            log: Arc::clone(log),
        })
}

/// Scans `adapter` on a worker thread, returning snapshots through a pipe.
fn spawn_scan(
    mut adapter: ResultSetAdapter,
    capacity: usize,
) -> (thread::JoinHandle<Result<()>>, Value) {
    let (producer, consumer) = Pipe::new(PipeConfig::default().with_capacity(capacity)).split();
    let worker = thread::spawn(move || {
        let rows = std::iter::from_fn(|| match adapter.next_row() {
            Ok(Some(row)) => Some(row.to_value()),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        });
        let submitted = producer.try_submit(rows);
        adapter.close()?;
        submitted
    });
    (worker, consumer.into_value())
}

#[test]
fn test_rows_stream_in_order() {
    let log = Log::default();
    let (worker, list) = spawn_scan(result_set(3, None, &log), 1);

    let text = JsonEncoder::compact().encode_to_string(&list).expect("encode");
    assert_eq!(
        text,
        r#"[{"id":1,"square":1},{"id":2,"square":4},{"id":3,"square":9}]"#
    );

    worker.join().expect("join").expect("scan");
    assert_eq!(
        *log.lock().expect("log"),
        vec!["cursor", "statement", "connection"]
    );
}

#[test]
fn test_many_rows_through_small_buffer() {
    let log = Log::default();
    let (worker, list) = spawn_scan(result_set(5_000, None, &log), 4);

    let mut out = Vec::new();
    JsonEncoder::new(EncoderConfig::default())
        .encode(&list, &mut out)
        .expect("encode");
    worker.join().expect("join").expect("scan");

    let text = String::from_utf8(out).expect("utf-8");
    assert!(text.starts_with("[\n  {\n    \"id\": 1,"));
    assert!(text.contains("\"square\": 25000000"));
    assert_eq!(text.matches("\"id\"").count(), 5_000);
}

#[test]
fn test_scan_failure_aborts_encoding() {
    let log = Log::default();
    let (worker, list) = spawn_scan(result_set(10, Some(2), &log), 2);

    let err = JsonEncoder::compact()
        .encode_to_string(&list)
        .expect_err("scan fails mid-stream");
    assert!(matches!(err, Error::Resource(ref m) if m.contains("row 2")));

    worker.join().expect("join").expect("pipe itself is healthy");
    assert_eq!(log.lock().expect("log").len(), 3, "chain still released");
}

#[test]
fn test_abandoned_consumer_unblocks_producer() {
    let log = Log::default();
    let (worker, list) = spawn_scan(result_set(1_000, None, &log), 1);
    drop(list);

    let err = worker.join().expect("join").expect_err("consumer gone");
    assert!(matches!(err, Error::ChannelClosed));
    assert_eq!(log.lock().expect("log").len(), 3);
}

#[test]
fn test_result_set_as_lazy_list() {
    let log = Log::default();
    let list = result_set(2, None, &log).into_value();

    let mut seen = Vec::new();
    for row in list.elements().expect("first pass") {
        let row = row.expect("row");
        seen.push(row.get("square").expect("get").and_then(|v| v.as_i64()));
    }
    assert_eq!(seen, vec![Some(1), Some(4)]);

    assert!(matches!(list.len(), Err(Error::Unsupported { .. })));
    assert!(matches!(list.at(0), Err(Error::Unsupported { .. })));
    assert!(matches!(list.elements(), Err(Error::Unsupported { .. })));

    drop(list);
    assert_eq!(log.lock().expect("log").len(), 3, "dropping the list closes");
}

#[test]
fn test_row_keys_follow_columns() {
    let log = Log::default();
    let mut adapter = result_set(1, None, &log);
    let row = adapter.next_row().expect("advance").expect("one row");
    assert_eq!(row.position(), 1);
    assert_eq!(row.keys().expect("keys"), vec!["id", "square"]);
}
