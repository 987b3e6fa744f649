//! End-to-end pump scenarios against the embedded memory engine.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use matchflow_engine::{
    AddRecords, ChannelSource, JsonlFileSource, JsonlSink, ProcessRedoRecords, PumpError,
    PumpOptions, RecordOperation, RedoSource, Reporter, WorkItem, WorkPump, spawn_file_producer,
};
use matchflow_sdk::{CallFlags, MemoryEngine, ResolutionEngine};
use matchflow_types::{EngineError, Outcome, RedoRecord};

fn record_line(id: usize) -> String {
    serde_json::json!({
        "DATA_SOURCE": "CUSTOMERS",
        "RECORD_ID": id.to_string(),
        "NAME_FULL": format!("Person {id}"),
    })
    .to_string()
}

fn write_records(lines: &[String]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
    file
}

fn engine() -> Arc<MemoryEngine> {
    Arc::new(MemoryEngine::with_data_sources(["CUSTOMERS"]))
}

#[tokio::test]
async fn loads_500_records_with_8_workers_and_writes_info_lines() {
    let lines: Vec<String> = (0..500).map(record_line).collect();
    let input = write_records(&lines);
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("with_info.jsonl");

    let engine = engine();
    let pump = WorkPump::new(Arc::new(AddRecords::new(engine.clone(), CallFlags::with_info())))
        .with_options(PumpOptions {
            workers: 8,
            stats_interval: None,
        });

    let mut source = JsonlFileSource::open(input.path()).await.unwrap();
    let mut reporter =
        Reporter::new("add").with_sink(JsonlSink::create(&output).await.unwrap());
    let summary = pump.run(&mut source, &mut reporter).await.unwrap();

    assert_eq!(summary.succeeded, 500);
    assert_eq!(summary.failed, 0);

    let contents = std::fs::read_to_string(&output).unwrap();
    assert_eq!(contents.lines().count(), 500);
    for line in contents.lines() {
        let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(parsed["AFFECTED_ENTITIES"].is_array());
    }

    let stats: serde_json::Value = serde_json::from_str(&engine.stats().unwrap()).unwrap();
    assert_eq!(stats["loadedRecords"], 500);
}

#[tokio::test]
async fn one_malformed_line_among_ten_is_counted_not_fatal() {
    let mut lines: Vec<String> = (0..9).map(record_line).collect();
    lines.insert(4, "{this is not json".to_string());
    let input = write_records(&lines);

    let pump = WorkPump::new(Arc::new(AddRecords::new(engine(), CallFlags::default())))
        .with_options(PumpOptions {
            workers: 4,
            stats_interval: None,
        });

    let mut source = JsonlFileSource::open(input.path()).await.unwrap();
    let mut reporter = Reporter::new("add");
    let summary = pump.run(&mut source, &mut reporter).await.unwrap();

    assert_eq!(summary.succeeded, 9);
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn retryable_failures_are_skipped_and_counted() {
    let lines: Vec<String> = (0..10).map(record_line).collect();
    let input = write_records(&lines);

    let engine = engine();
    engine
        .fail_record("3", EngineError::database_transient("DEADLOCK", "deadlock"))
        .unwrap();
    engine
        .fail_record("7", EngineError::timeout("ENGINE_TIMEOUT", "timed out"))
        .unwrap();

    let pump = WorkPump::new(Arc::new(AddRecords::new(engine, CallFlags::default())))
        .with_options(PumpOptions {
            workers: 2,
            stats_interval: None,
        });

    let mut source = JsonlFileSource::open(input.path()).await.unwrap();
    let mut reporter = Reporter::new("add");
    let summary = pump.run(&mut source, &mut reporter).await.unwrap();

    assert_eq!(summary.succeeded, 8);
    assert_eq!(summary.failed, 2);
}

#[tokio::test]
async fn fatal_failure_drains_and_surfaces_the_error() {
    let lines: Vec<String> = (0..10).map(record_line).collect();
    let input = write_records(&lines);

    let engine = engine();
    engine
        .fail_record("5", EngineError::unrecoverable("CORRUPT_REPO", "repository corrupt"))
        .unwrap();

    let pump = WorkPump::new(Arc::new(AddRecords::new(engine, CallFlags::default())))
        .with_options(PumpOptions {
            workers: 4,
            stats_interval: None,
        });

    let mut source = JsonlFileSource::open(input.path()).await.unwrap();
    let mut reporter = Reporter::new("add");
    let err = pump.run(&mut source, &mut reporter).await.unwrap_err();

    let engine_err = err.as_engine_error().expect("fatal engine error");
    assert_eq!(engine_err.code, "CORRUPT_REPO");
    // The drain never exceeds the input; the failing record is not counted
    // as a skip.
    assert!(reporter.succeeded() + reporter.failed() < 10);
}

#[tokio::test]
async fn empty_source_completes_immediately() {
    let input = write_records(&[]);

    let pump = WorkPump::new(Arc::new(AddRecords::new(engine(), CallFlags::default())));
    let mut source = JsonlFileSource::open(input.path()).await.unwrap();
    let mut reporter = Reporter::new("add");
    let summary = pump.run(&mut source, &mut reporter).await.unwrap();

    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn single_worker_preserves_input_order_in_output() {
    let lines: Vec<String> = (0..25).map(record_line).collect();
    let input = write_records(&lines);
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("ordered.jsonl");

    let pump = WorkPump::new(Arc::new(AddRecords::new(engine(), CallFlags::with_info())))
        .with_options(PumpOptions {
            workers: 1,
            stats_interval: None,
        });

    let mut source = JsonlFileSource::open(input.path()).await.unwrap();
    let mut reporter =
        Reporter::new("add").with_sink(JsonlSink::create(&output).await.unwrap());
    pump.run(&mut source, &mut reporter).await.unwrap();

    let contents = std::fs::read_to_string(&output).unwrap();
    let ids: Vec<String> = contents
        .lines()
        .map(|line| {
            let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
            parsed["RECORD_ID"].as_str().unwrap().to_string()
        })
        .collect();
    let expected: Vec<String> = (0..25).map(|i| i.to_string()).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn queue_fed_pump_consumes_everything_the_producer_sends() {
    let lines: Vec<String> = (0..200).map(record_line).collect();
    let input = write_records(&lines);

    let (sender, mut source) = ChannelSource::bounded(32);
    let producer = spawn_file_producer(input.path(), sender);

    let pump = WorkPump::new(Arc::new(AddRecords::new(engine(), CallFlags::default())))
        .with_options(PumpOptions {
            workers: 6,
            stats_interval: None,
        });
    let mut reporter = Reporter::new("add");
    let summary = pump.run(&mut source, &mut reporter).await.unwrap();

    assert_eq!(producer.await.unwrap().unwrap(), 200);
    assert_eq!(summary.succeeded, 200);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn pre_cancelled_pump_consumes_nothing() {
    let lines: Vec<String> = (0..50).map(record_line).collect();
    let input = write_records(&lines);

    let cancel = CancellationToken::new();
    cancel.cancel();

    let pump = WorkPump::new(Arc::new(AddRecords::new(engine(), CallFlags::default())))
        .with_cancellation(cancel);
    let mut source = JsonlFileSource::open(input.path()).await.unwrap();
    let mut reporter = Reporter::new("add");
    let summary = pump.run(&mut source, &mut reporter).await.unwrap();

    assert_eq!(summary.total(), 0);
}

#[tokio::test]
async fn redo_pump_drains_queue_then_waits_until_cancelled() {
    let engine = engine();
    for i in 0..5 {
        engine
            .queue_redo(RedoRecord(
                serde_json::json!({"DSRC_ACTION": "DELETE", "RECORD_ID": i.to_string(), "ENTITY_ID": i})
                    .to_string(),
            ))
            .unwrap();
    }

    let cancel = CancellationToken::new();
    let mut source = RedoSource::new(engine.clone(), cancel.clone())
        .with_poll_interval(Duration::from_millis(10));
    let pump = WorkPump::new(Arc::new(ProcessRedoRecords::new(
        engine.clone(),
        CallFlags::default(),
    )))
    .with_options(PumpOptions {
        workers: 3,
        stats_interval: None,
    })
    .with_cancellation(cancel.clone());

    let run = tokio::spawn(async move {
        let mut reporter = Reporter::new("redo");
        pump.run(&mut source, &mut reporter).await
    });

    // Wait for the queue to drain, then cancel the long-running loop.
    tokio::time::timeout(Duration::from_secs(5), async {
        while engine.count_redo_records().unwrap() > 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("redo queue should drain");
    cancel.cancel();

    let summary = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("pump should stop after cancellation")
        .unwrap()
        .unwrap();
    assert_eq!(summary.succeeded, 5);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn panicked_worker_surfaces_an_error_and_still_flushes_the_sink() {
    struct PanicOnFive {
        inner: AddRecords,
    }

    impl RecordOperation for PanicOnFive {
        fn invoke(&self, item: &WorkItem) -> Outcome {
            if item.payload.contains(r#""RECORD_ID":"5""#) {
                panic!("worker crashed");
            }
            self.inner.invoke(item)
        }

        fn name(&self) -> &'static str {
            "add"
        }
    }

    let lines: Vec<String> = (0..10).map(record_line).collect();
    let input = write_records(&lines);
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("with_info.jsonl");

    let op = PanicOnFive {
        inner: AddRecords::new(engine(), CallFlags::with_info()),
    };
    let pump = WorkPump::new(Arc::new(op)).with_options(PumpOptions {
        workers: 1,
        stats_interval: None,
    });

    let mut source = JsonlFileSource::open(input.path()).await.unwrap();
    let mut reporter =
        Reporter::new("add").with_sink(JsonlSink::create(&output).await.unwrap());
    let err = pump.run(&mut source, &mut reporter).await.unwrap_err();
    assert!(matches!(err, PumpError::Infrastructure(_)));

    // The five successes before the crash are flushed, not stranded in the
    // sink's buffer.
    let contents = std::fs::read_to_string(&output).unwrap();
    assert_eq!(contents.lines().count(), 5);
}

#[tokio::test]
async fn source_read_failure_is_an_infrastructure_error() {
    struct FailingSource;

    #[async_trait::async_trait]
    impl matchflow_engine::WorkSource for FailingSource {
        async fn next(&mut self) -> Result<Option<matchflow_engine::WorkItem>, PumpError> {
            Err(PumpError::Infrastructure(anyhow::anyhow!("disk on fire")))
        }
    }

    let pump = WorkPump::new(Arc::new(AddRecords::new(engine(), CallFlags::default())));
    let mut reporter = Reporter::new("add");
    let err = pump.run(&mut FailingSource, &mut reporter).await.unwrap_err();
    assert!(matches!(err, PumpError::Infrastructure(_)));
}
