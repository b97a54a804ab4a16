use hft_transport::TransportConfig;
use hft_logger::{AsyncLogger, LogLevel, LogSink, LoggerConfig, SinkError, SourceLocation};
use std::sync::{Arc, Mutex};
use std::thread;

struct CollectingSink(Arc<Mutex<Vec<String>>>);

impl LogSink for CollectingSink {
    fn write(&mut self, formatted: &str) -> Result<(), SinkError> {
        self.0.lock().unwrap().push(formatted.to_owned());
        Ok(())
    }
}

fn here() -> SourceLocation {
    SourceLocation {
        file: file!(),
        line: line!(),
        func: "integration_test",
    }
}

#[test]
fn hundred_threads_five_hundred_records_each_all_survive_shutdown() {
    const THREADS: usize = 100;
    const PER_THREAD: usize = 500;

    let collected = Arc::new(Mutex::new(Vec::new()));
    let logger = Arc::new(AsyncLogger::new(
        LoggerConfig {
            level: LogLevel::Trace,
            transport: TransportConfig::new(16, 1024, THREADS, false),
        },
        vec![Box::new(CollectingSink(Arc::clone(&collected)))],
    ));

    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                let handle = logger.handle();
                for i in 0..PER_THREAD {
                    handle.log(LogLevel::Info, here(), format!("thread {t} record {i}"));
                }
            })
        })
        .collect();

    for w in workers {
        w.join().unwrap();
    }

    let logger = Arc::try_unwrap(logger).unwrap_or_else(|_| panic!("producer handle outlived its thread"));
    let sinks = logger.shutdown();
    drop(sinks);

    assert_eq!(collected.lock().unwrap().len(), THREADS * PER_THREAD);
}

#[test]
fn shutdown_drains_records_enqueued_before_the_call() {
    let collected = Arc::new(Mutex::new(Vec::new()));
    let logger = AsyncLogger::new(
        LoggerConfig::default(),
        vec![Box::new(CollectingSink(Arc::clone(&collected)))],
    );
    let handle = logger.handle();

    for i in 0..1_000 {
        handle.log(LogLevel::Info, here(), format!("burst {i}"));
    }
    drop(handle);

    logger.shutdown();
    assert_eq!(collected.lock().unwrap().len(), 1_000);
}

#[test]
fn dropped_handle_after_close_is_counted_not_panicked() {
    let logger = AsyncLogger::new(LoggerConfig::default(), vec![]);
    let handle = logger.handle();
    logger.shutdown();
    // The logger is gone; the handle's queue is closed, so further calls
    // must be silently counted rather than panic a caller mid-shutdown.
    handle.log(LogLevel::Error, here(), "after shutdown");
}
