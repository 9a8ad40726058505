//! # Sorted push
//!
//! Pushes delayed odds and evens through `buffer(9)`, sorts the single batch
//! and flattens it back, so the subscriber sees `0..=8` in order despite the
//! random emission timing. Press Ctrl+C to stop early.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rxflow::{Config, DelayPolicy, Emitter, LogWriter, Observe, Runtime, Stream};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config {
        grace: Duration::from_secs(2),
        ..Config::default()
    };
    let rt = Runtime::builder(cfg)
        .with_observer(Arc::new(LogWriter::new()) as Arc<dyn Observe>)
        .build();

    println!("Program Start\n");
    println!("Pushing data...");

    let delay = DelayPolicy::uniform(Duration::from_millis(1000));
    let odds = Emitter::counter(1, 2, 7, delay)?;
    let evens = Emitter::counter(2, 2, 8, delay)?;
    let sorted = Stream::merge_all([Stream::from(odds), Stream::from(evens), Stream::just([0])])
        .buffer(9)?
        .map(|mut batch: Vec<i64>| {
            batch.sort_unstable();
            batch
        })
        .flatten_iterable();

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let hot = rt.publish(&sorted);
    let sub = hot.subscribe_with(
        move |v: i64| {
            if let Ok(mut values) = sink.lock() {
                values.push(v);
            }
        },
        || println!("Stream completed"),
    );

    let mut conn = hot.connect()?;
    match conn.join_or_signal().await {
        Ok(()) => {
            sub.done().await;
            let all_numbers = received.lock().map(|v| v.clone()).unwrap_or_default();
            println!("All Numbers: {all_numbers:?}");
        }
        Err(e) => println!("Stopped early: {e}"),
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    println!("\nProgram End");
    Ok(())
}
