//! # Push and pull data flows
//!
//! Demonstrates both consumption styles:
//! - **Pull**: finite sources merged and collected with `collect_blocking`
//! - **Push**: two delayed counters merged with a finite source, published,
//!   subscribed and connected; values arrive in timing order
//! - Runtime events printed by the built-in `LogWriter`

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rxflow::{Config, DelayPolicy, Emitter, LogWriter, Observe, Runtime, Stream};

/// Merges `[0]`, `[1, 3, 5, 7]` and `[2, 4, 6, 8]` and blocks for the result.
fn pull_the_data() -> Result<Vec<i32>, rxflow::StreamError> {
    let zero = Stream::just([0]);
    let odds = Stream::just([1, 3, 5, 7]);
    let evens = Stream::just([2, 4, 6, 8]);

    zero.merge(&odds).merge(&evens).collect_blocking(Vec::new())
}

/// Emits odds and evens with random delays and gathers them as they arrive.
async fn push_the_data(rt: &Runtime) -> Result<Vec<i64>, Box<dyn std::error::Error>> {
    let delay = DelayPolicy::uniform(Duration::from_millis(1000));
    let odds = Emitter::counter(1, 2, 7, delay)?;
    let evens = Emitter::counter(2, 2, 8, delay)?;
    let stream = Stream::merge_all([Stream::from(odds), Stream::from(evens), Stream::just([0])]);

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);

    let hot = rt.publish(&stream);
    let sub = hot.subscribe(move |v: i64| {
        println!("Received: {v}");
        if let Ok(mut values) = sink.lock() {
            values.push(v);
        }
    });
    let mut conn = hot.connect()?;
    conn.wait(delay.settle_bound(4)).await?;
    sub.done().await;

    let values = received.lock().map(|v| v.clone()).unwrap_or_default();
    Ok(values)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::builder(Config::default())
        .with_observers(vec![Arc::new(LogWriter::new()) as Arc<dyn Observe>])
        .build();

    println!("Program Start\n");

    println!("Pulling data...");
    let all_numbers = pull_the_data()?;
    println!("All Numbers: {all_numbers:?}");

    println!("\nPushing data...");
    let all_numbers = push_the_data(&rt).await?;
    println!("All Numbers: {all_numbers:?}");

    // let the log writer drain before exiting
    tokio::time::sleep(Duration::from_millis(50)).await;
    println!("\nProgram End");
    Ok(())
}
