use std::time::Duration;

use stride_core::SampleFeed;
use stride_core::mocks::{FaultyImu, ScriptedImu};
use stride_traits::{MonotonicClock, Sample, Vec3};

fn script(n: i64) -> Vec<Sample> {
    (1..=n)
        .map(|i| Sample::Accelerometer {
            t_ns: i * 10_000_000,
            v: Vec3::new(0.0, 0.0, 9.8),
        })
        .collect()
}

#[test]
fn event_feed_delivers_everything_in_order() {
    let feed = SampleFeed::spawn_event(
        ScriptedImu::new(script(50)),
        Duration::from_millis(10),
        MonotonicClock::new(),
    );
    let mut got = Vec::new();
    while got.len() < 50 {
        match feed.recv_timeout(Duration::from_millis(500)) {
            Some(s) => got.push(s),
            None => panic!("feed stalled after {} samples", got.len()),
        }
    }
    assert_eq!(got, script(50));
}

#[test]
fn exhausted_source_goes_quiet_without_erroring() {
    let feed = SampleFeed::spawn_event(
        ScriptedImu::new(script(3)),
        Duration::from_millis(1),
        MonotonicClock::new(),
    );
    let mut got = 0;
    while feed.recv_timeout(Duration::from_millis(200)).is_some() {
        got += 1;
    }
    assert_eq!(got, 3);
}

#[test]
fn faulty_source_never_delivers_but_never_panics() {
    let feed = SampleFeed::spawn(
        FaultyImu,
        1000,
        Duration::from_millis(1),
        MonotonicClock::new(),
    );
    assert_eq!(feed.recv_timeout(Duration::from_millis(50)), None);
    // Errors never advance the last-ok marker.
    assert!(feed.stalled_for_now() >= 50);
    drop(feed); // join must not propagate a panic
}

#[test]
fn drop_returns_even_with_a_full_queue() {
    // Far more samples than the bounded queue holds and a consumer that
    // never receives: the producer ends up waiting on a full channel.
    let feed = SampleFeed::spawn_event(
        ScriptedImu::new(script(5_000)),
        Duration::from_millis(1),
        MonotonicClock::new(),
    );
    // Let the worker fill the queue and start waiting.
    std::thread::sleep(Duration::from_millis(100));
    let t0 = std::time::Instant::now();
    drop(feed);
    assert!(
        t0.elapsed() < Duration::from_secs(1),
        "drop hung on a blocked send"
    );
}

#[test]
fn drain_empties_the_queue() {
    let feed = SampleFeed::spawn_event(
        ScriptedImu::new(script(10)),
        Duration::from_millis(1),
        MonotonicClock::new(),
    );
    // Give the producer a moment to finish the short script.
    std::thread::sleep(Duration::from_millis(100));
    let drained = feed.drain();
    assert_eq!(drained.len(), 10);
    assert!(feed.drain().is_empty());
}
