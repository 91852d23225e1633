use evictprep::progress::{IntervalProgress, ManualClock, Phase, Progress, ProgressUpdate};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Seen = Arc<Mutex<Vec<ProgressUpdate>>>;

fn capture(clock: &ManualClock, every: Duration) -> (IntervalProgress<ManualClock>, Seen) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let progress = IntervalProgress::with_clock(clock.clone(), every)
        .with_sink(move |u| sink.lock().unwrap().push(u.clone()));
    (progress, seen)
}

#[test]
fn test_reports_at_most_once_per_interval() {
    let clock = ManualClock::new();
    let (mut progress, seen) = capture(&clock, Duration::from_secs(10));

    progress.observe(Phase::Parsing, 1);
    clock.advance(Duration::from_secs(4));
    progress.observe(Phase::Parsing, 2);
    clock.advance(Duration::from_secs(6));
    progress.observe(Phase::Parsing, 3);
    clock.advance(Duration::from_secs(3));
    progress.observe(Phase::Parsing, 4);
    clock.advance(Duration::from_secs(12));
    progress.observe(Phase::Writing, 0);

    let seen = seen.lock().unwrap();
    let lines: Vec<String> = seen.iter().map(ToString::to_string).collect();
    assert_eq!(
        lines,
        vec!["10s: 3 rows parsed", "25s: 0 rows written to file"]
    );
}

#[test]
fn test_silent_before_the_first_interval() {
    let clock = ManualClock::new();
    let (mut progress, seen) = capture(&clock, Duration::from_secs(10));
    for rows in 1..=1000 {
        progress.observe(Phase::Parsing, rows);
    }
    assert!(seen.lock().unwrap().is_empty());
}
