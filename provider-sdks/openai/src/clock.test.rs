use super::*;

#[tokio::test]
async fn test_manual_clock_sleep_advances_time() {
    let clock = ManualClock::new();
    let start = clock.now();

    clock.sleep(Duration::from_millis(500)).await;
    clock.sleep(Duration::from_secs(1)).await;

    assert_eq!(clock.now() - start, Duration::from_millis(1500));
    assert_eq!(
        clock.sleeps(),
        vec![Duration::from_millis(500), Duration::from_secs(1)]
    );
}

#[test]
fn test_manual_clock_advance_is_not_a_sleep() {
    let clock = ManualClock::new();
    clock.advance(Duration::from_secs(3));

    assert_eq!(clock.elapsed(), Duration::from_secs(3));
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_tokio_clock_sleeps() {
    let clock = TokioClock;
    let start = clock.now();
    clock.sleep(Duration::from_millis(5)).await;
    assert!(clock.now() - start >= Duration::from_millis(5));
}
