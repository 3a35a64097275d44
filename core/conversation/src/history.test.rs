use super::*;
use openai_sdk::Role;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn contents(turns: &[Turn]) -> Vec<&str> {
    turns.iter().map(|t| t.content.as_str()).collect()
}

#[test]
fn test_append_orders_user_then_assistant() {
    let store = HistoryStore::new(10);
    store.append("q1", "a1");

    let turns = store.snapshot(10);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[1].role, Role::Assistant);
    assert_eq!(contents(&turns), vec!["q1", "a1"]);
}

#[test]
fn test_oldest_turns_evicted_first() {
    let store = HistoryStore::new(5);
    store.append("q1", "a1");
    store.append("q2", "a2");
    store.append("q3", "a3");

    assert_eq!(store.len(), 5);
    assert_eq!(contents(&store.snapshot(5)), vec!["a1", "q2", "a2", "q3", "a3"]);
}

#[test]
fn test_snapshot_limits() {
    let store = HistoryStore::new(10);
    store.append("q1", "a1");
    store.append("q2", "a2");

    assert!(store.snapshot(0).is_empty());
    assert_eq!(contents(&store.snapshot(3)), vec!["a1", "q2", "a2"]);
    assert_eq!(store.snapshot(50).len(), 4);
}

#[test]
fn test_zero_capacity_keeps_nothing() {
    let store = HistoryStore::new(0);
    store.append("q1", "a1");
    assert!(store.is_empty());
}

#[test]
fn test_shrinking_capacity_trims_oldest() {
    let store = HistoryStore::new(6);
    store.append("q1", "a1");
    store.append("q2", "a2");
    store.append("q3", "a3");

    store.set_capacity(2);
    assert_eq!(store.capacity(), 2);
    assert_eq!(contents(&store.snapshot(10)), vec!["q3", "a3"]);
}

#[test]
fn test_clear() {
    let store = HistoryStore::new(4);
    store.append("q1", "a1");
    store.clear();

    assert!(store.is_empty());
    assert!(store.snapshot(4).is_empty());
}

#[test]
fn test_append_with_capacity_applies_new_capacity() {
    let store = HistoryStore::new(6);
    store.append("q1", "a1");
    store.append("q2", "a2");
    store.append("q3", "a3");

    store.append_with_capacity("q4", "a4", 2);
    assert_eq!(store.capacity(), 2);
    assert_eq!(contents(&store.snapshot(10)), vec!["q4", "a4"]);

    store.append_with_capacity("q5", "a5", 4);
    assert_eq!(contents(&store.snapshot(10)), vec!["q4", "a4", "q5", "a5"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_keep_pairs_together() {
    let store = std::sync::Arc::new(HistoryStore::new(50));

    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.append(&format!("q{i}"), &format!("a{i}")) })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let turns = store.snapshot(50);
    assert_eq!(turns.len(), 40);
    for pair in turns.chunks(2) {
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(pair[1].role, Role::Assistant);
        assert_eq!(pair[0].content[1..], pair[1].content[1..]);
    }
}

proptest! {
    #[test]
    fn prop_length_bounded_and_snapshot_is_suffix(
        capacity in 0usize..=50,
        exchanges in 0usize..40,
        limit in 0usize..60,
    ) {
        let store = HistoryStore::new(capacity);
        let mut all = Vec::new();
        for i in 0..exchanges {
            let (q, a) = (format!("q{i}"), format!("a{i}"));
            store.append(&q, &a);
            all.push(q);
            all.push(a);
            prop_assert!(store.len() <= capacity);
        }

        let kept = all.len().min(capacity);
        let expected_len = kept.min(limit);
        let expected: Vec<&str> = all[all.len() - expected_len..]
            .iter()
            .map(String::as_str)
            .collect();

        let snapshot = store.snapshot(limit);
        prop_assert_eq!(contents(&snapshot), expected);
    }
}
