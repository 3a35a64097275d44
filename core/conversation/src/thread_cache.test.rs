use super::*;
use openai_sdk::ClientConfig;
use openai_sdk::NoopTelemetry;
use openai_sdk::RetryConfig;
use pretty_assertions::assert_eq;
use std::time::Duration;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;

fn client(server: &MockServer) -> Client {
    Client::new(
        ClientConfig::new("test-key")
            .base_url(server.uri())
            .retry(RetryConfig::no_retry())
            .telemetry(Arc::new(NoopTelemetry)),
    )
    .unwrap()
}

async fn mount_create_thread(server: &MockServer, thread_id: &str, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/threads"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"id": thread_id}))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_miss_creates_then_hit_reuses() {
    let server = MockServer::start().await;
    mount_create_thread(&server, "thread_1", 1).await;

    let cache = ThreadCache::new();
    let client = client(&server);

    assert_eq!(cache.get_or_create(&client, "asst_1").await.unwrap(), "thread_1");
    assert_eq!(cache.get_or_create(&client, "asst_1").await.unwrap(), "thread_1");
    assert_eq!(cache.count(), 1);
    assert_eq!(cache.get("asst_1").as_deref(), Some("thread_1"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_use_creates_one_thread() {
    let server = MockServer::start().await;
    mount_create_thread(&server, "thread_shared", 1).await;

    let cache = Arc::new(ThreadCache::new());
    let client = client(&server);

    let calls = (0..8).map(|_| {
        let cache = cache.clone();
        let client = client.clone();
        async move { cache.get_or_create(&client, "asst_1").await }
    });
    let results = futures::future::join_all(calls).await;

    for result in results {
        assert_eq!(result.unwrap(), "thread_shared");
    }
    assert_eq!(cache.count(), 1);
}

#[tokio::test]
async fn test_distinct_assistants_get_distinct_threads() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/threads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "thread_a"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "thread_b"})))
        .mount(&server)
        .await;

    let cache = ThreadCache::new();
    let client = client(&server);

    assert_eq!(cache.get_or_create(&client, "asst_a").await.unwrap(), "thread_a");
    assert_eq!(cache.get_or_create(&client, "asst_b").await.unwrap(), "thread_b");
    assert_eq!(cache.count(), 2);
}

#[tokio::test]
async fn test_failed_creation_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/threads"))
        .respond_with(ResponseTemplate::new(400))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_create_thread(&server, "thread_2", 1).await;

    let cache = ThreadCache::new();
    let client = client(&server);

    let error = cache.get_or_create(&client, "asst_1").await.unwrap_err();
    assert_eq!(error.status(), Some(400));
    assert_eq!(cache.count(), 0);

    assert_eq!(cache.get_or_create(&client, "asst_1").await.unwrap(), "thread_2");
}

#[tokio::test]
async fn test_clear_and_clear_all() {
    let server = MockServer::start().await;
    mount_create_thread(&server, "thread_1", 2).await;

    let cache = ThreadCache::new();
    let client = client(&server);

    cache.get_or_create(&client, "asst_1").await.unwrap();
    assert!(cache.clear("asst_1"));
    assert!(!cache.clear("asst_1"));
    assert_eq!(cache.count(), 0);

    // Next use creates a fresh thread.
    cache.get_or_create(&client, "asst_1").await.unwrap();
    assert_eq!(cache.count(), 1);

    cache.clear_all();
    assert_eq!(cache.count(), 0);
    cache.clear_all();
    assert_eq!(cache.count(), 0);
}

fn lock_count(cache: &ThreadCache) -> usize {
    cache.creation_locks.lock().unwrap().len()
}

#[tokio::test]
async fn test_clear_drops_idle_creation_locks() {
    let server = MockServer::start().await;
    mount_create_thread(&server, "thread_1", 3).await;

    let cache = ThreadCache::new();
    let client = client(&server);

    cache.get_or_create(&client, "asst_1").await.unwrap();
    cache.get_or_create(&client, "asst_2").await.unwrap();
    assert_eq!(lock_count(&cache), 2);

    assert!(cache.clear("asst_1"));
    assert_eq!(lock_count(&cache), 1);

    cache.clear_all();
    assert_eq!(lock_count(&cache), 0);

    // Locks are recreated on demand.
    cache.get_or_create(&client, "asst_1").await.unwrap();
    assert_eq!(lock_count(&cache), 1);
}

#[test]
fn test_clear_keeps_lock_held_by_creator() {
    let cache = ThreadCache::new();
    let held = cache.creation_lock("asst_1");
    cache.creation_lock("asst_2");

    cache.clear("asst_1");
    cache.clear_all();

    let locks = cache.creation_locks.lock().unwrap();
    assert_eq!(locks.len(), 1);
    assert!(Arc::ptr_eq(&locks["asst_1"], &held));
}

#[test]
fn test_short_id() {
    assert_eq!(short_id("asst_abcdefghijkl"), "asst_abcde");
    assert_eq!(short_id("asst_1"), "asst_1");
}
