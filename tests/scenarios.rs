//! End-to-end scenarios (S1-S6) over an in-memory SQLite store and a
//! wiremock-mocked Fetcher endpoint, hitting no live network or database.

use std::time::Duration;

use feedkeep_backend::db::Store;
use feedkeep_backend::services::task::Task;
use feedkeep_backend::services::{Fetcher, FollowService, Scheduler};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn rss(title: &str, item_title: &str, item_link: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
<title>{title}</title>
<item><title>{item_title}</title><link>{item_link}</link></item>
</channel></rss>"#
    )
}

async fn store_with_user(username: &str) -> (Store, FollowService) {
    let store = Store::connect_in_memory().await.unwrap();
    store.create_user(username).await.unwrap();
    let service = FollowService::new(store.clone(), Fetcher::new());
    (store, service)
}

/// S1 - follow new feed creates one feed, one posting, one follow row.
#[tokio::test]
async fn s1_follow_new_feed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/f"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss("F", "P", "http://x/p1")))
        .mount(&mock_server)
        .await;
    let link = format!("{}/f", mock_server.uri());

    let (store, service) = store_with_user("alice").await;
    let feed = service.follow("alice", &link).await.unwrap();

    let user = store.get_user_by_username("alice").await.unwrap().unwrap();
    assert!(store.is_following(user.pk, feed.pk).await.unwrap());

    let (_, postings) = store.get_feed_by_pk(feed.pk).await.unwrap().unwrap();
    assert_eq!(postings.len(), 1);
    assert_eq!(postings[0].link, "http://x/p1");
}

/// S2 - following the same feed twice performs at most one fetch and leaves
/// a single follow row.
#[tokio::test]
async fn s2_follow_duplicate_is_idempotent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/f"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss("F", "P", "http://x/p1")))
        .expect(1)
        .mount(&mock_server)
        .await;
    let link = format!("{}/f", mock_server.uri());

    let (store, service) = store_with_user("alice").await;
    let first = service.follow("alice", &link).await.unwrap();
    let second = service.follow("alice", &link).await.unwrap();
    assert_eq!(first.pk, second.pk);

    let user = store.get_user_by_username("alice").await.unwrap().unwrap();
    assert!(store.is_following(user.pk, first.pk).await.unwrap());

    mock_server.verify().await;
}

/// S3 - marking a posting read without following its feed fails and leaves
/// no read row.
#[tokio::test]
async fn s3_mark_read_without_follow_fails() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/f"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss("F", "P", "http://x/p1")))
        .mount(&mock_server)
        .await;
    let link = format!("{}/f", mock_server.uri());

    // ingest the feed under alice so the posting exists, but test as bob who
    // never follows it.
    let store = Store::connect_in_memory().await.unwrap();
    store.create_user("alice").await.unwrap();
    store.create_user("bob").await.unwrap();
    let service = FollowService::new(store.clone(), Fetcher::new());
    service.follow("alice", &link).await.unwrap();

    let result = service.mark_read("bob", "http://x/p1").await;
    assert!(result.is_err());

    let posting = store.get_posting_by_link("http://x/p1").await.unwrap().unwrap();
    let bob = store.get_user_by_username("bob").await.unwrap().unwrap();
    assert!(!store.is_read(bob.pk, posting.pk).await.unwrap());
}

/// S4 - unfollow clears the user's read rows but leaves Feed/Posting intact.
#[tokio::test]
async fn s4_unfollow_clears_reads_but_keeps_rows() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/f"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss("F", "P", "http://x/p1")))
        .mount(&mock_server)
        .await;
    let link = format!("{}/f", mock_server.uri());

    let (store, service) = store_with_user("alice").await;
    let feed = service.follow("alice", &link).await.unwrap();
    service.mark_read("alice", "http://x/p1").await.unwrap();

    service.unfollow("alice", &link).await.unwrap();

    let alice = store.get_user_by_username("alice").await.unwrap().unwrap();
    assert!(!store.is_following(alice.pk, feed.pk).await.unwrap());

    let posting = store.get_posting_by_link("http://x/p1").await.unwrap().unwrap();
    assert!(!store.is_read(alice.pk, posting.pk).await.unwrap());

    // Feed and posting rows themselves are untouched.
    assert!(store.get_feed_by_link(&link).await.unwrap().is_some());
    assert!(store.get_posting_by_link("http://x/p1").await.unwrap().is_some());
}

/// S5 - a sweep of two active feeds (and one inactive, untouched) leaves both
/// active feeds still active with titles reflecting the mocked snapshot.
#[tokio::test]
async fn s5_scheduler_sweep_refreshes_active_feeds() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/f1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss("F1 Updated", "P1", "http://x/p1")))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/f2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss("F2 Updated", "P2", "http://x/p2")))
        .mount(&mock_server)
        .await;

    let link1 = format!("{}/f1", mock_server.uri());
    let link2 = format!("{}/f2", mock_server.uri());
    let link3 = "http://unreachable.invalid/f3".to_string();

    let store = Store::connect_in_memory().await.unwrap();
    let fetcher = Fetcher::new();
    store.upsert_feed_with_postings(
        &feedkeep_backend::models::feed::FeedSnapshot {
            link: link1.clone(),
            title: "F1".to_string(),
            lang: "-".to_string(),
            copyright_text: "-".to_string(),
            description: "-".to_string(),
            category: "-".to_string(),
        },
        &[],
    ).await.unwrap();
    store.upsert_feed_with_postings(
        &feedkeep_backend::models::feed::FeedSnapshot {
            link: link2.clone(),
            title: "F2".to_string(),
            lang: "-".to_string(),
            copyright_text: "-".to_string(),
            description: "-".to_string(),
            category: "-".to_string(),
        },
        &[],
    ).await.unwrap();
    let feed3_pk = store.upsert_feed_with_postings(
        &feedkeep_backend::models::feed::FeedSnapshot {
            link: link3.clone(),
            title: "F3".to_string(),
            lang: "-".to_string(),
            copyright_text: "-".to_string(),
            description: "-".to_string(),
            category: "-".to_string(),
        },
        &[],
    ).await.unwrap();
    store.set_feed_active(feed3_pk, false).await.unwrap();

    let shutdown = CancellationToken::new();
    let scheduler = Scheduler::new(store.clone(), fetcher, Duration::from_secs(300), shutdown.clone());
    let handle = tokio::spawn(scheduler.run());

    // The scheduler's first tick fires immediately; give the two concurrent
    // Tasks time to complete their single successful fetch against the local
    // mock server before tearing the scheduler down.
    tokio::time::sleep(Duration::from_millis(300)).await;
    shutdown.cancel();
    handle.await.unwrap();

    let feed1 = store.get_feed_by_link(&link1).await.unwrap().unwrap();
    let feed2 = store.get_feed_by_link(&link2).await.unwrap().unwrap();
    let feed3 = store.get_feed_by_link(&link3).await.unwrap().unwrap();

    assert!(feed1.active);
    assert_eq!(feed1.title, "F1 Updated");
    assert!(feed2.active);
    assert_eq!(feed2.title, "F2 Updated");
    // The inactive feed was never picked up by the sweep.
    assert!(!feed3.active);
    assert_eq!(feed3.title, "F3");
}

/// S6 - a feed whose fetch always fails is deactivated after the first
/// attempt and remains deactivated once all three attempts are exhausted.
#[tokio::test(start_paused = true)]
async fn s6_three_failures_leave_feed_deactivated() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dead"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;
    let link = format!("{}/dead", mock_server.uri());

    let store = Store::connect_in_memory().await.unwrap();
    let feed_pk = store
        .upsert_feed_with_postings(
            &feedkeep_backend::models::feed::FeedSnapshot {
                link: link.clone(),
                title: "-".to_string(),
                lang: "-".to_string(),
                copyright_text: "-".to_string(),
                description: "-".to_string(),
                category: "-".to_string(),
            },
            &[],
        )
        .await
        .unwrap();

    let task = Task::new(
        store.clone(),
        Fetcher::new(),
        feed_pk,
        link,
        CancellationToken::new(),
    );

    let succeeded = task.run().await.unwrap();
    assert!(!succeeded);

    let feed = store.get_feed_by_pk(feed_pk).await.unwrap().unwrap().0;
    assert!(!feed.active);

    mock_server.verify().await;
}
