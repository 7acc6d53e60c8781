use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;

use crnwatch::banner::RegistrationApi;
use crnwatch::db::{MIGRATOR, WatchStore};
use crnwatch::error::AppError;
use crnwatch::models::{CourseInfo, SeatCounts};
use crnwatch::services::{DESTINATION_KEY, NoopSink, NotificationSink, SeatMonitor};

/// Registration double scripted per CRN: a fixed addability, a failure,
/// or nothing (course does not exist).
#[derive(Default)]
struct ScriptedRegistration {
    addable: HashMap<String, bool>,
    failing: HashSet<String>,
}

impl ScriptedRegistration {
    fn with_course(mut self, crn: &str, addable: bool) -> Self {
        self.addable.insert(crn.to_string(), addable);
        self
    }

    fn with_failure(mut self, crn: &str) -> Self {
        self.failing.insert(crn.to_string());
        self
    }
}

#[async_trait]
impl RegistrationApi for ScriptedRegistration {
    async fn fetch_info(&self, crn: &str) -> Result<Option<CourseInfo>, AppError> {
        if self.failing.contains(crn) {
            return Err(AppError::Unparseable("scripted failure".to_string()));
        }

        Ok(self.addable.get(crn).map(|&addable| {
            let (seats, waitlist) = if addable {
                (
                    SeatCounts { capacity: 10, actual: 5, remaining: 5 },
                    SeatCounts { capacity: 10, actual: 2, remaining: 0 },
                )
            } else {
                (
                    SeatCounts { capacity: 10, actual: 10, remaining: 0 },
                    SeatCounts { capacity: 10, actual: 10, remaining: 0 },
                )
            };
            CourseInfo { title: format!("Course {}", crn), seats, waitlist }
        }))
    }
}

#[derive(Default)]
struct RecordingSink {
    sent: Mutex<Vec<(String, String, Vec<String>)>>,
}

impl RecordingSink {
    fn sent(&self) -> Vec<(String, String, Vec<String>)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(
        &self,
        destination: &str,
        text: &str,
        mention_targets: &[String],
    ) -> Result<(), AppError> {
        self.sent.lock().unwrap().push((
            destination.to_string(),
            text.to_string(),
            mention_targets.to_vec(),
        ));
        Ok(())
    }
}

async fn store() -> WatchStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create database");

    MIGRATOR.run(&pool).await.expect("Failed to run migrations");

    WatchStore::new(pool)
}

fn monitor(
    store: WatchStore,
    registration: ScriptedRegistration,
    sink: Arc<RecordingSink>,
) -> SeatMonitor {
    SeatMonitor::new(store, Arc::new(registration), sink, 1)
}

#[tokio::test]
async fn tick_is_a_noop_without_a_destination() {
    let store = store().await;
    store.add_watch("u1", "12345").await.unwrap();

    let sink = Arc::new(RecordingSink::default());
    let monitor = monitor(
        store.clone(),
        ScriptedRegistration::default().with_course("12345", true),
        sink.clone(),
    );

    let stats = monitor.run_tick().await.unwrap();
    assert!(stats.is_none());
    assert!(sink.sent().is_empty());
    // Nothing was polled, so nothing was cached either.
    assert_eq!(store.availability_of("12345").await.unwrap(), None);
}

#[tokio::test]
async fn first_successful_poll_always_announces() {
    let store = store().await;
    store.add_watch("u1", "12345").await.unwrap();
    store.set_config(DESTINATION_KEY, "dest").await.unwrap();

    let sink = Arc::new(RecordingSink::default());
    let monitor = monitor(
        store.clone(),
        ScriptedRegistration::default().with_course("12345", false),
        sink.clone(),
    );

    let stats = monitor.run_tick().await.unwrap().expect("tick ran");
    assert_eq!(stats.transitions, 1);

    let sent = sink.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, "Class 12345 is no longer addable.");
    assert_eq!(store.availability_of("12345").await.unwrap(), Some(false));
}

#[tokio::test]
async fn transition_announces_exactly_once() {
    let store = store().await;
    store.add_watch("u1", "12345").await.unwrap();
    store.add_watch("u2", "12345").await.unwrap();
    store.set_config(DESTINATION_KEY, "dest").await.unwrap();
    // Last known state: closed.
    store.set_availability("12345", false).await.unwrap();

    let sink = Arc::new(RecordingSink::default());
    let monitor = monitor(
        store.clone(),
        ScriptedRegistration::default().with_course("12345", true),
        sink.clone(),
    );

    let stats = monitor.run_tick().await.unwrap().expect("tick ran");
    assert_eq!(stats.transitions, 1);
    assert_eq!(store.availability_of("12345").await.unwrap(), Some(true));

    let sent = sink.sent();
    assert_eq!(sent.len(), 1);
    let (destination, text, mentions) = &sent[0];
    assert_eq!(destination, "dest");
    assert_eq!(text, "Class 12345 can be added!");
    assert_eq!(mentions, &vec!["u1".to_string(), "u2".to_string()]);

    // Steady state: a second tick with no change announces nothing.
    let stats = monitor.run_tick().await.unwrap().expect("tick ran");
    assert_eq!(stats.transitions, 0);
    assert_eq!(sink.sent().len(), 1);
}

#[tokio::test]
async fn unchanged_state_stays_quiet() {
    let store = store().await;
    store.add_watch("u1", "12345").await.unwrap();
    store.set_config(DESTINATION_KEY, "dest").await.unwrap();
    store.set_availability("12345", true).await.unwrap();

    let sink = Arc::new(RecordingSink::default());
    let monitor = monitor(
        store.clone(),
        ScriptedRegistration::default().with_course("12345", true),
        sink.clone(),
    );

    let stats = monitor.run_tick().await.unwrap().expect("tick ran");
    assert_eq!(stats.transitions, 0);
    assert!(sink.sent().is_empty());
}

#[tokio::test]
async fn one_failing_course_does_not_abort_the_tick() {
    let store = store().await;
    store.add_watch("u1", "11111").await.unwrap();
    store.add_watch("u2", "22222").await.unwrap();
    store.set_config(DESTINATION_KEY, "dest").await.unwrap();
    store.set_availability("22222", false).await.unwrap();

    let sink = Arc::new(RecordingSink::default());
    let monitor = monitor(
        store.clone(),
        ScriptedRegistration::default()
            .with_failure("11111")
            .with_course("22222", true),
        sink.clone(),
    );

    let stats = monitor.run_tick().await.unwrap().expect("tick ran");
    assert_eq!(stats.courses, 2);
    assert_eq!(stats.failures, 1);
    assert_eq!(stats.transitions, 1);

    let sent = sink.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, "Class 22222 can be added!");

    // The failed course keeps its previous (unknown) state for the next tick.
    assert_eq!(store.availability_of("11111").await.unwrap(), None);
    assert_eq!(store.availability_of("22222").await.unwrap(), Some(true));
}

#[tokio::test]
async fn transitions_persist_regardless_of_the_sink() {
    let store = store().await;
    store.add_watch("u1", "12345").await.unwrap();
    store.set_config(DESTINATION_KEY, "dest").await.unwrap();

    let monitor = SeatMonitor::new(
        store.clone(),
        Arc::new(ScriptedRegistration::default().with_course("12345", true)),
        Arc::new(NoopSink),
        1,
    );

    let stats = monitor.run_tick().await.unwrap().expect("tick ran");
    assert_eq!(stats.transitions, 1);
    assert_eq!(store.availability_of("12345").await.unwrap(), Some(true));
}

#[tokio::test]
async fn missing_course_counts_as_a_failure_not_a_transition() {
    let store = store().await;
    // Watched, but the registration system has no record for it.
    store.add_watch("u1", "40404").await.unwrap();
    store.set_config(DESTINATION_KEY, "dest").await.unwrap();

    let sink = Arc::new(RecordingSink::default());
    let monitor = monitor(store.clone(), ScriptedRegistration::default(), sink.clone());

    let stats = monitor.run_tick().await.unwrap().expect("tick ran");
    assert_eq!(stats.failures, 1);
    assert_eq!(stats.transitions, 0);
    assert!(sink.sent().is_empty());
}
