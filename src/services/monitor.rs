use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::banner::RegistrationApi;
use crate::db::WatchStore;
use crate::error::AppError;
use crate::models::WatchedCourse;
use crate::services::notify::NotificationSink;

/// Config key holding the announcement destination. Unset means the
/// monitor idles until an operator sets it.
pub const DESTINATION_KEY: &str = "channel";

/// Polls every watched course on a fixed interval and announces
/// addability transitions.
pub struct SeatMonitor {
    store: WatchStore,
    registration: Arc<dyn RegistrationApi>,
    notifier: Arc<dyn NotificationSink>,
    interval: Duration,
}

#[derive(Debug, Default)]
pub struct TickStats {
    pub courses: usize,
    pub transitions: usize,
    pub failures: usize,
}

impl SeatMonitor {
    pub fn new(
        store: WatchStore,
        registration: Arc<dyn RegistrationApi>,
        notifier: Arc<dyn NotificationSink>,
        interval_secs: u64,
    ) -> Self {
        Self {
            store,
            registration,
            notifier,
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Run ticks forever. A failed tick is logged and the loop keeps
    /// going; there is no retry beyond the next scheduled interval.
    pub async fn start(self) {
        info!("Starting seat monitor (interval: {:?})", self.interval);

        loop {
            tokio::time::sleep(self.interval).await;

            match self.run_tick().await {
                Ok(Some(stats)) => {
                    info!(
                        "Poll completed - {} courses, {} transitions, {} failures",
                        stats.courses, stats.transitions, stats.failures
                    );
                }
                Ok(None) => {
                    debug!("No announcement destination configured, skipping poll");
                }
                Err(e) => {
                    warn!("Poll tick failed: {:?}", e);
                }
            }
        }
    }

    /// One poll cycle. Returns `Ok(None)` when no destination is
    /// configured (the tick is a no-op, not an error). Courses are
    /// processed sequentially so writes for a given course are ordered;
    /// one course's failure never aborts the rest of the tick.
    pub async fn run_tick(&self) -> Result<Option<TickStats>, AppError> {
        let Some(destination) = self.store.get_config(DESTINATION_KEY).await? else {
            return Ok(None);
        };

        let courses = self.store.distinct_watched_courses().await?;
        let mut stats = TickStats { courses: courses.len(), ..TickStats::default() };

        for course in &courses {
            match self.check_course(&destination, course).await {
                Ok(true) => stats.transitions += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!("Error while checking {}: {:?}", course.crn, e);
                    stats.failures += 1;
                }
            }
        }

        Ok(Some(stats))
    }

    /// Poll one course and announce if its addability changed since the
    /// last successful poll. A never-polled course (`available: None`)
    /// always counts as changed, so the first poll announces its state.
    /// The new state is persisted before the announcement goes out.
    async fn check_course(
        &self,
        destination: &str,
        course: &WatchedCourse,
    ) -> Result<bool, AppError> {
        let addable = self.registration.is_addable(&course.crn).await?;

        if course.available == Some(addable) {
            return Ok(false);
        }

        self.store.set_availability(&course.crn, addable).await?;

        let watchers = self.store.watchers_of(&course.crn).await?;
        let text = if addable {
            format!("Class {} can be added!", course.crn)
        } else {
            format!("Class {} is no longer addable.", course.crn)
        };

        self.notifier.notify(destination, &text, &watchers).await?;
        Ok(true)
    }
}
