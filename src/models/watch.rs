use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A watched course joined with its last-known availability.
/// `available` is `None` until the first successful poll.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WatchedCourse {
    pub crn: String,
    pub available: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchRequest {
    pub user: String,
    pub crn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddableResponse {
    pub crn: String,
    pub addable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetConfigRequest {
    pub value: String,
}
