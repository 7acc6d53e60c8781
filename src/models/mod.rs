pub mod course;
pub mod watch;

pub use course::{CourseInfo, SeatCounts};
pub use watch::{AddableResponse, SetConfigRequest, WatchRequest, WatchedCourse};
