pub mod monitor;
pub mod notify;

pub use monitor::{DESTINATION_KEY, SeatMonitor, TickStats};
pub use notify::{DiscordWebhook, NoopSink, NotificationSink};
