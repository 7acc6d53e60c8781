pub mod store;

pub use store::WatchStore;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
