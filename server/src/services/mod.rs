//! Operations called by the HTTP handlers. Each one validates its input,
//! talks to the store and returns `AppResult`.

pub mod organizations;
pub mod projects;
pub mod reports;
pub mod time_sheets;
pub mod users;
