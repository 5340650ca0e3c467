pub mod activity_logs;
pub mod comments;
pub mod tasks;
pub mod users;
