pub mod analytics;
pub mod client;
pub mod stage_history;
pub mod timeline;
pub mod validate;
