pub mod activities;
pub mod analytics;
pub mod clients;
pub mod import;
pub mod services_catalog;
pub mod stage_history;
pub mod users;
