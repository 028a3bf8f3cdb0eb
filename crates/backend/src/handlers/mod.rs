pub mod activities;
pub mod analytics;
pub mod clients;
pub mod import_export;
pub mod services;
pub mod stage_history;
