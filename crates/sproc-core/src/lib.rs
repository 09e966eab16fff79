pub mod analysis;
pub mod cache;
pub mod catalog;
pub mod complexity;
pub mod config;
pub mod doctor;
pub mod engine;
pub mod errors;
pub mod model;
pub mod on_error;
pub mod progress;
pub mod prompts;
pub mod providers;
pub mod report;
pub mod storage;
pub mod thresholds;
pub mod tickets;
