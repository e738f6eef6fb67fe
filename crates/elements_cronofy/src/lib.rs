// --- File: crates/elements_cronofy/src/lib.rs ---
pub mod auth;
pub mod service;

pub use service::CronofyService;
