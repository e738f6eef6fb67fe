// --- File: crates/elements_booking/src/lib.rs ---
pub mod doc;
pub mod handlers;
pub mod logic;
pub mod routes;
#[cfg(test)]
mod routes_test;
pub mod views;

pub use handlers::BookingState;
pub use routes::routes;
