pub mod pending;
pub mod time;
