pub mod day;
pub mod diet_entry;
pub mod food;
pub mod habit;
pub mod profile;
pub mod user;
pub mod water;
