pub mod analytics;
pub mod auth;
pub mod diet;
pub mod foods;
pub mod habits;
pub mod health;
pub mod users;
pub mod water;
