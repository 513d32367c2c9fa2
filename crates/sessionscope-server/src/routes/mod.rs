pub mod activity;
pub mod health;
