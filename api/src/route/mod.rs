pub mod admin;
pub mod event;
pub mod health;
pub mod slot;
pub mod v1;
