pub mod kv;
pub mod notifier;
pub mod reconciler;
pub mod repository;
pub mod retry;
pub mod sensor;
