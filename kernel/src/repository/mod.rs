pub mod health;
pub mod ledger;
pub mod notification;
pub mod reservation;
pub mod sensor;
