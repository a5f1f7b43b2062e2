pub mod id;
pub mod ledger;
pub mod notification;
pub mod occupancy;
pub mod password;
pub mod reservation;
pub mod sensor;
pub mod validation;
pub mod view;
