pub mod reservation;
pub mod slot;
