//! Domain models

pub mod reservation;
pub mod review;
pub mod tool;
