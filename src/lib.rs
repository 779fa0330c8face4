pub mod dynamb;
pub mod error;
pub mod filtering;
