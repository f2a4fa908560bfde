pub mod analyze;
pub mod interactive;
