pub mod cli;
pub mod client;
pub mod core;
pub mod session;
pub mod shell;
pub mod store;
pub mod util;

pub use util::json;
