pub mod config;
pub mod error;
pub mod logging;
pub mod router;
pub mod source;
