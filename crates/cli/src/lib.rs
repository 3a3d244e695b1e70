//! Public library modules for the CLI crate
pub mod setup;
pub mod watch;
