//! Database initialization for the favorites service

pub mod init;

pub use init::*;
