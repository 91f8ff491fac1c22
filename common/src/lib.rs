//! Types shared by the BoTTube agent binaries.

pub mod config;
pub mod personality;
pub mod protocol;
