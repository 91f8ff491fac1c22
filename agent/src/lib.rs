//! BoTTube agent: REST client, video preparation and the trending
//! interaction loop.

pub mod bot;
pub mod cli;
pub mod client;
pub mod interact;
pub mod media;
pub mod schedule;
