//! Story server for the VENTURA text adventure.
//!
//! A player's choice comes in over HTTP, is turned into a prompt for the
//! language model, and the model's `description||option||option` reply is
//! parsed, checked and returned as the next scene.

pub mod config;
pub mod engine;
pub mod model;
pub mod server;
