//! # IO Module
//!
//! Interface layer exposing the game to a UI. Only an HTTP REST surface is
//! shipped; it translates requests into [`crate::domain::GameService`] calls
//! and domain errors into HTTP status codes.

pub mod rest;
