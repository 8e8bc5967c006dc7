//! Reelshelf - TMDB access layer for a movie cataloguing app
//!
//! This library crate exposes the metadata services and their configuration.

pub mod config;
pub mod metadata;
