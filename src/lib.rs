//! Library crate for gameplane-api, exposing modules for binaries and integration tests.

pub mod cluster;
pub mod config;
pub mod dto;
pub mod error;
pub mod quantity;
pub mod resource;
pub mod routes;
pub mod services;
pub mod state;
