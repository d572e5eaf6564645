//! Vehicle damage inspection server library.
//!
//! Inspection sessions, photo intake with vision-based validation, and a
//! background damage analysis worker, served over actix-web.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
