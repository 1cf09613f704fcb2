//! TechMan - Equipment tracking for the workshop floor
//!
//! This library provides the core functionality for the TechMan equipment
//! tracker: access-code authentication, the equipment catalog, and the
//! maintenance comment trail.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
