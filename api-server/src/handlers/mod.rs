//! HTTP handlers

pub mod features;
pub mod health;
pub mod model;
pub mod predict;
