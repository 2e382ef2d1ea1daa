//! fuelplan Library
//!
//! Core functionality for training-aware nutrition targeting: daily
//! energy and macro budgets, per-meal distribution around training, and
//! meal recommendation scoring.

pub mod build_info;
pub mod engine;
pub mod mcp;
pub mod models;
pub mod tools;
