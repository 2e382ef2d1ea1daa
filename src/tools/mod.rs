//! fuelplan tools module
//!
//! MCP tool implementations for the nutrition targeting engine.

pub mod recommend;
pub mod status;
pub mod targets;
pub mod training;
