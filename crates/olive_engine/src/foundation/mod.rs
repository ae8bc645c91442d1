//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Colors
//! - Arena handles
//! - Time management
//! - Logging utilities

pub mod math;
pub mod color;
pub mod collections;
pub mod time;
pub mod logging;
