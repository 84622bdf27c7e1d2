//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls inside transaction scopes.
//! - Translate repository failures into typed business errors.

pub mod publisher_service;
