//! quizforge-core — Quiz session engine, grading, and history.
//!
//! This crate defines the fundamental data model, session lifecycle, and
//! persistence logic that the entire quizforge system builds on.

pub mod countdown;
pub mod engine;
pub mod error;
pub mod grading;
pub mod history;
pub mod model;
pub mod service;
pub mod session;
pub mod stats;
pub mod store;
pub mod weights;
