//! Generative-AI toolkit for an artisan marketplace
//!
//! Wraps a Gemini backend to write and render video advertisements, design
//! custom products with a predicted price, and analyse a product's sales
//! potential. Video jobs run as long-running operations that are polled until
//! they finish, time out, or are cancelled.

pub mod ai;
pub mod app;
pub mod audio;
pub mod error;
pub mod flows;
pub mod history;
pub mod models;
pub mod operation;
pub mod poller;
pub mod prompts;

pub use error::{Error, Result};
