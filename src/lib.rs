//! Scoring, timing and anti-cheat core for the FloraQuiz plant trivia game.
//!
//! The crate is a library-level subsystem: the UI/state-container layer above
//! it drives a [`services::session_service::SessionService`] and renders
//! whatever comes back. Question content, identity and rendering live
//! elsewhere; time is always read through an injected
//! [`utils::clock::Clock`], and durable state goes through the
//! [`storage`] traits.

pub mod config;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use config::GameConfig;
pub use services::GameServices;
