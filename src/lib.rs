//! Terminal client for AI interview practice.
//!
//! Connects a transcript backend and the Gemini generateContent endpoint
//! to a chat view: load history, send an answer, show the interviewer's
//! feedback and next question, persist both turns.

pub mod app;
pub mod backend;
pub mod config;
pub mod controller;
pub mod gemini;
pub mod model;
pub mod prompts;
pub mod ui;
