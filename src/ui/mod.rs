//! Terminal UI components

pub mod conversation;
pub mod gradient;
