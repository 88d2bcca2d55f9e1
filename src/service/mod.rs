//! Survey and submission operations, shared by the HTTP handlers.

pub mod answer;
pub mod survey;
