// src/services/mod.rs
pub mod chat;
pub mod stats;

pub use chat::ChatService;
