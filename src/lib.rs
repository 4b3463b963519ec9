//! glycowise: diabetes risk screening, diet and exercise plans, and advisory
//! chats backed by an OpenAI-style chat-completion API.

pub mod analytics;
pub mod assessment;
pub mod catalog;
pub mod chat;
pub mod cli;
pub mod config;
pub mod gateway;
pub mod web;
