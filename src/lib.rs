//! # taskpilot
//!
//! To-do list service with a natural-language command interface.
//!
//! Free-text commands are translated into exactly one of five structured
//! operations (create, complete, delete, list, rename) by a language
//! model constrained to a fixed set of tool definitions, then executed
//! against an in-memory task store.
//!
//! ```text
//!  free-text command
//!        │
//!        ▼
//!  ┌────────────────────┐      ┌────────────────────┐
//!  │ CommandInterpreter │─────▶│  CommandExecutor   │
//!  │ (LLM + validation) │      │ (store resolution) │
//!  └────────────────────┘      └─────────┬──────────┘
//!                                        ▼
//!                                 ResultEnvelope
//! ```
//!
//! ## Modules
//! - `command`: interpretation and execution of structured operations
//! - `store`: the in-memory task store
//! - `llm`: OpenRouter-backed chat-completion client
//! - `api`: axum HTTP surface (command endpoint + direct CRUD)

pub mod api;
pub mod command;
pub mod config;
pub mod llm;
pub mod store;

pub use config::Config;
