//! webagent: HTTP bridge between a web-automation benchmark harness and
//! hosted LLM APIs.
//!
//! Per request: reduce the page snapshot with one LLM call, ask a second
//! call for the next browser action, parse the reply into a canonical
//! action string, and answer the harness. No state survives a request.

pub mod action;
pub mod config;
pub mod generator;
pub mod llm;
pub mod prompts;
pub mod reducer;
pub mod server;
