//! Core library for CodeXR
//!
//! This crate implements the **Functional Core** of the CodeXR assistant,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`codexr_core`** (this crate): prompt templates, wire formats and
//!   response interpretation, with no network I/O
//! - **`codexr`**: HTTP calls, credential storage, terminal output and the
//!   panel session (the Imperative Shell)
//!
//! A generation request flows through the core like this:
//!
//! 1. [`prompt::build_prompt`] renders the instruction for a [`mode::Mode`]
//! 2. [`gemini::GenerateContentRequest`] wraps it in the API envelope
//! 3. [`gemini::parse_success_body`] extracts the model text
//! 4. [`interpret::GenerationResult::interpret`] decides between a structured
//!    object and raw text
//! 5. [`snippet::SnippetSlot::record`] keeps the last insertable code
//!
//! # Module Organization
//!
//! - [`mode`]: the three request modes (plan, code, debug)
//! - [`prompt`]: prompt templates
//! - [`gemini`]: Gemini `generateContent` request/response types
//! - [`interpret`]: best-effort JSON interpretation and typed result views
//! - [`snippet`]: last-snippet slot and field preference
//! - [`sequence`]: request tickets for discarding stale responses
//! - [`panel`]: editor panel message protocol
//! - [`settings`]: layered settings resolution
//! - [`secrets`]: secret files in an explicit directory
//!
//! # Example Usage
//!
//! ```rust
//! use codexr_core::interpret::GenerationResult;
//! use codexr_core::mode::Mode;
//! use codexr_core::prompt::build_prompt;
//! use codexr_core::snippet::SnippetSlot;
//!
//! let prompt = build_prompt(Mode::Code, "Rotate a cube every frame", None);
//! assert!(prompt.contains("Rotate a cube every frame"));
//!
//! // Model text goes through the interpreter (no HTTP required)
//! let result = GenerationResult::interpret(
//!     r#"{"code":"transform.Rotate(0, 1, 0);","explanation":"Spins on Y"}"#.to_string(),
//! );
//!
//! let mut slot = SnippetSlot::new();
//! slot.record(&result);
//! assert_eq!(slot.last(), Some("transform.Rotate(0, 1, 0);"));
//! ```

pub mod gemini;
pub mod interpret;
pub mod mode;
pub mod panel;
pub mod prompt;
pub mod secrets;
pub mod sequence;
pub mod settings;
pub mod snippet;
