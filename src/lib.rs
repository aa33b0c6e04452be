//! # FAQ Harness
//!
//! A bilingual (English/Vietnamese) FAQ assistant built around a keyword
//! retrieval core.
//!
//! A question is normalized across languages, scored against a small FAQ
//! corpus and a few topic snippets, and the top matches are assembled into a
//! context. An answer generator turns that context (plus optional function
//! calls for weather, traffic, restaurants, and AWS cost questions) into an
//! answer, and the exchange is saved to the user's history.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────────┐   ┌─────────────┐   ┌───────────┐
//! │ question │──▶│ faq-harness-core │──▶│  generator  │──▶│   store   │
//! │          │   │ normalize+score  │   │ intent+fns  │   │ user JSON │
//! └──────────┘   └──────────────────┘   └─────────────┘   └───────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! faq context "Amazon EC2 Auto Scaling là gì?" --explain
//! faq ask alice "What is Amazon EC2 Auto Scaling?"
//! faq batch alice questions.txt
//! faq chat --user alice
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`knowledge`] | Corpus loading and the shared retrieval tables |
//! | [`store`] | Per-user history backends |
//! | [`functions`] | Side functions and their schemas |
//! | [`intent`] | Question intent analysis |
//! | [`generator`] | Answer generation |
//! | [`chat`] | The ask pipeline, single and batch |
//! | [`commands`] | CLI command implementations |

pub mod chat;
pub mod commands;
pub mod config;
pub mod functions;
pub mod generator;
pub mod intent;
pub mod knowledge;
pub mod store;

