//! # medtwin-core
//!
//! Foundation types for the medtwin voice assistant.
//!
//! This crate provides the shared vocabulary the other medtwin crates depend on:
//!
//! - **Wire events**: [`events::ServerEvent`] from the realtime peer,
//!   [`events::ClientEvent`] sent back over the data channel
//! - **Session configuration payloads**: [`events::SessionConfig`] and
//!   [`events::TurnDetection`]
//! - **Transcript ledger**: [`transcript::TranscriptLedger`] — append/update log
//!   of conversation items and breadcrumbs
//! - **Languages**: [`languages::Language`] enumerated vocabulary and
//!   [`languages::LanguagesContext`] for the translation loop
//! - **Settings**: [`settings::RealtimeSettings`] compiled defaults with an
//!   optional JSON overlay
//! - **Logging**: [`logging::init`] tracing-subscriber setup
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by medtwin-agents and medtwin-runtime.

#![deny(unsafe_code)]

pub mod events;
pub mod languages;
pub mod logging;
pub mod settings;
pub mod transcript;
