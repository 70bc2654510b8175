//! Incident lifecycle workflow for chat-driven incident management.
//!
//! This crate provides the platform-neutral core of the incident manager:
//!
//! - Memorable, date-stamped incident names ([`IncidentName`])
//! - Block Kit message content for incident and broadcast channels ([`messages`])
//! - Modal definitions and typed submission parsing ([`views`])
//! - A wait-for-all fan-out primitive with partial-failure reporting ([`FanOut`])
//! - Collaborator interfaces for the chat, paging and document platforms ([`platform`])
//! - The [`Coordinator`] that sequences creation and resolution
//!
//! # Architecture
//!
//! ```text
//! /incident ──► Coordinator::open_creation_form ──► ChatPlatform::open_view
//! submit    ──► Coordinator::create_incident
//!                 ├─ ChatPlatform::create_channel
//!                 ├─ PagingPlatform::create_incident   (optional)
//!                 └─ FanOut: topic, bookmark, posts, invites, DM, DocumentPlatform (optional)
//!
//! /resolve-incident ──► Coordinator::request_resolution ──► ChatPlatform::open_view
//! submit            ──► Coordinator::resolve_incident
//!                         ├─ ChatPlatform::channel_info + rename_channel
//!                         └─ FanOut: broadcasts, in-channel notice
//! ```
//!
//! Platform adapters live in the `integrations` crate.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod blocks;
pub mod error;
pub mod fanout;
pub mod messages;
pub mod model;
pub mod naming;
pub mod platform;
pub mod views;
pub mod workflow;
mod words;

pub use error::{
    CallError, FanOutError, IncidentError, OperationFailure, Platform, PreconditionError,
};
pub use fanout::FanOut;
pub use model::{CreationRequest, ResolutionTrigger, Severity};
pub use naming::IncidentName;
pub use platform::{
    ChannelInfo, ChatPlatform, DocumentPlatform, OutgoingMessage, PageRequest, PageResult,
    PagingPlatform, PostmortemPage,
};
pub use workflow::{Collaborators, Coordinator, CreatedIncident, ResolvedIncident, WorkflowSettings};

/// Default prefix for incident channel names.
pub const DEFAULT_CHANNEL_PREFIX: &str = "incd-";

/// Suffix appended to an incident channel's name once it is resolved.
pub const RESOLVED_SUFFIX: &str = "-resolved";
