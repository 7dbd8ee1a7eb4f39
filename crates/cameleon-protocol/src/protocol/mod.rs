//! Cameleon Protocol Layer
//!
//! This module defines the protocol-level types shared by the transport and
//! the client: the error taxonomy, the reserved wire sentinels, the schedule
//! model and the message DTOs.
//!
//! # Components
//!
//! - [`error`] - Error taxonomy ([`CameleonError`], [`Result`])
//! - [`constants`] - Reserved sentinel strings of the remote protocol
//! - [`schedule`] - Schedule descriptors ([`EventTime`], [`UpdateTime`])
//! - [`messages`] - Request/response DTOs and [`MixedResult`]

pub mod constants;
pub mod error;
pub mod messages;
pub mod schedule;

pub use error::{CameleonError, Result};
pub use messages::{
    CredentialStatus, CurrentMessage, GlobalMessage, MessagePhase, MixedResult, ScheduledMessage,
    SetMessageResponse, SignError, SignInfo, UpdateStatus,
};
pub use schedule::{Days, EventTime, EventType, UpdateTime};
