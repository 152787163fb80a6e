//! Error type shared by all simulation crates.

use thiserror::Error;

use crate::enums::{Alliance, TargetStatus};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("unknown target: {0}")]
    UnknownTarget(String),
    #[error("target {0} has no motion controller")]
    NotMobile(String),
    #[error("invalid FSM transition {from} -> {to}")]
    InvalidTransition { from: String, to: String },
    #[error("invalid alliance change {from:?} -> {to:?}")]
    InvalidAlliance { from: Alliance, to: Alliance },
    #[error("invalid status change {from:?} -> {to:?}")]
    InvalidStatus { from: TargetStatus, to: TargetStatus },
    #[error("non-finite kinematics for target {0}")]
    NonFinite(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("malformed telemetry: {0}")]
    Telemetry(String),
}

pub type SimResult<T> = Result<T, SimError>;
