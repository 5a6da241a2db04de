//! Saga state machine for the VC-provisioning workflow.
//!
//! Each step commits independently on chain and is never rolled back;
//! overall success requires all three. The explicit state machine exists so
//! a retry resumes from the last completed step instead of restarting
//! blindly.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ProvisionError;

/// The three service-provisioning steps, in execution order. Strictly
/// sequential per identity: the registry keeps a single change pointer and
/// concurrent writes from one signer race at the account layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvisionStep {
    CredentialRepository,
    RevocationService,
    UniversalResolver,
}

impl ProvisionStep {
    pub const ALL: [ProvisionStep; 3] = [
        Self::CredentialRepository,
        Self::RevocationService,
        Self::UniversalResolver,
    ];

    /// Service name used in the attribute key and descriptor.
    pub fn service_name(&self) -> &'static str {
        match self {
            Self::CredentialRepository => "CredentialRepository",
            Self::RevocationService => "RevocationService",
            Self::UniversalResolver => "UniversalResolver",
        }
    }

    /// The step after this one.
    pub fn next(&self) -> Option<ProvisionStep> {
        match self {
            Self::CredentialRepository => Some(Self::RevocationService),
            Self::RevocationService => Some(Self::UniversalResolver),
            Self::UniversalResolver => None,
        }
    }
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.service_name())
    }
}

/// Saga state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvisionState {
    NotStarted,
    /// The given step (and everything before it) has committed.
    StepDone(ProvisionStep),
    Completed,
    /// The given step failed; earlier steps stay committed. Resumable.
    Failed(ProvisionStep),
}

impl ProvisionState {
    /// Only `Completed` is final — a failed saga resumes from the failed
    /// step.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for ProvisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "NotStarted"),
            Self::StepDone(step) => write!(f, "StepDone({})", step),
            Self::Completed => write!(f, "Completed"),
            Self::Failed(step) => write!(f, "Failed({})", step),
        }
    }
}

/// Events driving the saga.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionEvent {
    StepSucceeded(ProvisionStep),
    StepFailed(ProvisionStep),
}

impl fmt::Display for ProvisionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StepSucceeded(step) => write!(f, "StepSucceeded({})", step),
            Self::StepFailed(step) => write!(f, "StepFailed({})", step),
        }
    }
}

/// Manages saga state transitions.
///
/// Valid transitions:
/// - NotStarted → StepDone(CredentialRepository) | Failed(CredentialRepository)
/// - StepDone(CredentialRepository) → StepDone(RevocationService) | Failed(RevocationService)
/// - StepDone(RevocationService) → Completed | Failed(UniversalResolver)
/// - Failed(s) → state after s succeeds | Failed(s)
pub struct ProvisionStateMachine;

impl ProvisionStateMachine {
    /// The step a runner should execute next, or `None` when done.
    pub fn next_step(state: ProvisionState) -> Option<ProvisionStep> {
        match state {
            ProvisionState::NotStarted => Some(ProvisionStep::CredentialRepository),
            ProvisionState::StepDone(step) => step.next(),
            ProvisionState::Failed(step) => Some(step),
            ProvisionState::Completed => None,
        }
    }

    /// Attempt a transition. Out-of-order step completions are rejected.
    pub fn transition(
        current: ProvisionState,
        event: ProvisionEvent,
    ) -> Result<ProvisionState, ProvisionError> {
        let expected = Self::next_step(current);
        let (step, succeeded) = match event {
            ProvisionEvent::StepSucceeded(step) => (step, true),
            ProvisionEvent::StepFailed(step) => (step, false),
        };

        if expected != Some(step) {
            return Err(ProvisionError::InvalidTransition {
                from: current.to_string(),
                event: event.to_string(),
            });
        }

        let next = if !succeeded {
            ProvisionState::Failed(step)
        } else if step.next().is_none() {
            ProvisionState::Completed
        } else {
            ProvisionState::StepDone(step)
        };

        tracing::debug!(from = %current, to = %next, event = %event, "saga transition");
        Ok(next)
    }
}
