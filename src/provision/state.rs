//! Local machine states and their mapping from provider states.

use std::fmt;

use crate::api::InstanceStatus;

/// Provider-neutral state reported to collaborators.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MachineState {
    /// No state could be derived.
    None,
    /// Instance is being built.
    Starting,
    /// Instance is up.
    Running,
    /// Instance is paused in memory.
    Paused,
    /// Instance is suspended to disk.
    Saved,
    /// Instance is powered off.
    Stopped,
    /// Instance failed.
    Error,
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::None => "",
            Self::Starting => "Starting",
            Self::Running => "Running",
            Self::Paused => "Paused",
            Self::Saved => "Saved",
            Self::Stopped => "Stopped",
            Self::Error => "Error",
        };
        f.write_str(label)
    }
}

/// Maps a provider state onto the local state set.
#[must_use]
pub const fn machine_state(status: &InstanceStatus) -> MachineState {
    match status {
        InstanceStatus::Active => MachineState::Running,
        InstanceStatus::Paused => MachineState::Paused,
        InstanceStatus::Suspended => MachineState::Saved,
        InstanceStatus::Shutoff => MachineState::Stopped,
        InstanceStatus::Building => MachineState::Starting,
        InstanceStatus::Error => MachineState::Error,
        InstanceStatus::Unknown(_) => MachineState::None,
    }
}
