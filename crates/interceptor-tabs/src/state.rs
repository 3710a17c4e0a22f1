//! Restoration state machine
//!
//! ```text
//! Uninitialized
//!   ↓ defaults loaded
//! DefaultsLoaded
//!   ↓ stored origin found      ↓ nothing stored
//! RestoredFromStorage         EmptyNoMatch
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreState {
    /// No session entry exists for the tab yet
    Uninitialized,
    /// Baseline session entry established
    DefaultsLoaded,
    /// A stored origin was replayed into the tab
    RestoredFromStorage,
    /// No stored origin matched (or it could not be read)
    EmptyNoMatch,
}

impl RestoreState {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: RestoreState) -> bool {
        match (self, target) {
            (RestoreState::Uninitialized, RestoreState::DefaultsLoaded) => true,
            (RestoreState::DefaultsLoaded, RestoreState::RestoredFromStorage) => true,
            (RestoreState::DefaultsLoaded, RestoreState::EmptyNoMatch) => true,
            (a, b) if *a == b => true,
            _ => false,
        }
    }

    /// Returns true once restoration has reached an end state
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            RestoreState::RestoredFromStorage | RestoreState::EmptyNoMatch
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RestoreState::Uninitialized => "uninitialized",
            RestoreState::DefaultsLoaded => "defaults_loaded",
            RestoreState::RestoredFromStorage => "restored_from_storage",
            RestoreState::EmptyNoMatch => "empty_no_match",
        }
    }
}

impl std::fmt::Display for RestoreState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert!(RestoreState::Uninitialized.can_transition_to(RestoreState::DefaultsLoaded));
        assert!(RestoreState::DefaultsLoaded.can_transition_to(RestoreState::RestoredFromStorage));
        assert!(RestoreState::DefaultsLoaded.can_transition_to(RestoreState::EmptyNoMatch));
    }

    #[test]
    fn test_invalid_transitions() {
        // Defaults always come first
        assert!(!RestoreState::Uninitialized.can_transition_to(RestoreState::RestoredFromStorage));
        // End states are final
        assert!(!RestoreState::EmptyNoMatch.can_transition_to(RestoreState::RestoredFromStorage));
        assert!(!RestoreState::RestoredFromStorage.can_transition_to(RestoreState::DefaultsLoaded));
    }

    #[test]
    fn test_settled() {
        assert!(!RestoreState::DefaultsLoaded.is_settled());
        assert!(RestoreState::EmptyNoMatch.is_settled());
    }
}
