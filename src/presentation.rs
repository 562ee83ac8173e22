//! Presentation state machine for content items.
//!
//! An item starts `Unseen`, becomes `Presented` when shown to the user and
//! `Dismissed` once the user closes it. States never regress, and there is no
//! way out of `Dismissed`.

use serde::{Deserialize, Serialize};

/// Visibility state of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationState {
    /// Not shown yet; eligible for presentation.
    #[default]
    Unseen,
    /// Currently or previously on screen.
    Presented,
    /// Closed by the user. Terminal.
    Dismissed,
}

impl PresentationState {
    /// Returns true if moving from `self` to `next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Unseen, Self::Presented) | (Self::Presented, Self::Dismissed)
        )
    }

    /// Returns true if no further transition exists.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Dismissed)
    }

    /// Attempts to move to `next`.
    ///
    /// Illegal requests leave the state untouched and report `Ignored`; they
    /// are not errors (a double trigger must not surface anything).
    pub fn advance(&mut self, next: Self) -> Transition {
        if self.can_transition_to(next) {
            let from = *self;
            *self = next;
            Transition::Applied { from, to: next }
        } else {
            Transition::Ignored { current: *self }
        }
    }

    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unseen => "unseen",
            Self::Presented => "presented",
            Self::Dismissed => "dismissed",
        }
    }
}

impl std::fmt::Display for PresentationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The state changed.
    Applied {
        /// State before the transition.
        from: PresentationState,
        /// State after the transition.
        to: PresentationState,
    },
    /// The request was not legal from the current state; nothing changed.
    Ignored {
        /// The unchanged state.
        current: PresentationState,
    },
}

impl Transition {
    /// Returns true if the state changed.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}
