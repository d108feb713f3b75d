//! Helpful Votes

use rustc_hash::FxHashSet;
use uuid::Uuid;

/// Result of toggling a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggled {
    /// Whether the user's vote is present after the toggle.
    pub voted: bool,

    /// Number of voters after the toggle.
    pub count: usize,
}

/// Set of users who marked something as helpful.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelpfulVotes {
    voters: FxHashSet<Uuid>,
}

impl HelpfulVotes {
    /// No votes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `user` if absent, remove if present.
    pub fn toggle(&mut self, user: Uuid) -> Toggled {
        let voted = if self.voters.remove(&user) {
            false
        } else {
            self.voters.insert(user)
        };

        Toggled {
            voted,
            count: self.voters.len(),
        }
    }

    /// Whether `user` has voted.
    #[must_use]
    pub fn contains(&self, user: &Uuid) -> bool {
        self.voters.contains(user)
    }

    /// Number of voters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.voters.len()
    }

    /// Whether nobody has voted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.voters.is_empty()
    }
}

impl FromIterator<Uuid> for HelpfulVotes {
    fn from_iter<T: IntoIterator<Item = Uuid>>(iter: T) -> Self {
        Self {
            voters: iter.into_iter().collect(),
        }
    }
}
