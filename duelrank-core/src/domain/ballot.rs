use super::ids::{ItemId, TournamentId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One judged round, as reported by the presentation layer.
///
/// `selected = None` means the judge expressed no preference; such rounds
/// are logged for the audit trail but update no ratings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ballot {
    pub voter: UserId,
    pub first: ItemId,
    pub second: ItemId,
    pub selected: Option<ItemId>,
}

impl Ballot {
    /// Winner/loser split, if the judge picked a side.
    ///
    /// Returns `None` for a no-preference ballot, and also when the
    /// selected id is not one of the compared pair (the engine rejects
    /// that case with an error before getting here).
    pub fn decision(&self) -> Option<(ItemId, ItemId)> {
        match self.selected {
            Some(w) if w == self.first => Some((self.first, self.second)),
            Some(w) if w == self.second => Some((self.second, self.first)),
            _ => None,
        }
    }
}

/// Append-only vote log record. Written on every ballot, decided or not;
/// never read back by the engine itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub voter: UserId,
    pub first: ItemId,
    pub second: ItemId,
    pub tournament: TournamentId,
    pub selected: Option<ItemId>,
    pub cast_at: DateTime<Utc>,
}

impl Vote {
    pub fn from_ballot(tournament: TournamentId, ballot: &Ballot) -> Self {
        Self {
            voter: ballot.voter,
            first: ballot.first,
            second: ballot.second,
            tournament,
            selected: ballot.selected,
            cast_at: Utc::now(),
        }
    }
}
