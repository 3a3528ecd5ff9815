use serde::{Deserialize, Serialize};

use crate::catalog::{Team, Venue, VenueCategory};
use crate::error::{Field, SelectionError, ValidationError};

/// How strictly edits are checked against the options currently offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Setters store what they are given. Switching venue category keeps the
    /// chosen venue, and team2 may be set to team1's value.
    #[default]
    Permissive,
    /// Setters reject values outside their option list, and switching
    /// venue category clears a venue from the other catalog.
    Strict,
}

/// Venue category and venue, changed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct VenueChoice {
    pub category: VenueCategory,
    pub venue: Option<Venue>,
}

/// One user edit to the form.
///
/// Wire form: `{"field": "team1", "value": "India"}`; a `null` value clears
/// the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum SelectionUpdate {
    Team1(Option<Team>),
    Team2(Option<Team>),
    TossWinner(Option<Team>),
    VenueCategory(VenueCategory),
    Venue(Option<Venue>),
}

/// Current form selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SelectionState {
    team1: Option<Team>,
    team2: Option<Team>,
    toss_winner: Option<Team>,
    venue: VenueChoice,
    policy: SelectionPolicy,
}

/// A fully populated selection, ready to be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompleteSelection {
    pub team1: Team,
    pub team2: Team,
    pub toss_winner: Team,
    pub venue: Venue,
}

impl SelectionState {
    pub fn with_policy(policy: SelectionPolicy) -> Self {
        SelectionState {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn team1(&self) -> Option<Team> {
        self.team1
    }

    pub fn team2(&self) -> Option<Team> {
        self.team2
    }

    pub fn toss_winner(&self) -> Option<Team> {
        self.toss_winner
    }

    pub fn venue_category(&self) -> VenueCategory {
        self.venue.category
    }

    pub fn venue(&self) -> Option<Venue> {
        self.venue.venue
    }

    /// Teams offered for the first slot: the whole catalog.
    pub fn team1_options(&self) -> Vec<Team> {
        Team::ALL.to_vec()
    }

    /// Teams offered for the second slot: everything except team1.
    pub fn team2_options(&self) -> Vec<Team> {
        Team::ALL
            .iter()
            .copied()
            .filter(|t| Some(*t) != self.team1)
            .collect()
    }

    /// Toss candidates, only offered once both teams are chosen.
    pub fn toss_options(&self) -> Vec<Team> {
        match (self.team1, self.team2) {
            (Some(a), Some(b)) => vec![a, b],
            _ => Vec::new(),
        }
    }

    pub fn venue_options(&self) -> Vec<Venue> {
        self.venue.category.venues()
    }

    /// Apply one edit, then drop a toss winner that no longer names a team in
    /// play. Under [`SelectionPolicy::Strict`] the edit is also checked
    /// against the offered options and stale dependents are cleared.
    ///
    /// On error the state is left untouched.
    pub fn apply(&mut self, update: SelectionUpdate) -> Result<(), SelectionError> {
        let strict = self.policy == SelectionPolicy::Strict;
        let mut next = *self;
        match update {
            SelectionUpdate::Team1(team) => {
                next.team1 = team;
                if strict && team.is_some() && next.team2 == team {
                    next.team2 = None;
                }
            }
            SelectionUpdate::Team2(team) => {
                if let (true, Some(t)) = (strict, team) {
                    if !self.team2_options().contains(&t) {
                        return Err(SelectionError::not_offered(Field::Team2, t));
                    }
                }
                next.team2 = team;
            }
            SelectionUpdate::TossWinner(None) => next.toss_winner = None,
            SelectionUpdate::TossWinner(Some(team)) => {
                let options = self.toss_options();
                if options.is_empty() {
                    return Err(SelectionError::TossUnavailable);
                }
                if !options.contains(&team) {
                    return Err(SelectionError::not_offered(Field::TossWinner, team));
                }
                next.toss_winner = Some(team);
            }
            SelectionUpdate::VenueCategory(category) => {
                next.venue.category = category;
                if strict && next.venue.venue.map(|v| v.category()) != Some(category) {
                    next.venue.venue = None;
                }
            }
            SelectionUpdate::Venue(venue) => {
                if let (true, Some(v)) = (strict, venue) {
                    if v.category() != self.venue.category {
                        return Err(SelectionError::NotOffered {
                            field: Field::Venue,
                            value: v.to_string(),
                        });
                    }
                }
                next.venue.venue = venue;
            }
        }

        // Toss winner must still name one of the two teams in play.
        if let Some(toss) = next.toss_winner {
            if next.team1 != Some(toss) && next.team2 != Some(toss) {
                next.toss_winner = None;
            }
        }

        *self = next;
        Ok(())
    }

    /// Check that every required field is filled.
    pub fn complete(&self) -> Result<CompleteSelection, ValidationError> {
        match (self.team1, self.team2, self.toss_winner, self.venue.venue) {
            (Some(team1), Some(team2), Some(toss_winner), Some(venue)) => Ok(CompleteSelection {
                team1,
                team2,
                toss_winner,
                venue,
            }),
            _ => {
                let mut missing = Vec::new();
                if self.team1.is_none() {
                    missing.push(Field::Team1);
                }
                if self.team2.is_none() {
                    missing.push(Field::Team2);
                }
                if self.toss_winner.is_none() {
                    missing.push(Field::TossWinner);
                }
                if self.venue.venue.is_none() {
                    missing.push(Field::Venue);
                }
                Err(ValidationError { missing })
            }
        }
    }
}
