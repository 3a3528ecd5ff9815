//! Static catalogs of teams and venues offered by the form.
//!
//! Venues come in two flavours: the five competing countries, and one home
//! city per country. A [`Venue`] always knows which [`VenueCategory`] it
//! belongs to, so category membership is checked structurally rather than
//! by comparing strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A competing team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    India,
    Australia,
    England,
    Pakistan,
    #[serde(rename = "New Zealand")]
    NewZealand,
}

impl Team {
    /// Catalog order, as offered in the team selectors.
    pub const ALL: [Team; 5] = [
        Team::India,
        Team::Australia,
        Team::England,
        Team::Pakistan,
        Team::NewZealand,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Team::India => "India",
            Team::Australia => "Australia",
            Team::England => "England",
            Team::Pakistan => "Pakistan",
            Team::NewZealand => "New Zealand",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A host city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum City {
    Mumbai,
    Sydney,
    London,
    Lahore,
    Auckland,
}

impl City {
    pub const ALL: [City; 5] = [
        City::Mumbai,
        City::Sydney,
        City::London,
        City::Lahore,
        City::Auckland,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            City::Mumbai => "Mumbai",
            City::Sydney => "Sydney",
            City::London => "London",
            City::Lahore => "Lahore",
            City::Auckland => "Auckland",
        }
    }
}

/// Which venue catalog the venue selector draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VenueCategory {
    #[default]
    Countries,
    Cities,
}

impl VenueCategory {
    pub const ALL: [VenueCategory; 2] = [VenueCategory::Countries, VenueCategory::Cities];

    /// Venues offered for this category, in catalog order.
    pub fn venues(&self) -> Vec<Venue> {
        match self {
            VenueCategory::Countries => Team::ALL.iter().copied().map(Venue::Country).collect(),
            VenueCategory::Cities => City::ALL.iter().copied().map(Venue::City).collect(),
        }
    }
}

/// A match venue. Serialized as its bare display name (`"India"`, `"Mumbai"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Venue {
    Country(Team),
    City(City),
}

impl Venue {
    pub fn category(&self) -> VenueCategory {
        match self {
            Venue::Country(_) => VenueCategory::Countries,
            Venue::City(_) => VenueCategory::Cities,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Venue::Country(team) => team.as_str(),
            Venue::City(city) => city.as_str(),
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole catalog, as served to the UI.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub teams: Vec<Team>,
    pub venue_categories: Vec<VenueCategory>,
    pub countries: Vec<Venue>,
    pub cities: Vec<Venue>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog {
            teams: Team::ALL.to_vec(),
            venue_categories: VenueCategory::ALL.to_vec(),
            countries: VenueCategory::Countries.venues(),
            cities: VenueCategory::Cities.venues(),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
