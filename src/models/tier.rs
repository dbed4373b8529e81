use serde::Serialize;

/// Named reward bracket derived from cumulative points.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    None,
    Bronze,
    Silver,
    Gold,
}

pub const BRONZE_THRESHOLD: i64 = 12;
pub const SILVER_THRESHOLD: i64 = 22;
pub const GOLD_THRESHOLD: i64 = 35;

impl Tier {
    /// Thresholds are inclusive lower bounds, checked highest first.
    pub fn for_points(points: i64) -> Self {
        if points >= GOLD_THRESHOLD {
            Tier::Gold
        } else if points >= SILVER_THRESHOLD {
            Tier::Silver
        } else if points >= BRONZE_THRESHOLD {
            Tier::Bronze
        } else {
            Tier::None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tier::None => "None",
            Tier::Bronze => "Bronze",
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
        }
    }

    pub fn award(&self) -> &'static str {
        match self {
            Tier::None => "$0",
            Tier::Bronze => "$250",
            Tier::Silver => "$500",
            Tier::Gold => "$1000",
        }
    }

    /// Gold members also qualify for conference travel.
    pub fn conference_eligible(&self) -> bool {
        matches!(self, Tier::Gold)
    }
}
