use super::event_type::CounterField;
use super::tier::Tier;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Student {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub meetings: i64,
    #[serde(default, rename = "guestSpeaker")]
    pub guest_speaker: i64,
    #[serde(default)]
    pub cfe: i64,
    #[serde(default)]
    pub combo: i64,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Student {
    pub fn counter(&self, field: CounterField) -> i64 {
        match field {
            CounterField::Meetings => self.meetings,
            CounterField::GuestSpeaker => self.guest_speaker,
            CounterField::Cfe => self.cfe,
            CounterField::Combo => self.combo,
        }
    }

    /// Reward tier, derived from the current point total.
    pub fn tier(&self) -> Tier {
        Tier::for_points(self.points)
    }
}
