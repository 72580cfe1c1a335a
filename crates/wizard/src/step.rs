use std::fmt;

use serde::{Deserialize, Serialize};

/// Position in the wizard. Marker 4 is intentionally unused.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Landing,
    Challenges,
    Campaigns,
    Contact,
    Confirmation,
}

impl Step {
    pub const SEQUENCE: [Step; 5] = [
        Step::Landing,
        Step::Challenges,
        Step::Campaigns,
        Step::Contact,
        Step::Confirmation,
    ];

    /// Marker written into the `step` query parameter.
    pub fn number(&self) -> u32 {
        match self {
            Step::Landing => 1,
            Step::Challenges => 2,
            Step::Campaigns => 3,
            Step::Contact => 5,
            Step::Confirmation => 6,
        }
    }

    pub fn from_number(n: u32) -> Option<Self> {
        Step::SEQUENCE.into_iter().find(|s| s.number() == n)
    }

    pub fn following(&self) -> Option<Step> {
        let idx = Step::SEQUENCE.iter().position(|s| s == self)?;
        Step::SEQUENCE.get(idx + 1).copied()
    }

    pub fn is_terminal(&self) -> bool {
        *self == Step::Confirmation
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}
