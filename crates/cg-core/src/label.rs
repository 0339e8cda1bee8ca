//! The closed set of drink categories the pipeline can assign.
//!
//! The enumeration is fixed at compile time: every classifier backend scores
//! all six labels, and the dosage table carries exactly one entry per label.

use serde::{Deserialize, Serialize};

/// Drink category assigned to an input image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Coffee,
    Cola,
    Chocolate,
    GreenTea,
    Energy,
    NonCaffeine,
}

/// Number of labels in the enumeration.
pub const LABEL_COUNT: usize = 6;

impl Label {
    /// All labels, in discriminant order. Classifier score vectors and the
    /// dosage table are indexed in this order.
    pub const ALL: [Label; LABEL_COUNT] = [
        Label::Coffee,
        Label::Cola,
        Label::Chocolate,
        Label::GreenTea,
        Label::Energy,
        Label::NonCaffeine,
    ];

    /// Position of this label in [`Label::ALL`].
    pub fn index(self) -> usize {
        match self {
            Label::Coffee => 0,
            Label::Cola => 1,
            Label::Chocolate => 2,
            Label::GreenTea => 3,
            Label::Energy => 4,
            Label::NonCaffeine => 5,
        }
    }

    /// Label at the given score-vector position, if in range.
    pub fn from_index(index: usize) -> Option<Label> {
        Label::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Coffee => "coffee",
            Label::Cola => "cola",
            Label::Chocolate => "chocolate",
            Label::GreenTea => "green_tea",
            Label::Energy => "energy",
            Label::NonCaffeine => "non_caffeine",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "coffee" => Ok(Label::Coffee),
            "cola" => Ok(Label::Cola),
            "chocolate" => Ok(Label::Chocolate),
            "green_tea" | "green-tea" | "tea" => Ok(Label::GreenTea),
            "energy" | "energy_drink" => Ok(Label::Energy),
            "non_caffeine" | "none" => Ok(Label::NonCaffeine),
            _ => Err(format!("unknown label: '{s}'")),
        }
    }
}
