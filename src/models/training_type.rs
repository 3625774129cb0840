use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fixed catalogue of training types a trainer can specialise in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrainingTypeName {
    Aerobic,
    Strength,
    Yoga,
    Stretching,
    Resistance,
    Zumba,
}

impl TrainingTypeName {
    pub const ALL: [TrainingTypeName; 6] = [
        TrainingTypeName::Aerobic,
        TrainingTypeName::Strength,
        TrainingTypeName::Yoga,
        TrainingTypeName::Stretching,
        TrainingTypeName::Resistance,
        TrainingTypeName::Zumba,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingTypeName::Aerobic => "AEROBIC",
            TrainingTypeName::Strength => "STRENGTH",
            TrainingTypeName::Yoga => "YOGA",
            TrainingTypeName::Stretching => "STRETCHING",
            TrainingTypeName::Resistance => "RESISTANCE",
            TrainingTypeName::Zumba => "ZUMBA",
        }
    }
}

impl fmt::Display for TrainingTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTrainingType(pub String);

impl fmt::Display for UnknownTrainingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown training type '{}'", self.0)
    }
}

impl std::error::Error for UnknownTrainingType {}

impl FromStr for TrainingTypeName {
    type Err = UnknownTrainingType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrainingTypeName::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTrainingType(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingType {
    pub id: i32,
    pub training_type_name: TrainingTypeName,
}
