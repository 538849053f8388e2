//! Radiographic grading taxonomy.
//!
//! Grades are weighted non-linearly: each step above grade 2 doubles the
//! points, so a single severe finding outweighs several mild ones.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity grade of a region's radiographic finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Grade {
    #[default]
    G0,
    G1,
    G2,
    G3,
    G4,
}

/// Reference row for one grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeInfo {
    pub grade: Grade,
    pub label: &'static str,
    pub points: u32,
    pub description: &'static str,
}

/// The grading table, indexed by grade value.
pub const GRADE_TABLE: [GradeInfo; 5] = [
    GradeInfo {
        grade: Grade::G0,
        label: "Grade 0",
        points: 0,
        description: "Pas d'anomalie radiographique significative",
    },
    GradeInfo {
        grade: Grade::G1,
        label: "Grade 1",
        points: 1,
        description: "Image radiographique suspecte (entre normale et anormale) sans importance clinique",
    },
    GradeInfo {
        grade: Grade::G2,
        label: "Grade 2",
        points: 2,
        description: "Image radiographique anormale d'expression clinique peu probable",
    },
    GradeInfo {
        grade: Grade::G3,
        label: "Grade 3",
        points: 4,
        description: "Image radiographique anormale d'expression clinique probable",
    },
    GradeInfo {
        grade: Grade::G4,
        label: "Grade 4",
        points: 8,
        description: "Image radiographique anormale d'expression clinique certaine",
    },
];

impl Grade {
    /// All grades in severity order.
    pub const ALL: [Grade; 5] = [Grade::G0, Grade::G1, Grade::G2, Grade::G3, Grade::G4];

    /// Numeric value (0-4).
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Build a grade from its numeric value.
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(Grade::G0),
            1 => Some(Grade::G1),
            2 => Some(Grade::G2),
            3 => Some(Grade::G3),
            4 => Some(Grade::G4),
            _ => None,
        }
    }

    pub fn info(self) -> &'static GradeInfo {
        &GRADE_TABLE[self as usize]
    }

    /// Points contributed to the total score.
    pub fn points(self) -> u32 {
        self.info().points
    }

    pub fn label(self) -> &'static str {
        self.info().label
    }

    /// Full clinical description shown next to the grade.
    pub fn description(self) -> &'static str {
        self.info().description
    }
}

impl TryFrom<u8> for Grade {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Grade::from_value(i64::from(value)).ok_or_else(|| format!("Unknown grade: {}", value))
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.value()
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}
