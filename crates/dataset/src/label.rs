use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Token class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Label {
    /// not relevant
    Irrelevant = 0,
    /// first token of a person's name
    EntityBegin = 1,
    /// following tokens of a person's name
    EntityInside = 2,
    /// first token of a legal issue
    IssueBegin = 3,
    /// following tokens of a legal issue
    IssueInside = 4,
}

/// Raw label outside `0..=4` or not an integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("label {0:?} is not one of 0..=4")]
pub struct LabelError(pub String);

impl Label {
    /// Every label, in value order.
    pub const ALL: [Label; 5] = [
        Label::Irrelevant,
        Label::EntityBegin,
        Label::EntityInside,
        Label::IssueBegin,
        Label::IssueInside,
    ];

    /// Integer value as it appears in the labels file.
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl TryFrom<i64> for Label {
    type Error = LabelError;

    fn try_from(value: i64) -> Result<Self, LabelError> {
        match value {
            0 => Ok(Label::Irrelevant),
            1 => Ok(Label::EntityBegin),
            2 => Ok(Label::EntityInside),
            3 => Ok(Label::IssueBegin),
            4 => Ok(Label::IssueInside),
            other => Err(LabelError(other.to_string())),
        }
    }
}

impl FromStr for Label {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, LabelError> {
        let value = s.parse::<i64>().map_err(|_| LabelError(s.to_string()))?;
        Label::try_from(value)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}
