//! Validated question records
//!
//! A `Record` can only be built through [`Record::new`], which enforces the
//! four-choice shape. Deserialization goes through the same check, so a
//! checkpoint holding a malformed record fails to load instead of producing
//! partial data.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of choices every record carries
pub const CHOICE_COUNT: usize = 4;

/// Reason a candidate block did not become a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("block has no question heading")]
    MissingPrompt,

    #[error("block has no answer container")]
    MissingChoices,

    #[error("expected 4 choices, found {found}")]
    WrongChoiceCount { found: usize },

    #[error("no choice is marked as the answer")]
    NoCorrectMarker,

    #[error("answer index {index} is out of range")]
    CorrectIndexOutOfRange { index: usize },
}

/// A validated multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRecord", into = "RawRecord")]
pub struct Record {
    prompt: String,
    choices: [String; CHOICE_COUNT],
    correct_index: usize,
}

impl Record {
    /// Builds a record, rejecting anything that is not a complete question
    pub fn new(
        prompt: impl Into<String>,
        choices: Vec<String>,
        correct_index: usize,
    ) -> Result<Self, Rejection> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(Rejection::MissingPrompt);
        }

        let found = choices.len();
        let choices: [String; CHOICE_COUNT] = choices
            .try_into()
            .map_err(|_| Rejection::WrongChoiceCount { found })?;

        if correct_index >= CHOICE_COUNT {
            return Err(Rejection::CorrectIndexOutOfRange {
                index: correct_index,
            });
        }

        Ok(Self {
            prompt,
            choices,
            correct_index,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn choices(&self) -> &[String; CHOICE_COUNT] {
        &self.choices
    }

    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    /// Text of the correct choice
    pub fn answer(&self) -> &str {
        &self.choices[self.correct_index]
    }

    /// Label (`A`..`D`) of the correct choice
    pub fn answer_label(&self) -> char {
        choice_label(self.correct_index)
    }
}

/// Letter used for the choice at `index`
pub(crate) fn choice_label(index: usize) -> char {
    (b'A' + index as u8) as char
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Q: {}", self.prompt)?;
        for (i, choice) in self.choices.iter().enumerate() {
            let marker = if i == self.correct_index { " ✓" } else { "" };
            writeln!(f, "  {}. {}{}", choice_label(i), choice, marker)?;
        }
        Ok(())
    }
}

/// Wire shape of a record, shared with the downstream data files
#[derive(Serialize, Deserialize)]
struct RawRecord {
    question: String,
    options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    correct_answer: i64,
}

impl TryFrom<RawRecord> for Record {
    type Error = Rejection;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let index = usize::try_from(raw.correct_answer).map_err(|_| Rejection::NoCorrectMarker)?;
        Record::new(raw.question, raw.options, index)
    }
}

impl From<Record> for RawRecord {
    fn from(record: Record) -> Self {
        let Record {
            prompt,
            choices,
            correct_index,
        } = record;
        Self {
            question: prompt,
            options: choices.into(),
            correct_answer: correct_index as i64,
        }
    }
}
