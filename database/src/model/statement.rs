use serde::{Deserialize, Serialize};

use super::participant::Participant;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Statement {
    Add(Participant),
    FindByEmail(String),
    /// Returns every participant, most recently created first
    List,
    Count,
    /// Administrative reset, removes every participant
    DeleteAll,
}

impl Statement {
    pub fn is_query(&self) -> bool {
        !self.is_mutation()
    }

    pub fn is_mutation(&self) -> bool {
        match self {
            Statement::Add(_) | Statement::DeleteAll => true,
            Statement::FindByEmail(_) | Statement::List | Statement::Count => false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum StatementResult {
    Single(Participant),
    GetSingle(Option<Participant>),
    List(Vec<Participant>),
    Count(usize),
    /// Number of rows removed by a `DeleteAll`
    Deleted(usize),
}

/// Returned when a statement result is unwrapped as the wrong variant, which means the
/// statement -> result mapping in the table is broken
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("Statement result is not of type {expected}: {actual:?}")]
pub struct UnexpectedResult {
    pub expected: &'static str,
    pub actual: StatementResult,
}

impl StatementResult {
    pub fn single(self) -> Result<Participant, UnexpectedResult> {
        match self {
            StatementResult::Single(p) => Ok(p),
            actual => Err(UnexpectedResult {
                expected: "Single",
                actual,
            }),
        }
    }

    pub fn get_single(self) -> Result<Option<Participant>, UnexpectedResult> {
        match self {
            StatementResult::GetSingle(p) => Ok(p),
            actual => Err(UnexpectedResult {
                expected: "GetSingle",
                actual,
            }),
        }
    }

    pub fn list(self) -> Result<Vec<Participant>, UnexpectedResult> {
        match self {
            StatementResult::List(l) => Ok(l),
            actual => Err(UnexpectedResult {
                expected: "List",
                actual,
            }),
        }
    }

    pub fn count(self) -> Result<usize, UnexpectedResult> {
        match self {
            StatementResult::Count(c) => Ok(c),
            actual => Err(UnexpectedResult {
                expected: "Count",
                actual,
            }),
        }
    }

    pub fn deleted(self) -> Result<usize, UnexpectedResult> {
        match self {
            StatementResult::Deleted(c) => Ok(c),
            actual => Err(UnexpectedResult {
                expected: "Deleted",
                actual,
            }),
        }
    }
}
