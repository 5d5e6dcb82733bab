use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{NnError, Result};

/// Optimizer selector. The discriminants are the model file codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    Sgd = 0,
    Adam = 1,
}

impl OptimizerKind {
    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn from_code(code: i32) -> Result<OptimizerKind> {
        match code {
            0 => Ok(OptimizerKind::Sgd),
            1 => Ok(OptimizerKind::Adam),
            other => Err(NnError::format(format!("unknown optimizer code {other}"))),
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OptimizerKind::Sgd => "SGD",
            OptimizerKind::Adam => "Adam",
        })
    }
}
