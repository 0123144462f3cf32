//! Plan data types.
//!
//! These types mirror the JSON document a planner produces. They are built
//! by the validator in [`super::parser`] rather than deserialized directly,
//! so that malformed input yields a precise diagnostic.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use roster_store::Arguments;

/// Root object produced by the planner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// Identifier of the team being created. Never empty.
    pub team_name: String,
    /// Free-text team summary.
    #[serde(default)]
    pub team_text: String,
    /// People on the team. Informational: never executed directly.
    #[serde(default)]
    pub people: Vec<PersonDescriptor>,
    /// The authoritative, ordered execution list.
    #[serde(default)]
    pub operations: Vec<Operation>,
}

/// One person on the planned team.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonDescriptor {
    pub name: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub text: String,
    pub role: Role,
}

/// A single named store mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Operation {
    /// Registered operation name. `None` when the planner omitted it or
    /// left it blank; such operations fail individually at execution.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Arguments,
}

impl Operation {
    pub fn new(name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            name: Some(name.into()),
            arguments,
        }
    }

    /// An operation whose name is missing.
    pub fn unnamed(arguments: Arguments) -> Self {
        Self {
            name: None,
            arguments,
        }
    }

    /// The operation name, if present and non-empty.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Text value of the named argument, if present.
    pub fn text_arg(&self, param: &str) -> Option<&str> {
        self.arguments.get(param).and_then(|v| v.as_text())
    }
}

// ---------------------------------------------------------------------------

/// Role of a person on the team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Manager,
    Member,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Manager => "manager",
            Self::Member => "member",
        };
        f.write_str(s)
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manager" => Ok(Self::Manager),
            "member" => Ok(Self::Member),
            other => Err(RoleParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Role`] string.
#[derive(Debug, Clone)]
pub struct RoleParseError(pub String);

impl fmt::Display for RoleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid role: {:?}", self.0)
    }
}

impl std::error::Error for RoleParseError {}
