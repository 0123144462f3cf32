//! Operation signatures: parameters, and which entities an operation
//! creates or references by name.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use roster_store::{ArgValue, Arguments};

/// Kind of value a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Text,
    List,
}

impl ParamKind {
    fn accepts(self, value: &ArgValue) -> bool {
        matches!(
            (self, value),
            (Self::Text, ArgValue::Text(_)) | (Self::List, ArgValue::List(_))
        )
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::List => "list",
        };
        f.write_str(s)
    }
}

/// A declared operation parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
}

impl ParamSpec {
    pub fn text(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamKind::Text,
            required: true,
        }
    }

    pub fn list(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamKind::List,
            required: true,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Kind of graph entity that operations create and link by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Team,
    Person,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Team => "team",
            Self::Person => "person",
        };
        f.write_str(s)
    }
}

/// An entity named by the value of a text parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub param: String,
}

/// Full signature of a registered operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationSpec {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
    /// Entity this operation creates, keyed by one of its parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creates: Option<EntityRef>,
    /// Entities this operation requires to exist already.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<EntityRef>,
}

impl OperationSpec {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            params: Vec::new(),
            creates: None,
            references: Vec::new(),
        }
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn creates(mut self, kind: EntityKind, param: &str) -> Self {
        self.creates = Some(EntityRef {
            kind,
            param: param.to_string(),
        });
        self
    }

    pub fn references(mut self, kind: EntityKind, param: &str) -> Self {
        self.references.push(EntityRef {
            kind,
            param: param.to_string(),
        });
        self
    }

    /// Look up a declared parameter by name.
    pub fn get_param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Check that the entity references point at declared text parameters.
    pub(crate) fn self_check(&self) -> Result<(), String> {
        for entity in self.creates.iter().chain(self.references.iter()) {
            match self.get_param(&entity.param) {
                Some(p) if p.kind == ParamKind::Text && p.required => {}
                Some(_) => {
                    return Err(format!(
                        "{} parameter {:?} must be a required text parameter",
                        entity.kind, entity.param
                    ));
                }
                None => {
                    return Err(format!(
                        "{} parameter {:?} is not declared",
                        entity.kind, entity.param
                    ));
                }
            }
        }
        Ok(())
    }

    /// Validate call arguments against this signature.
    pub fn check(&self, arguments: &Arguments) -> Result<(), ArgumentError> {
        for param in &self.params {
            match arguments.get(&param.name) {
                None if param.required => {
                    return Err(ArgumentError::Missing(param.name.clone()));
                }
                None => {}
                Some(value) if !param.kind.accepts(value) => {
                    return Err(ArgumentError::WrongKind {
                        param: param.name.clone(),
                        expected: param.kind,
                        actual: value.kind_name(),
                    });
                }
                Some(ArgValue::Text(s)) if param.required && s.trim().is_empty() => {
                    return Err(ArgumentError::Empty(param.name.clone()));
                }
                Some(_) => {}
            }
        }
        if let Some(extra) = arguments.keys().find(|k| self.get_param(k).is_none()) {
            return Err(ArgumentError::Unexpected(extra.clone()));
        }
        Ok(())
    }
}

/// Argument validation failure for a single operation call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("missing required argument {0:?}")]
    Missing(String),

    #[error("argument {0:?} must not be empty")]
    Empty(String),

    #[error("argument {param:?} must be {expected}, got {actual}")]
    WrongKind {
        param: String,
        expected: ParamKind,
        actual: &'static str,
    },

    #[error("unexpected argument {0:?}")]
    Unexpected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge_spec() -> OperationSpec {
        OperationSpec::new("addTeamMember", "link")
            .param(ParamSpec::text("person_name"))
            .param(ParamSpec::text("team_name"))
            .param(ParamSpec::list("tags").optional())
            .references(EntityKind::Person, "person_name")
    }

    fn args(pairs: &[(&str, ArgValue)]) -> Arguments {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn check_accepts_matching_arguments() {
        let spec = edge_spec();
        let a = args(&[
            ("person_name", ArgValue::from("Bo")),
            ("team_name", ArgValue::from("Alpha")),
        ]);
        assert!(spec.check(&a).is_ok());
    }

    #[test]
    fn check_reports_missing_required() {
        let spec = edge_spec();
        let a = args(&[("person_name", ArgValue::from("Bo"))]);
        assert_eq!(
            spec.check(&a),
            Err(ArgumentError::Missing("team_name".to_string()))
        );
    }

    #[test]
    fn check_reports_wrong_kind() {
        let spec = edge_spec();
        let a = args(&[
            ("person_name", ArgValue::from("Bo")),
            ("team_name", ArgValue::from("Alpha")),
            ("tags", ArgValue::from("not-a-list")),
        ]);
        let err = spec.check(&a).unwrap_err();
        assert!(matches!(err, ArgumentError::WrongKind { ref param, .. } if param == "tags"));
        assert_eq!(err.to_string(), "argument \"tags\" must be list, got text");
    }

    #[test]
    fn check_reports_blank_required_text() {
        let spec = edge_spec();
        let a = args(&[
            ("person_name", ArgValue::from("  ")),
            ("team_name", ArgValue::from("Alpha")),
        ]);
        assert_eq!(
            spec.check(&a),
            Err(ArgumentError::Empty("person_name".to_string()))
        );
    }

    #[test]
    fn check_reports_unexpected() {
        let spec = edge_spec();
        let a = args(&[
            ("person_name", ArgValue::from("Bo")),
            ("team_name", ArgValue::from("Alpha")),
            ("age", ArgValue::from("31")),
        ]);
        assert_eq!(
            spec.check(&a),
            Err(ArgumentError::Unexpected("age".to_string()))
        );
    }

    #[test]
    fn self_check_rejects_undeclared_entity_param() {
        let spec = OperationSpec::new("bad", "").references(EntityKind::Team, "team_name");
        assert!(spec.self_check().is_err());
        assert!(edge_spec().self_check().is_ok());
    }

    #[test]
    fn self_check_rejects_optional_entity_param() {
        let spec = OperationSpec::new("bad", "")
            .param(ParamSpec::text("name").optional())
            .creates(EntityKind::Team, "name");
        assert!(spec.self_check().is_err());
    }
}
