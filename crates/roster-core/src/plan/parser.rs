//! Plan decoding and validation.
//!
//! Turns planner output into a normalized [`Plan`]:
//! - Extracts the JSON object from the text (tolerating code fences and
//!   surrounding prose).
//! - Checks required fields and their shapes, with the JSON path of the
//!   first offending value in the error.
//! - Leaves operations with a missing or blank name in place; they fail
//!   individually at execution instead of rejecting the plan.
//! - In strict mode, additionally checks plan coverage (one `createTeam`,
//!   one `createPerson` and one matching role edge per person, all naming
//!   the plan's team) and that no operation references a team or person
//!   before the operation that creates it.

use std::collections::{BTreeSet, HashMap};

use serde_json::{Map, Value};
use thiserror::Error;

use roster_store::{ArgValue, Arguments};

use super::format::{Operation, PersonDescriptor, Plan, Role};
use crate::registry::{
    ADD_TEAM_MANAGER, ADD_TEAM_MEMBER, CREATE_PERSON, CREATE_TEAM, EntityKind, OperationRegistry,
};

/// Structural rejection of a plan. Nothing is executed when this is
/// returned.
#[derive(Debug, Error)]
pub enum MalformedPlan {
    #[error("planner output contains no JSON object")]
    NoJsonObject,

    #[error("plan is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("plan must be a JSON object")]
    NotAnObject,

    #[error("missing required field {0:?}")]
    MissingField(String),

    #[error("field {field} must be {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("field {0} must not be empty")]
    Empty(String),

    #[error("invalid role {value:?} for person {person:?} (expected manager or member)")]
    InvalidRole { person: String, value: String },

    #[error("person {0:?} is listed more than once")]
    DuplicatePerson(String),

    #[error("plan has {0} createTeam operations (expected exactly one)")]
    TeamCount(usize),

    #[error("person {person:?} has {count} createPerson operations (expected exactly one)")]
    PersonCreateCount { person: String, count: usize },

    #[error("person {person:?} has {count} role edge operations (expected exactly one)")]
    RoleEdgeCount { person: String, count: usize },

    #[error("operations[{index}] ({operation}) names team {found:?} but the plan is for {expected:?}")]
    TeamNameMismatch {
        index: usize,
        operation: String,
        expected: String,
        found: String,
    },

    #[error("person {person:?} is a {role} but is linked with {operation}")]
    RoleMismatch {
        person: String,
        role: Role,
        operation: String,
    },

    #[error(
        "operations[{index}] ({operation}) references {kind} {name:?} before it is created at operations[{created_at}]"
    )]
    ReferenceBeforeCreate {
        index: usize,
        operation: String,
        kind: EntityKind,
        name: String,
        created_at: usize,
    },
}

/// How thoroughly to validate a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Shape checks only.
    #[default]
    Lenient,
    /// Shape checks plus coverage and create-before-reference ordering.
    Strict,
}

impl ValidationMode {
    pub fn from_strict(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::Lenient }
    }
}

/// Decode and validate planner output.
pub fn parse_plan(
    text: &str,
    mode: ValidationMode,
    registry: &OperationRegistry,
) -> Result<Plan, MalformedPlan> {
    let value = decode_plan(text)?;
    validate_plan(&value, mode, registry)
}

/// Validate an already-decoded plan value.
pub fn validate_plan(
    value: &Value,
    mode: ValidationMode,
    registry: &OperationRegistry,
) -> Result<Plan, MalformedPlan> {
    let plan = validate_structure(value)?;
    if mode == ValidationMode::Strict {
        check_coverage(&plan)?;
        check_ordering(&plan, registry)?;
    }
    Ok(plan)
}

/// Extract and decode the JSON object in planner output.
///
/// Text that is already a JSON document is decoded as is. Otherwise
/// planners often wrap the object in a markdown code fence or add a
/// sentence before it, so the outermost `{ ... }` span is decoded.
pub fn decode_plan(text: &str) -> Result<Value, MalformedPlan> {
    if let Ok(value) = serde_json::from_str::<Value>(text.trim()) {
        return Ok(value);
    }
    let body = strip_code_fence(text);
    let start = body.find('{').ok_or(MalformedPlan::NoJsonObject)?;
    let end = body.rfind('}').ok_or(MalformedPlan::NoJsonObject)?;
    if end < start {
        return Err(MalformedPlan::NoJsonObject);
    }
    Ok(serde_json::from_str(&body[start..=end])?)
}

/// Return the body of the first markdown code fence, or `text` unchanged.
///
/// Only backtick runs that open a line count as fences; JSON strings
/// cannot span lines, so backticks inside them are never mistaken for one.
fn strip_code_fence(text: &str) -> &str {
    let Some(open) = find_fence(text) else {
        return text;
    };
    let after_open = &text[open + 3..];
    // Skip the info string (e.g. "json") on the fence line.
    let content = match after_open.find('\n') {
        Some(nl) => &after_open[nl + 1..],
        None => after_open,
    };
    match find_fence(content) {
        Some(close) => &content[..close],
        None => content,
    }
}

/// Byte offset of the first "```" that starts a line, ignoring indentation.
fn find_fence(text: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
        if line[indent..].starts_with("```") {
            return Some(offset + indent);
        }
        offset += line.len();
    }
    None
}

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

/// Check required fields and shapes, and normalize the plan.
///
/// Names are trimmed; a blank operation name becomes `None`.
pub fn validate_structure(value: &Value) -> Result<Plan, MalformedPlan> {
    let root = value.as_object().ok_or(MalformedPlan::NotAnObject)?;

    let team_name = required_str(root, "team_name", "team_name")?.trim().to_string();
    if team_name.is_empty() {
        return Err(MalformedPlan::Empty("team_name".to_string()));
    }
    let team_text = optional_str(root, "team_text", "team_text")?
        .unwrap_or_default()
        .to_string();

    let people = required_array(root, "people", "people")?
        .iter()
        .enumerate()
        .map(|(i, v)| validate_person(i, v))
        .collect::<Result<Vec<_>, _>>()?;

    let operations = required_array(root, "operations", "operations")?
        .iter()
        .enumerate()
        .map(|(i, v)| validate_operation(i, v))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Plan {
        team_name,
        team_text,
        people,
        operations,
    })
}

fn validate_person(index: usize, value: &Value) -> Result<PersonDescriptor, MalformedPlan> {
    let path = format!("people[{index}]");
    let obj = value.as_object().ok_or_else(|| MalformedPlan::WrongType {
        field: path.clone(),
        expected: "an object",
    })?;

    let name = required_str(obj, "name", &format!("{path}.name"))?.trim().to_string();
    if name.is_empty() {
        return Err(MalformedPlan::Empty(format!("{path}.name")));
    }

    let tags = match obj.get("tags") {
        None | Some(Value::Null) => BTreeSet::new(),
        Some(v) => string_list(v, &format!("{path}.tags"))?
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
    };

    let text = optional_str(obj, "text", &format!("{path}.text"))?
        .unwrap_or_default()
        .to_string();

    let role_raw = required_str(obj, "role", &format!("{path}.role"))?;
    let role = role_raw
        .trim()
        .to_ascii_lowercase()
        .parse::<Role>()
        .map_err(|_| MalformedPlan::InvalidRole {
            person: name.clone(),
            value: role_raw.to_string(),
        })?;

    Ok(PersonDescriptor {
        name,
        tags,
        text,
        role,
    })
}

fn validate_operation(index: usize, value: &Value) -> Result<Operation, MalformedPlan> {
    let path = format!("operations[{index}]");
    let obj = value.as_object().ok_or_else(|| MalformedPlan::WrongType {
        field: path.clone(),
        expected: "an object",
    })?;

    let name = optional_str(obj, "name", &format!("{path}.name"))?
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    let args_path = format!("{path}.arguments");
    let raw_args = match obj.get("arguments") {
        None => return Err(MalformedPlan::MissingField(args_path)),
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(MalformedPlan::WrongType {
                field: args_path,
                expected: "an object",
            });
        }
    };

    let mut arguments = Arguments::new();
    for (key, v) in raw_args {
        let arg_path = format!("{args_path}.{key}");
        let arg = match v {
            Value::String(s) => ArgValue::Text(s.clone()),
            Value::Array(_) => ArgValue::List(string_list(v, &arg_path)?),
            _ => {
                return Err(MalformedPlan::WrongType {
                    field: arg_path,
                    expected: "a string or a list of strings",
                });
            }
        };
        arguments.insert(key.clone(), arg);
    }

    Ok(Operation { name, arguments })
}

fn required_str<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a str, MalformedPlan> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(MalformedPlan::MissingField(path.to_string())),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(MalformedPlan::WrongType {
            field: path.to_string(),
            expected: "a string",
        }),
    }
}

fn optional_str<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<&'a str>, MalformedPlan> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(MalformedPlan::WrongType {
            field: path.to_string(),
            expected: "a string",
        }),
    }
}

fn required_array<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Vec<Value>, MalformedPlan> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(MalformedPlan::MissingField(path.to_string())),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(MalformedPlan::WrongType {
            field: path.to_string(),
            expected: "an array",
        }),
    }
}

fn string_list(value: &Value, path: &str) -> Result<Vec<String>, MalformedPlan> {
    let wrong = || MalformedPlan::WrongType {
        field: path.to_string(),
        expected: "a list of strings",
    };
    value
        .as_array()
        .ok_or_else(wrong)?
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(wrong))
        .collect()
}

// ---------------------------------------------------------------------------
// Strict checks
// ---------------------------------------------------------------------------

/// Check that the operation list covers the plan's team and people.
///
/// Name arguments are compared after trimming, the same way the plan's
/// own names are normalized.
pub fn check_coverage(plan: &Plan) -> Result<(), MalformedPlan> {
    let team_count = plan
        .operations
        .iter()
        .filter(|op| op.name() == Some(CREATE_TEAM))
        .count();
    if team_count != 1 {
        return Err(MalformedPlan::TeamCount(team_count));
    }

    for (index, op) in plan.operations.iter().enumerate() {
        let team_param = match op.name() {
            Some(CREATE_TEAM) => "name",
            Some(ADD_TEAM_MANAGER | ADD_TEAM_MEMBER) => "team_name",
            _ => continue,
        };
        let found = trimmed_arg(op, team_param).unwrap_or_default();
        if found != plan.team_name {
            return Err(MalformedPlan::TeamNameMismatch {
                index,
                operation: op.name().unwrap_or_default().to_string(),
                expected: plan.team_name.clone(),
                found: found.to_string(),
            });
        }
    }

    let mut seen = BTreeSet::new();
    for person in &plan.people {
        if !seen.insert(person.name.as_str()) {
            return Err(MalformedPlan::DuplicatePerson(person.name.clone()));
        }

        let creates = plan
            .operations
            .iter()
            .filter(|op| {
                op.name() == Some(CREATE_PERSON)
                    && trimmed_arg(op, "name") == Some(person.name.as_str())
            })
            .count();
        if creates != 1 {
            return Err(MalformedPlan::PersonCreateCount {
                person: person.name.clone(),
                count: creates,
            });
        }

        let edges: Vec<&str> = plan
            .operations
            .iter()
            .filter(|op| trimmed_arg(op, "person_name") == Some(person.name.as_str()))
            .filter_map(|op| op.name())
            .filter(|n| *n == ADD_TEAM_MANAGER || *n == ADD_TEAM_MEMBER)
            .collect();
        if edges.len() != 1 {
            return Err(MalformedPlan::RoleEdgeCount {
                person: person.name.clone(),
                count: edges.len(),
            });
        }

        let expected = match person.role {
            Role::Manager => ADD_TEAM_MANAGER,
            Role::Member => ADD_TEAM_MEMBER,
        };
        if edges[0] != expected {
            return Err(MalformedPlan::RoleMismatch {
                person: person.name.clone(),
                role: person.role,
                operation: edges[0].to_string(),
            });
        }
    }

    Ok(())
}

fn trimmed_arg<'a>(op: &'a Operation, key: &str) -> Option<&'a str> {
    op.text_arg(key).map(str::trim)
}

/// Check that every reference to a team or person created in this plan
/// comes after the operation that creates it.
///
/// References to names the plan never creates are allowed: they may name
/// entities already in the store. Unnamed and unregistered operations are
/// skipped; the executor reports them.
pub fn check_ordering(plan: &Plan, registry: &OperationRegistry) -> Result<(), MalformedPlan> {
    // First creation index of each (kind, name).
    let mut created_at: HashMap<(EntityKind, &str), usize> = HashMap::new();
    for (index, op) in plan.operations.iter().enumerate() {
        let Some(spec) = op.name().and_then(|n| registry.spec(n)) else {
            continue;
        };
        let Some(entity) = &spec.creates else {
            continue;
        };
        if let Some(name) = op.text_arg(&entity.param) {
            created_at.entry((entity.kind, name.trim())).or_insert(index);
        }
    }

    for (index, op) in plan.operations.iter().enumerate() {
        let Some(spec) = op.name().and_then(|n| registry.spec(n)) else {
            continue;
        };
        for entity in &spec.references {
            let Some(name) = op.text_arg(&entity.param) else {
                continue;
            };
            match created_at.get(&(entity.kind, name.trim())) {
                Some(&created) if created > index => {
                    return Err(MalformedPlan::ReferenceBeforeCreate {
                        index,
                        operation: spec.name.clone(),
                        kind: entity.kind,
                        name: name.to_string(),
                        created_at: created,
                    });
                }
                _ => {}
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> OperationRegistry {
        OperationRegistry::with_builtin().unwrap()
    }

    fn alpha_plan() -> Value {
        json!({
            "team_name": "Alpha",
            "team_text": "Platform team",
            "people": [
                { "name": "Bo", "tags": ["rust"], "text": "Lead", "role": "manager" }
            ],
            "operations": [
                { "name": "createTeam", "arguments": { "name": "Alpha" } },
                { "name": "createPerson", "arguments": { "name": "Bo", "tags": ["rust"] } },
                { "name": "addTeamManager", "arguments": { "person_name": "Bo", "team_name": "Alpha" } }
            ]
        })
    }

    fn lenient(value: &Value) -> Result<Plan, MalformedPlan> {
        validate_plan(value, ValidationMode::Lenient, &registry())
    }

    fn strict(value: &Value) -> Result<Plan, MalformedPlan> {
        validate_plan(value, ValidationMode::Strict, &registry())
    }

    #[test]
    fn accepts_valid_plan() {
        let plan = strict(&alpha_plan()).expect("plan should be valid");
        assert_eq!(plan.team_name, "Alpha");
        assert_eq!(plan.people.len(), 1);
        assert_eq!(plan.people[0].role, Role::Manager);
        assert_eq!(plan.operations.len(), 3);
        assert_eq!(plan.operations[1].name(), Some("createPerson"));
        assert_eq!(
            plan.operations[1].arguments["tags"],
            ArgValue::List(vec!["rust".to_string()])
        );
    }

    #[test]
    fn rejects_missing_top_level_fields() {
        for field in ["team_name", "people", "operations"] {
            let mut value = alpha_plan();
            value.as_object_mut().unwrap().remove(field);
            let err = lenient(&value).unwrap_err();
            assert!(
                matches!(err, MalformedPlan::MissingField(ref f) if f == field),
                "expected MissingField({field}), got: {err}"
            );
        }
    }

    #[test]
    fn team_text_is_optional() {
        let mut value = alpha_plan();
        value.as_object_mut().unwrap().remove("team_text");
        assert_eq!(lenient(&value).unwrap().team_text, "");
    }

    #[test]
    fn rejects_non_object_root() {
        let err = lenient(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, MalformedPlan::NotAnObject));
    }

    #[test]
    fn rejects_blank_team_name() {
        let mut value = alpha_plan();
        value["team_name"] = json!("   ");
        let err = lenient(&value).unwrap_err();
        assert!(matches!(err, MalformedPlan::Empty(ref f) if f == "team_name"));
    }

    #[test]
    fn rejects_operations_not_an_array() {
        let mut value = alpha_plan();
        value["operations"] = json!({ "name": "createTeam" });
        let err = lenient(&value).unwrap_err();
        assert_eq!(err.to_string(), "field operations must be an array");
    }

    #[test]
    fn rejects_operation_without_arguments() {
        let mut value = alpha_plan();
        value["operations"][2].as_object_mut().unwrap().remove("arguments");
        let err = lenient(&value).unwrap_err();
        assert!(
            matches!(err, MalformedPlan::MissingField(ref f) if f == "operations[2].arguments"),
            "got: {err}"
        );
    }

    #[test]
    fn rejects_numeric_argument_value() {
        let mut value = alpha_plan();
        value["operations"][0]["arguments"]["size"] = json!(5);
        let err = lenient(&value).unwrap_err();
        assert_eq!(
            err.to_string(),
            "field operations[0].arguments.size must be a string or a list of strings"
        );
    }

    #[test]
    fn rejects_invalid_role() {
        let mut value = alpha_plan();
        value["people"][0]["role"] = json!("overlord");
        let err = lenient(&value).unwrap_err();
        assert!(matches!(err, MalformedPlan::InvalidRole { ref value, .. } if value == "overlord"));
    }

    #[test]
    fn role_is_case_insensitive() {
        let mut value = alpha_plan();
        value["people"][0]["role"] = json!("Manager");
        assert_eq!(lenient(&value).unwrap().people[0].role, Role::Manager);
    }

    #[test]
    fn missing_operation_name_is_tolerated() {
        let mut value = alpha_plan();
        value["operations"][1].as_object_mut().unwrap().remove("name");
        value["operations"][2]["name"] = json!("  ");
        let plan = lenient(&value).expect("missing names must not reject the plan");
        assert!(plan.operations[1].name.is_none());
        assert!(plan.operations[2].name.is_none());
    }

    #[test]
    fn non_string_operation_name_is_rejected() {
        let mut value = alpha_plan();
        value["operations"][0]["name"] = json!(7);
        let err = lenient(&value).unwrap_err();
        assert!(matches!(err, MalformedPlan::WrongType { ref field, .. } if field == "operations[0].name"));
    }

    #[test]
    fn accepts_empty_operations() {
        let value = json!({ "team_name": "Alpha", "people": [], "operations": [] });
        let plan = lenient(&value).unwrap();
        assert!(plan.operations.is_empty());
    }

    #[test]
    fn names_are_trimmed_and_tags_deduplicated() {
        let mut value = alpha_plan();
        value["team_name"] = json!("  Alpha ");
        value["people"][0]["tags"] = json!(["rust", " rust", ""]);
        let plan = lenient(&value).unwrap();
        assert_eq!(plan.team_name, "Alpha");
        assert_eq!(plan.people[0].tags.len(), 1);
    }

    // -- decode --

    #[test]
    fn decodes_fenced_json() {
        let text = "Here is the plan:\n```json\n{\"team_name\": \"Alpha\"}\n```\nDone.";
        let value = decode_plan(text).unwrap();
        assert_eq!(value["team_name"], "Alpha");
    }

    #[test]
    fn decodes_json_with_surrounding_prose() {
        let value = decode_plan("Sure! {\"a\": {\"b\": 1}} Hope that helps.").unwrap();
        assert_eq!(value["a"]["b"], 1);
    }

    #[test]
    fn decode_without_object_fails() {
        assert!(matches!(
            decode_plan("I could not build a plan."),
            Err(MalformedPlan::NoJsonObject)
        ));
        assert!(matches!(decode_plan("} oops {"), Err(MalformedPlan::NoJsonObject)));
    }

    #[test]
    fn backticks_inside_strings_are_not_fences() {
        let text = r#"{"team_name":"Alpha","team_text":"writes ```rust``` daily","people":[],"operations":[]}"#;
        let plan = parse_plan(text, ValidationMode::Lenient, &registry()).unwrap();
        assert_eq!(plan.team_text, "writes ```rust``` daily");
    }

    #[test]
    fn fenced_plan_keeps_backticks_inside_strings() {
        let text = "Plan below.\n```json\n{\"team_name\": \"Alpha\", \"team_text\": \"likes ```sql``` a lot\"}\n```\n";
        let value = decode_plan(text).unwrap();
        assert_eq!(value["team_text"], "likes ```sql``` a lot");
    }

    #[test]
    fn prose_wrapped_plan_keeps_backticks_inside_strings() {
        let value = decode_plan("Sure: {\"team_text\": \"```x```\"} enjoy").unwrap();
        assert_eq!(value["team_text"], "```x```");
    }

    #[test]
    fn indented_fence_is_recognized() {
        let value = decode_plan("Result:\n  ```json\n  {\"a\": 1}\n  ```\n").unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn decode_of_broken_json_fails() {
        assert!(matches!(
            decode_plan("{\"team_name\": }"),
            Err(MalformedPlan::Decode(_))
        ));
    }

    // -- strict: coverage --

    #[test]
    fn lenient_mode_skips_coverage() {
        let mut value = alpha_plan();
        value["operations"] = json!([]);
        assert!(lenient(&value).is_ok());
        assert!(matches!(strict(&value), Err(MalformedPlan::TeamCount(0))));
    }

    #[test]
    fn strict_rejects_two_create_team() {
        let mut value = alpha_plan();
        value["operations"]
            .as_array_mut()
            .unwrap()
            .push(json!({ "name": "createTeam", "arguments": { "name": "Beta" } }));
        assert!(matches!(strict(&value), Err(MalformedPlan::TeamCount(2))));
    }

    #[test]
    fn strict_rejects_person_without_create() {
        let mut value = alpha_plan();
        value["operations"][1]["arguments"]["name"] = json!("Someone Else");
        let err = strict(&value).unwrap_err();
        assert!(
            matches!(err, MalformedPlan::PersonCreateCount { count: 0, .. }),
            "got: {err}"
        );
    }

    #[test]
    fn strict_rejects_missing_role_edge() {
        let mut value = alpha_plan();
        value["operations"].as_array_mut().unwrap().pop();
        let err = strict(&value).unwrap_err();
        assert!(matches!(err, MalformedPlan::RoleEdgeCount { count: 0, .. }));
    }

    #[test]
    fn strict_rejects_role_mismatch() {
        let mut value = alpha_plan();
        value["operations"][2]["name"] = json!("addTeamMember");
        let err = strict(&value).unwrap_err();
        assert!(matches!(err, MalformedPlan::RoleMismatch { ref operation, .. } if operation == "addTeamMember"));
    }

    #[test]
    fn strict_matches_padded_names_in_arguments() {
        let mut value = alpha_plan();
        value["people"][0]["name"] = json!("Bo ");
        value["operations"][0]["arguments"]["name"] = json!(" Alpha");
        value["operations"][1]["arguments"]["name"] = json!("Bo ");
        value["operations"][2]["arguments"]["person_name"] = json!(" Bo");
        value["operations"][2]["arguments"]["team_name"] = json!("Alpha ");
        let plan = strict(&value).expect("padded names should still cover the plan");
        assert_eq!(plan.people[0].name, "Bo");
    }

    #[test]
    fn strict_rejects_create_team_for_another_team() {
        let mut value = alpha_plan();
        value["operations"][0]["arguments"]["name"] = json!("Beta");
        let err = strict(&value).unwrap_err();
        match err {
            MalformedPlan::TeamNameMismatch {
                index,
                operation,
                expected,
                found,
            } => {
                assert_eq!(index, 0);
                assert_eq!(operation, "createTeam");
                assert_eq!(expected, "Alpha");
                assert_eq!(found, "Beta");
            }
            other => panic!("expected TeamNameMismatch, got: {other}"),
        }
    }

    #[test]
    fn strict_rejects_edge_to_another_team() {
        let mut value = alpha_plan();
        value["operations"][2]["arguments"]["team_name"] = json!("Beta");
        let err = strict(&value).unwrap_err();
        assert!(
            matches!(err, MalformedPlan::TeamNameMismatch { index: 2, ref found, .. } if found == "Beta"),
            "got: {err}"
        );
        assert!(lenient(&value).is_ok());
    }

    #[test]
    fn strict_rejects_duplicate_person() {
        let mut value = alpha_plan();
        let bo = value["people"][0].clone();
        value["people"].as_array_mut().unwrap().push(bo);
        assert!(matches!(
            strict(&value),
            Err(MalformedPlan::DuplicatePerson(_))
        ));
    }

    // -- strict: ordering --

    #[test]
    fn strict_rejects_edge_before_person_created() {
        let mut value = alpha_plan();
        let ops = value["operations"].as_array_mut().unwrap();
        ops.swap(1, 2);
        let err = strict(&value).unwrap_err();
        match err {
            MalformedPlan::ReferenceBeforeCreate {
                index,
                kind,
                name,
                created_at,
                ..
            } => {
                assert_eq!(index, 1);
                assert_eq!(kind, EntityKind::Person);
                assert_eq!(name, "Bo");
                assert_eq!(created_at, 2);
            }
            other => panic!("expected ReferenceBeforeCreate, got: {other}"),
        }
    }

    #[test]
    fn strict_rejects_edge_before_team_created() {
        let value = json!({
            "team_name": "Alpha",
            "people": [],
            "operations": [
                { "name": "addTeamMember", "arguments": { "person_name": "Cy", "team_name": "Alpha" } },
                { "name": "createTeam", "arguments": { "name": "Alpha" } }
            ]
        });
        let err = strict(&value).unwrap_err();
        assert!(matches!(
            err,
            MalformedPlan::ReferenceBeforeCreate {
                kind: EntityKind::Team,
                ..
            }
        ));
    }

    #[test]
    fn strict_allows_references_to_existing_entities() {
        // "Cy" is never created in this plan, so it may already be in the store.
        let value = json!({
            "team_name": "Alpha",
            "people": [],
            "operations": [
                { "name": "createTeam", "arguments": { "name": "Alpha" } },
                { "name": "addTeamMember", "arguments": { "person_name": "Cy", "team_name": "Alpha" } }
            ]
        });
        assert!(strict(&value).is_ok());
    }

    #[test]
    fn lenient_mode_does_not_check_ordering() {
        let mut value = alpha_plan();
        value["operations"].as_array_mut().unwrap().swap(1, 2);
        assert!(lenient(&value).is_ok());
    }

    #[test]
    fn parse_plan_runs_decode_and_validate() {
        let text = format!("```json\n{}\n```", alpha_plan());
        let plan = parse_plan(&text, ValidationMode::Strict, &registry()).unwrap();
        assert_eq!(plan.operations.len(), 3);
    }
}
