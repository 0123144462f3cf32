//! Plan handling: format types, decoding and validation, prompt
//! construction, and the team build service.

pub mod format;
pub mod generate;
pub mod parser;
pub mod service;

pub use format::{Operation, PersonDescriptor, Plan, Role, RoleParseError};
pub use generate::{OperationInfo, PlanPromptContext, build_planner_prompt, operations_from_registry};
pub use parser::{
    MalformedPlan, ValidationMode, check_coverage, check_ordering, decode_plan, parse_plan,
    validate_plan, validate_structure,
};
pub use service::{TeamBuildError, TeamBuildOutput, TeamRequest, TeamService};
