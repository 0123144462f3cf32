//! Planner prompt construction.
//!
//! Assembles the team request and the registered operation catalog into
//! a single prompt. This module contains pure logic (no I/O).

use crate::registry::{OperationRegistry, OperationSpec, ParamKind};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Everything the planner is told about one request.
#[derive(Debug, Clone)]
pub struct PlanPromptContext {
    /// Name the team must be created under.
    pub team_name: String,
    /// Free-form instructions from the manager.
    pub manager_prompt: String,
    /// Raw text describing candidate people (profiles, notes, scraped pages).
    pub candidates: String,
    /// Operations the planner may use.
    pub operations: Vec<OperationInfo>,
}

/// Simplified operation description for prompt inclusion.
#[derive(Debug, Clone)]
pub struct OperationInfo {
    pub name: String,
    pub description: String,
    /// Rendered parameter list, e.g. `name: string, tags?: string[]`.
    pub signature: String,
}

impl From<&OperationSpec> for OperationInfo {
    fn from(spec: &OperationSpec) -> Self {
        let signature = spec
            .params
            .iter()
            .map(|p| {
                let kind = match p.kind {
                    ParamKind::Text => "string",
                    ParamKind::List => "string[]",
                };
                let optional = if p.required { "" } else { "?" };
                format!("{}{optional}: {kind}", p.name)
            })
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            name: spec.name.clone(),
            description: spec.description.clone(),
            signature,
        }
    }
}

/// Describe every registered operation, sorted by name.
pub fn operations_from_registry(registry: &OperationRegistry) -> Vec<OperationInfo> {
    registry.specs().into_iter().map(OperationInfo::from).collect()
}

// ---------------------------------------------------------------------------
// Prompt construction
// ---------------------------------------------------------------------------

/// JSON schema reference included in every prompt.
const SCHEMA_REFERENCE: &str = r#"## Plan JSON Schema

```json
{
  "team_name": "string",        // REQUIRED. Must equal the requested team name.
  "team_text": "string",        // Short summary of the team.
  "people": [                   // REQUIRED (may be empty).
    {
      "name": "string",         // REQUIRED. Unique within the plan.
      "tags": ["string"],       // Short skill or interest tags.
      "text": "string",         // One-paragraph summary of the person.
      "role": "manager"         // REQUIRED. "manager" or "member".
    }
  ],
  "operations": [               // REQUIRED. Executed in order, one at a time.
    { "name": "createTeam", "arguments": { "name": "string" } }
  ]
}
```

Argument values are strings or arrays of strings. No numbers, booleans or nested objects.
"#;

/// Ordering and coverage rules included in every prompt.
const PLAN_GUIDELINES: &str = r#"## Plan Rules

1. **Exactly one `createTeam`.** It must be the first operation.
2. **One `createPerson` per person.** Its `name` argument must equal the person's `name`.
3. **One role edge per person.** Use `addTeamManager` for managers and `addTeamMember` for members.
4. **Create before you link.** Operations run strictly in list order and refer to teams and people by name, so every `createTeam`/`createPerson` must come before any edge that mentions that name.
5. **Only listed operations.** Unknown operation names fail.
6. **Respond with the JSON object only.** No commentary before or after it.
"#;

/// Build the full planner prompt.
pub fn build_planner_prompt(ctx: &PlanPromptContext) -> String {
    let mut prompt = String::with_capacity(4096);

    prompt.push_str("# Team Planner\n\n");
    prompt.push_str(
        "You turn a manager's request and a set of candidate descriptions into a plan \
         of graph-store operations that creates the team, its people, and the edges \
         linking them.\n\n",
    );

    prompt.push_str(SCHEMA_REFERENCE);
    prompt.push('\n');
    prompt.push_str(PLAN_GUIDELINES);
    prompt.push('\n');

    prompt.push_str("## Available Operations\n\n");
    if ctx.operations.is_empty() {
        prompt.push_str("No operations are registered.\n");
    } else {
        for op in &ctx.operations {
            prompt.push_str(&format!(
                "- `{}({})` -- {}\n",
                op.name, op.signature, op.description
            ));
        }
    }
    prompt.push('\n');

    prompt.push_str("## Request\n\n");
    prompt.push_str(&format!("- **Team name:** `{}`\n\n", ctx.team_name));
    prompt.push_str("### Manager instructions\n\n");
    prompt.push_str(ctx.manager_prompt.trim());
    prompt.push_str("\n\n");

    prompt.push_str("### Candidates\n\n");
    if ctx.candidates.trim().is_empty() {
        prompt.push_str("No candidate text was provided; infer people from the instructions.\n");
    } else {
        prompt.push_str(ctx.candidates.trim());
        prompt.push('\n');
    }

    prompt
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
