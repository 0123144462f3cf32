//! CLI handlers for `roster plan` subcommands.
//!
//! Implements:
//! - `roster plan validate <file>` -- decode and validate a plan file
//! - `roster plan execute <file>`  -- validate, then run it against the store

use std::path::Path;

use anyhow::{Context, Result};

use roster_core::executor::{ExecutionResult, Outcome};
use roster_core::plan::{Plan, TeamBuildOutput, TeamService, ValidationMode, parse_plan};
use roster_core::registry::OperationRegistry;
use roster_store::GraphStore;

// -----------------------------------------------------------------------
// roster plan validate <file>
// -----------------------------------------------------------------------

/// Read a plan file, validate it, and print a summary.
pub fn cmd_validate(file: &Path, mode: ValidationMode, registry: &OperationRegistry) -> Result<()> {
    let content = read_plan_file(file)?;
    let plan = parse_plan(&content, mode, registry)
        .with_context(|| format!("invalid plan file: {}", file.display()))?;

    println!("Plan is valid ({}).", mode_label(mode));
    println!();
    print_plan_summary(&plan);
    Ok(())
}

// -----------------------------------------------------------------------
// roster plan execute <file>
// -----------------------------------------------------------------------

/// Read a plan file, validate it, and execute it against `store`.
pub async fn cmd_execute(
    file: &Path,
    store: &dyn GraphStore,
    mode: ValidationMode,
    registry: &OperationRegistry,
    json: bool,
) -> Result<()> {
    let content = read_plan_file(file)?;
    let output = TeamService::new(store, registry, mode)
        .execute_text(&content)
        .await
        .with_context(|| format!("invalid plan file: {}", file.display()))?;
    print_output(&output, json)
}

// -----------------------------------------------------------------------
// Shared output
// -----------------------------------------------------------------------

pub(crate) fn read_plan_file(file: &Path) -> Result<String> {
    std::fs::read_to_string(file)
        .with_context(|| format!("failed to read plan file: {}", file.display()))
}

/// Print a team build or plan run, as JSON or as a table.
pub(crate) fn print_output(output: &TeamBuildOutput, json: bool) -> Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(output).context("failed to serialize results")?;
        println!("{rendered}");
        return Ok(());
    }
    print_plan_summary(&output.plan);
    println!();
    print_results(&output.execution_results);
    Ok(())
}

fn print_plan_summary(plan: &Plan) {
    println!("  Team:       {}", plan.team_name);
    if !plan.team_text.is_empty() {
        println!("  Summary:    {}", plan.team_text);
    }
    println!("  People:     {}", plan.people.len());
    for person in &plan.people {
        let tags = person.tags.iter().cloned().collect::<Vec<_>>().join(", ");
        if tags.is_empty() {
            println!("    - {} ({})", person.name, person.role);
        } else {
            println!("    - {} ({}) [{}]", person.name, person.role, tags);
        }
    }
    println!("  Operations: {}", plan.operations.len());
}

fn print_results(results: &[ExecutionResult]) {
    if results.is_empty() {
        println!("No operations to execute.");
        return;
    }

    let name_w = results
        .iter()
        .map(|r| r.operation_name.as_deref().map_or(9, str::len))
        .max()
        .unwrap_or(9)
        .max(9);

    println!("{:<3}  {:<name_w$}  {:<9}  DETAIL", "#", "OPERATION", "STATUS");
    for (index, result) in results.iter().enumerate() {
        let name = result.operation_name.as_deref().unwrap_or("<unnamed>");
        let (status, detail) = match &result.outcome {
            Outcome::Succeeded(_) => ("ok", String::new()),
            Outcome::Failed(e) => ("failed", format!("{}: {e}", e.kind())),
        };
        println!("{index:<3}  {name:<name_w$}  {status:<9}  {detail}");
    }

    let failed = results.iter().filter(|r| !r.is_success()).count();
    println!();
    if failed == 0 {
        println!("All {} operations succeeded.", results.len());
    } else {
        println!("{failed} of {} operations failed.", results.len());
    }
}

fn mode_label(mode: ValidationMode) -> &'static str {
    match mode {
        ValidationMode::Lenient => "lenient",
        ValidationMode::Strict => "strict",
    }
}
