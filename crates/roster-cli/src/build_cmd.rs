//! `roster build`: plan a team with the planner and execute the plan.

use std::path::Path;

use anyhow::{Context, Result, bail};

use roster_core::plan::{TeamBuildError, TeamRequest, TeamService};
use roster_core::planner::Planner;

use crate::plan_cmds::print_output;

/// Options for a single `roster build` run.
pub struct BuildOptions<'a> {
    pub team_name: &'a str,
    pub prompt: &'a str,
    pub candidates: Option<&'a Path>,
    pub json: bool,
}

pub async fn run_build(
    service: &TeamService<'_>,
    planner: &dyn Planner,
    options: &BuildOptions<'_>,
) -> Result<()> {
    let raw_candidate_text = match options.candidates {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read candidates from {}", path.display()))?,
        None => String::new(),
    };
    let request = TeamRequest {
        team_name: options.team_name.to_string(),
        manager_prompt: options.prompt.to_string(),
        raw_candidate_text,
    };

    match service.build_team(planner, &request).await {
        Ok(output) => print_output(&output, options.json),
        Err(TeamBuildError::Malformed { error, raw_output }) => {
            eprintln!("Planner output:");
            eprintln!("{raw_output}");
            bail!("planner returned a malformed plan: {error}");
        }
        Err(e) => Err(e.into()),
    }
}
