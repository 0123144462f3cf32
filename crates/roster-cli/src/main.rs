mod build_cmd;
mod config;
mod plan_cmds;
mod serve_cmd;
#[cfg(test)]
mod test_util;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use roster_core::plan::{OperationInfo, TeamService, operations_from_registry};
use roster_core::planner::{OpenAiPlanner, Planner};
use roster_core::registry::OperationRegistry;
use roster_store::{HelixClient, StoreConfig};

use config::RosterConfig;

#[derive(Parser)]
#[command(name = "roster", about = "Build teams in a graph store from planner-generated plans")]
struct Cli {
    /// Store URL (overrides ROSTER_STORE_URL / HELIX_API_ENDPOINT)
    #[arg(long, global = true)]
    store_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a roster config file
    Init {
        /// Graph store URL
        #[arg(long, default_value = StoreConfig::DEFAULT_URL)]
        url: String,
        /// Planner API key (stored in the config file)
        #[arg(long)]
        api_key: Option<String>,
        /// Planner model
        #[arg(long)]
        model: Option<String>,
        /// Validate plans strictly by default
        #[arg(long)]
        strict: bool,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Serve the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 5000)]
        port: u16,
        /// Validate plans strictly by default
        #[arg(long)]
        strict: bool,
    },
    /// Plan a team with the planner and execute it
    Build {
        /// Name of the team to create
        #[arg(long)]
        team_name: String,
        /// Instructions for the planner
        #[arg(long)]
        prompt: String,
        /// File with raw candidate descriptions
        #[arg(long)]
        candidates: Option<PathBuf>,
        /// Reject plans that fail coverage or ordering checks
        #[arg(long)]
        strict: bool,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Plan file commands
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// List registered store operations
    Operations,
    /// Print shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Decode and validate a plan file
    Validate {
        /// Path to the plan JSON file
        file: PathBuf,
        /// Also check coverage and create-before-reference ordering
        #[arg(long)]
        strict: bool,
    },
    /// Validate a plan file and execute it against the store
    Execute {
        /// Path to the plan JSON file
        file: PathBuf,
        /// Also check coverage and create-before-reference ordering
        #[arg(long)]
        strict: bool,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Execute the `roster init` command: write config file.
fn cmd_init(
    url: &str,
    api_key: Option<String>,
    model: Option<String>,
    strict: bool,
    force: bool,
) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let has_key = api_key.is_some();
    let cfg = config::ConfigFile {
        store: config::StoreSection {
            url: url.to_string(),
            timeout_secs: None,
        },
        planner: config::PlannerSection {
            api_key,
            model,
            base_url: None,
        },
        validation: config::ValidationSection { strict },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  store.url = {url}");
    println!("  validation.strict = {strict}");
    if has_key {
        println!("  planner.api_key = (set)");
    } else {
        println!();
        println!("No planner API key stored; set OPENAI_API_KEY before `roster build`.");
    }

    Ok(())
}

/// Execute the `roster operations` command.
fn cmd_operations(registry: &OperationRegistry) {
    let ops: Vec<OperationInfo> = operations_from_registry(registry);
    let name_w = ops.iter().map(|o| o.name.len()).max().unwrap_or(4).max(4);
    for op in &ops {
        println!("{:<name_w$}  ({})", op.name, op.signature);
        println!("{:<name_w$}  {}", "", op.description);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let registry = OperationRegistry::with_builtin()?;

    match cli.command {
        Commands::Init {
            url,
            api_key,
            model,
            strict,
            force,
        } => {
            cmd_init(&url, api_key, model, strict, force)?;
        }
        Commands::Serve { bind, port, strict } => {
            let resolved = RosterConfig::resolve(cli.store_url.as_deref(), strict)?;
            let client = HelixClient::connect(&resolved.store)?;
            let planner: Option<Arc<dyn Planner>> = match resolved.planner.clone() {
                Some(cfg) => Some(Arc::new(OpenAiPlanner::new(cfg)?)),
                None => {
                    tracing::warn!("no planner API key configured; /api/teams and /api/agent are disabled");
                    None
                }
            };
            let state = serve_cmd::AppState {
                store: Arc::new(client.clone()),
                store_endpoint: client.endpoint().to_string(),
                planner,
                registry: Arc::new(registry),
                mode: resolved.mode,
            };
            let result = serve_cmd::run_serve(state, &bind, port).await;
            client.close();
            result?;
        }
        Commands::Build {
            team_name,
            prompt,
            candidates,
            strict,
            json,
        } => {
            let resolved = RosterConfig::resolve(cli.store_url.as_deref(), strict)?;
            let planner = OpenAiPlanner::new(resolved.require_planner()?)?;
            let client = HelixClient::connect(&resolved.store)?;
            let service = TeamService::new(&client, &registry, resolved.mode);
            let options = build_cmd::BuildOptions {
                team_name: &team_name,
                prompt: &prompt,
                candidates: candidates.as_deref(),
                json,
            };
            let result = build_cmd::run_build(&service, &planner, &options).await;
            client.close();
            result?;
        }
        Commands::Plan { command } => match command {
            PlanCommands::Validate { file, strict } => {
                let resolved = RosterConfig::resolve(cli.store_url.as_deref(), strict)?;
                plan_cmds::cmd_validate(&file, resolved.mode, &registry)?;
            }
            PlanCommands::Execute { file, strict, json } => {
                let resolved = RosterConfig::resolve(cli.store_url.as_deref(), strict)?;
                let client = HelixClient::connect(&resolved.store)?;
                let result =
                    plan_cmds::cmd_execute(&file, &client, resolved.mode, &registry, json).await;
                client.close();
                result?;
            }
        },
        Commands::Operations => {
            cmd_operations(&registry);
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "roster", &mut std::io::stdout());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn plan_execute_parses_flags() {
        let cli = Cli::try_parse_from([
            "roster",
            "--store-url",
            "http://helix:6969",
            "plan",
            "execute",
            "team.json",
            "--strict",
        ])
        .unwrap();
        assert_eq!(cli.store_url.as_deref(), Some("http://helix:6969"));
        match cli.command {
            Commands::Plan {
                command: PlanCommands::Execute { file, strict, json },
            } => {
                assert_eq!(file, PathBuf::from("team.json"));
                assert!(strict);
                assert!(!json);
            }
            _ => panic!("expected plan execute"),
        }
    }

    #[test]
    fn build_requires_team_name_and_prompt() {
        assert!(Cli::try_parse_from(["roster", "build", "--team-name", "Alpha"]).is_err());
        assert!(
            Cli::try_parse_from(["roster", "build", "--team-name", "Alpha", "--prompt", "p"]).is_ok()
        );
    }

    #[test]
    fn init_writes_config_and_refuses_overwrite() {
        let _lock = test_util::lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        let orig_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", tmp.path()) };

        let first = cmd_init("http://helix:6969", None, None, true, false);
        let second = cmd_init("http://other:6969", None, None, false, false);
        let forced = cmd_init("http://other:6969", None, None, false, true);
        let loaded = config::load_config();

        match orig_xdg {
            Some(x) => unsafe { std::env::set_var("XDG_CONFIG_HOME", x) },
            None => unsafe { std::env::remove_var("XDG_CONFIG_HOME") },
        }

        assert!(first.is_ok());
        let msg = second.unwrap_err().to_string();
        assert!(msg.contains("already exists"), "unexpected error: {msg}");
        assert!(forced.is_ok());
        assert_eq!(loaded.unwrap().store.url, "http://other:6969");
    }
}
