//! Flight Operations Desk CLI
//!
//! Runs a single desk request against a JSON roster file and prints the
//! answer as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ops_agent::request::{EntityRefs, RawFilters};
use ops_agent::{AgentContext, AgentResponse, Config, RawRequest, StructuredRequest};
use ops_store::JsonFileStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ops-cli")]
#[command(about = "Ask the flight operations desk about pilots, drones and missions")]
struct Args {
    /// JSON roster document
    #[arg(short, long, env = "OPS_DATA_FILE", default_value = "data/roster.json")]
    data: PathBuf,

    /// Request kind
    #[arg(short, long, value_enum, required_unless_present = "text")]
    kind: Option<Kind>,

    /// Free-text request, handed to the request parser instead of --kind
    #[arg(long, conflicts_with = "kind")]
    text: Option<String>,

    /// Mission (project) id
    #[arg(short, long)]
    mission: Option<String>,

    /// Pilot id
    #[arg(short, long)]
    pilot: Option<String>,

    /// Drone id
    #[arg(long)]
    drone: Option<String>,

    /// Pilot skill or certification to look for
    #[arg(long)]
    skill: Option<String>,

    /// Drone capability to look for
    #[arg(long)]
    capability: Option<String>,

    /// Restrict answers to one location
    #[arg(short, long)]
    location: Option<String>,

    /// Day of interest (YYYY-MM-DD, MM/DD/YYYY or DD/MM/YYYY)
    #[arg(long)]
    date: Option<String>,

    /// Side of the assignment to change on reassign
    #[arg(long, value_enum)]
    role: Option<RoleArg>,

    /// Print only the one-line summary
    #[arg(long)]
    summary: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    QueryAvailability,
    QueryCapability,
    CalculateCost,
    DetectConflicts,
    Reassign,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RoleArg {
    Pilot,
    Drone,
}

impl Args {
    fn raw_request(&self, kind: Kind) -> RawRequest {
        RawRequest {
            kind: kind
                .to_possible_value()
                .map(|v| v.get_name().to_string())
                .unwrap_or_default(),
            entity_refs: EntityRefs {
                mission_id: self.mission.clone(),
                pilot_id: self.pilot.clone(),
                drone_id: self.drone.clone(),
            },
            filters: RawFilters {
                skill: self.skill.clone(),
                capability: self.capability.clone(),
                location: self.location.clone(),
                date: self.date.clone(),
                role: self.role.map(|r| match r {
                    RoleArg::Pilot => "pilot".to_string(),
                    RoleArg::Drone => "drone".to_string(),
                }),
            },
            raw_text: String::new(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env();

    if !args.data.exists() {
        anyhow::bail!("roster file {} does not exist", args.data.display());
    }
    info!(path = %args.data.display(), "Loading roster");

    let store = Arc::new(JsonFileStore::new(&args.data));
    let ctx = AgentContext::over_store(store, config.severity);

    let response = run(&ctx, &args).await?;

    if args.summary {
        println!("{}", response.summary);
    } else {
        println!("{}", serde_json::to_string_pretty(&response)?);
    }
    Ok(())
}

async fn run(ctx: &AgentContext, args: &Args) -> Result<AgentResponse> {
    if let Some(text) = &args.text {
        return ctx.ask(text).await.context("request failed");
    }

    let kind = args
        .kind
        .context("either --kind or --text is required")?;
    let request = StructuredRequest::try_from(args.raw_request(kind))?;
    ctx.handle(&request).await.context("request failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_flags_become_request() {
        let args = Args::parse_from([
            "ops-cli",
            "--kind",
            "reassign",
            "--mission",
            "PRJ001",
            "--role",
            "drone",
        ]);
        let raw = args.raw_request(args.kind.unwrap());
        assert_eq!(raw.kind, "reassign");

        let request = StructuredRequest::try_from(raw).unwrap();
        assert_eq!(request.entity_refs.mission_id.as_deref(), Some("PRJ001"));
        assert!(request.filters.role.is_some());
    }

    #[test]
    fn test_kind_names_match_wire_names() {
        for kind in Kind::value_variants() {
            let name = kind.to_possible_value().unwrap().get_name().to_string();
            assert!(name.parse::<ops_agent::RequestKind>().is_ok(), "{name}");
        }
    }
}
