//! Campus Nav - Entry Point
//!
//! Loads the configuration and campus data, then either runs a single
//! subcommand or drops into an interactive prompt where each line is
//! treated as a route instruction.

use campus_nav::command::{response_body, RouteRequestOrchestrator};
use campus_nav::core::error::Result;
use campus_nav::core::types::{PointId, TravelMode};
use campus_nav::core::NavConfig;
use campus_nav::routing::feature::point_feature;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "campus-nav")]
#[command(about = "Plan campus routes from natural-language instructions")]
struct Args {
    /// TOML configuration file
    #[arg(long, default_value = "campus-nav.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every catalog point as GeoJSON
    Points,
    /// Resolve a location name to a catalog point
    Resolve { name: String },
    /// Extract start/end from an instruction with the rule-based parser
    Parse { text: String },
    /// Plan a route between two point IDs
    Route {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// walking, driving or bicycling
        #[arg(long, default_value = "walking", value_parser = parse_mode)]
        mode: TravelMode,
    },
    /// Plan a route from a natural-language instruction
    Ask { instruction: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("campus_nav=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = NavConfig::load_or_default(Some(&args.config))?;
    let orchestrator = RouteRequestOrchestrator::from_config(&config)?;
    let rt = Runtime::new()?;

    match args.command {
        Some(Command::Points) => {
            let features: Vec<Value> = orchestrator
                .resolver()
                .catalog()
                .iter()
                .map(point_feature)
                .collect();
            print_json(&json!({ "type": "FeatureCollection", "features": features }))?;
        }
        Some(Command::Resolve { name }) => {
            print_json(&json!({ "resolution": orchestrator.resolver().resolve(&name) }))?;
        }
        Some(Command::Parse { text }) => {
            print_json(&json!({ "endpoints": orchestrator.parser().extract_endpoints(&text) }))?;
        }
        Some(Command::Route { start, end, mode }) => {
            let outcome = rt.block_on(orchestrator.plan_between(
                &PointId::new(start),
                &PointId::new(end),
                mode,
            ));
            print_json(&response_body(&outcome, &config.style))?;
        }
        Some(Command::Ask { instruction }) => {
            let outcome = rt.block_on(orchestrator.process_instruction(&instruction));
            print_json(&response_body(&outcome, &config.style))?;
        }
        None => run_prompt(&rt, &orchestrator, &config)?,
    }

    Ok(())
}

/// Interactive loop: one instruction per line
fn run_prompt(rt: &Runtime, orchestrator: &RouteRequestOrchestrator, config: &NavConfig) -> Result<()> {
    println!("\n=== CAMPUS NAV ===");
    println!("{} points loaded", orchestrator.resolver().catalog().len());
    println!();
    println!("Commands:");
    println!("  points          - List point names");
    println!("  find <name>     - Resolve a location name");
    println!("  quit / q        - Exit");
    println!("  <any text>      - Route instruction, e.g. \"from the library to the gym\"");
    if !orchestrator.has_extractor() {
        println!("  (LLM_API_KEY not set - instructions use the rule-based parser)");
    }
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "quit" || input == "q" {
            break;
        }

        if input == "points" {
            for point in orchestrator.resolver().catalog().iter() {
                println!("  {:>6}  {}", point.id, point.name);
            }
            continue;
        }

        if let Some(name) = input.strip_prefix("find ") {
            match orchestrator.resolver().resolve(name) {
                Some(r) => println!("{} -> {} ({}) via {:?}", name, r.name, r.point_id, r.stage),
                None => println!("No point matches {:?}", name),
            }
            continue;
        }

        match rt.block_on(orchestrator.process_instruction(input)) {
            Ok(route) => {
                println!();
                println!("Route: {} -> {}", route.start_name, route.end_name);
                println!("  Mode: {}", route.mode);
                println!("  Distance: {:.0} m", route.distance);
                println!("  Duration: {:.0} min", route.duration / 60.0);
                println!("  Points: {}", route.path.len());
                println!("  Color: {}", config.style.color_for(route.mode));
                println!();
            }
            Err(e) => {
                println!("Could not plan route: {}", e);
                if e.is_retryable() {
                    println!("  (temporary failure - try again)");
                }
            }
        }
    }

    println!("\nGoodbye!");
    Ok(())
}

fn parse_mode(s: &str) -> std::result::Result<TravelMode, String> {
    TravelMode::from_name(s).ok_or_else(|| {
        let known: Vec<&str> = TravelMode::ALL.iter().map(TravelMode::as_str).collect();
        format!("unknown mode {:?} (expected one of: {})", s, known.join(", "))
    })
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
