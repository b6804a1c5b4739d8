use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};

use tripplanner::config::TripPlannerConfig;
use tripplanner::{Itinerary, PlannerSession, TripPlanner, TripRequest, TripType, cache, itinerary, map};

#[derive(Debug, Parser)]
#[command(
    name = "tripplanner",
    version,
    about = "Trip planning on OpenStreetMap: routes, points of interest and cost estimates"
)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Show debug logging and configuration details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Plan a trip: route, points of interest, costs and an itinerary
    Plan(PlanArgs),
    /// Suggest full addresses for a partially typed location
    Suggest {
        /// At least three characters of an address
        query: String,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Where the trip starts
    #[arg(long)]
    pub from: String,

    /// Where the trip ends
    #[arg(long)]
    pub to: String,

    #[arg(long, value_enum, default_value_t = TripType::Road)]
    pub trip_type: TripType,

    /// Travel back to the start at the end of the trip
    #[arg(long)]
    pub round_trip: bool,

    /// Departure date, YYYY-MM-DD
    #[arg(long)]
    pub departure_date: String,

    /// Departure time, e.g. 08:30
    #[arg(long)]
    pub departure_time: Option<String>,

    /// Return date, YYYY-MM-DD
    #[arg(long, requires = "round_trip")]
    pub return_date: Option<String>,

    /// Return time, e.g. 18:00
    #[arg(long, requires = "return_date")]
    pub return_time: Option<String>,

    #[arg(long, default_value_t = 1)]
    pub passengers: u32,

    /// Vehicle fuel economy in miles per gallon
    #[arg(long)]
    pub mpg: Option<f64>,

    #[arg(long)]
    pub fuel_type: Option<String>,

    /// Estimated flight cost in USD
    #[arg(long)]
    pub flight_cost: Option<f64>,

    /// Estimated accommodation cost in USD
    #[arg(long)]
    pub accommodation_cost: Option<f64>,

    /// Total budget in USD
    #[arg(long)]
    pub budget: Option<f64>,

    /// Comma separated interests, e.g. "mini golf, museums"
    #[arg(long, default_value = "")]
    pub interests: String,

    /// Comma separated dietary restrictions
    #[arg(long, default_value = "")]
    pub dietary: String,

    /// Directory for the itinerary and map files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Print the plan as JSON instead of the text itinerary
    #[arg(long)]
    pub json: bool,

    /// Do not write itinerary or map files
    #[arg(long)]
    pub no_files: bool,
}

impl From<&PlanArgs> for TripRequest {
    fn from(args: &PlanArgs) -> Self {
        TripRequest {
            start_location: args.from.trim().to_string(),
            end_location: args.to.trim().to_string(),
            trip_type: args.trip_type,
            round_trip: args.round_trip,
            departure_date: args.departure_date.trim().to_string(),
            departure_time: args.departure_time.clone(),
            return_date: args.return_date.clone(),
            return_time: args.return_time.clone(),
            passengers: args.passengers,
            vehicle_mpg: args.mpg,
            fuel_type: args.fuel_type.clone(),
            flight_cost: args.flight_cost,
            accommodation_cost: args.accommodation_cost,
            budget: args.budget,
            interests: TripRequest::parse_list(&args.interests),
            dietary_restrictions: TripRequest::parse_list(&args.dietary),
        }
    }
}

pub async fn run(args: Cli) -> Result<()> {
    let config = TripPlannerConfig::load_from_path(args.config.clone())?;
    tripplanner::logging::init(&config.logging, args.verbose)?;

    match args.command {
        None => {
            print_banner(&config, args.config.as_deref(), args.verbose);
            Ok(())
        }
        Some(Command::Config) => {
            let rendered = serde_json::to_string_pretty(&config)
                .with_context(|| "Failed to render configuration")?;
            println!("{rendered}");
            Ok(())
        }
        Some(Command::Suggest { query }) => {
            let planner = TripPlanner::from_config(&config)?;
            let suggestions = planner.suggest(&query).await?;
            if suggestions.is_empty() {
                println!("No suggestions for '{query}'");
            }
            for suggestion in suggestions {
                println!("{suggestion}");
            }
            Ok(())
        }
        Some(Command::Plan(plan_args)) => plan(&config, &plan_args).await,
    }
}

async fn plan(config: &TripPlannerConfig, args: &PlanArgs) -> Result<()> {
    let request = TripRequest::from(args);
    // Fail on bad input before touching the cache or the network
    request.validate()?;

    if config.cache.enabled {
        if let Err(e) = cache::init(&config.cache.location) {
            warn!("Response cache unavailable, continuing without it: {:#}", e);
        }
    }

    let planner = TripPlanner::from_config(config)?;
    let mut session = PlannerSession::new();
    let plan = session.submit(&planner, request).await?;

    if args.json {
        let rendered =
            serde_json::to_string_pretty(plan).with_context(|| "Failed to render plan")?;
        println!("{rendered}");
    } else {
        print!("{}", Itinerary::new(plan));
    }

    if !args.no_files {
        let directory = args
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.output.directory));
        let files = itinerary::export(plan, &directory)?;
        let map_path = map::write_map(plan, &directory)?;
        debug!("Exported {:?}", files);
        eprintln!();
        eprintln!("Itinerary: {}", files.pdf.display());
        eprintln!("Map:       {}", map_path.display());
    }

    session.reset();
    Ok(())
}

fn print_banner(config: &TripPlannerConfig, config_path: Option<&Path>, verbose: bool) {
    println!("TripPlanner v{}", tripplanner::VERSION);
    println!("Routes, points of interest and cost estimates from OpenStreetMap services.");
    println!("Nominatim, OSRM and Overpass are public: no API key or setup required.");
    println!();
    println!("Try: tripplanner plan --from \"Chicago, IL\" --to \"St. Louis, MO\" --departure-date 2025-07-04");
    println!("Run `tripplanner --help` for all commands.");

    if verbose {
        let path = config_path
            .map(Path::to_path_buf)
            .or_else(TripPlannerConfig::get_config_path)
            .map_or_else(|| "defaults".to_string(), |p| p.display().to_string());
        println!();
        println!("Using config from: {path}");
        println!("Cache location: {}", config.cache.location);
        println!("Log level: {}", config.logging.level);
        println!("Nominatim: {}", config.services.nominatim_url);
        println!("OSRM: {}", config.services.osrm_url);
        println!("Overpass: {}", config.services.overpass_url);
    }
}
