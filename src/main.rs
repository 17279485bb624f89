mod abort;
mod config;
mod geo;
mod predict;
mod render;
mod tracker;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;

use crate::abort::AbortSignal;
use crate::config::{Config, ConfigError};
use crate::predict::{
    GroundStation, Predict, PredictClient, PredictError, SatelliteObservation, Visibility,
    DEFAULT_HOST, DEFAULT_SERVICE,
};
use crate::render::{Renderer, GLOBAL_CONFIG};
use crate::tracker::{OverlayPaths, Runner, TrackerConfig, UpdateInterval};

#[derive(Parser)]
#[command(name = "earthtrack")]
#[command(version, about = "Satellite footprint overlays for xplanet/xearth from a predict server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the server and keep the renderer overlay current
    Run(RunArgs),
    /// Print station and satellite state as YAML
    Status(ServerArgs),
    /// Send one raw command and print the reply
    Query {
        #[command(flatten)]
        server: ServerArgs,
        #[arg(required = true, num_args = 1..)]
        command: Vec<String>,
    },
    /// Print the range circle around a sub-satellite point
    #[command(allow_negative_numbers = true)]
    Circle {
        /// Sub-satellite latitude, degrees
        latitude: f64,
        /// Sub-satellite longitude, degrees west (0..360)
        longitude: f64,
        /// Footprint, km
        footprint_km: f64,
        /// Visibility code (D, N or V) used for coloring
        #[arg(long, default_value = "V")]
        visibility: String,
    },
}

#[derive(Args)]
struct ServerArgs {
    /// Prediction server host
    #[arg(short = 'H', long)]
    host: Option<String>,
    /// UDP service name or port number
    #[arg(long)]
    service: Option<String>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    server: ServerArgs,
    /// Satellite to center the map on
    #[arg(short = 'c', long, conflicts_with = "track_zoom")]
    track: Option<String>,
    /// Satellite to center the map on, zoomed to its footprint
    #[arg(short = 'C', long)]
    track_zoom: Option<String>,
    /// Seconds between updates (5..=120, otherwise 20)
    #[arg(short = 'u', long)]
    interval: Option<u64>,
    /// Extra arguments passed to the renderer
    #[arg(short = 'x', long, allow_hyphen_values = true)]
    extra: Option<String>,
    #[arg(long, value_enum)]
    renderer: Option<Renderer>,
    /// Directory for the overlay files (default: home directory)
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Write overlay files without running the renderer
    #[arg(long)]
    no_render: bool,
    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,
    /// YAML settings file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct Snapshot {
    server_time: Option<chrono::DateTime<chrono::Utc>>,
    station: GroundStation,
    satellites: Vec<SatelliteObservation>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Status(server) => status(&server),
        Commands::Query { server, command } => query(&server, &command.join(" ")),
        Commands::Circle {
            latitude,
            longitude,
            footprint_km,
            visibility,
        } => circle(latitude, longitude, footprint_km, &visibility),
    }
}

fn run(args: RunArgs) -> ExitCode {
    let config = match tracker_config(args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let client = PredictClient::new(&config.host, &config.service);
    log::info!(
        "Tracking {} via {}:{} every {}s for {}",
        config.track.as_deref().unwrap_or("nothing"),
        config.host,
        config.service,
        config.interval.secs(),
        config.renderer
    );

    let (abort_tx, abort_rx) = mpsc::channel();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = abort_tx.send(AbortSignal {
            reason: "interrupted".to_string(),
        });
    }) {
        log::warn!("Failed to install signal handler: {}", e);
    }

    let runner = Runner {
        client,
        config,
        abort_rx,
    };

    match runner.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn tracker_config(args: RunArgs) -> Result<TrackerConfig, ConfigError> {
    let file = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let (track, zoom) = match (args.track, args.track_zoom) {
        (_, Some(name)) => (Some(name), true),
        (Some(name), None) => (Some(name), false),
        (None, None) => (file.track, file.zoom),
    };

    let output_dir = args
        .output_dir
        .or(file.output_dir)
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir);

    Ok(TrackerConfig {
        host: args
            .server
            .host
            .or(file.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        service: args
            .server
            .service
            .or(file.service)
            .unwrap_or_else(|| DEFAULT_SERVICE.to_string()),
        track,
        zoom,
        interval: args
            .interval
            .or(file.interval)
            .map(UpdateInterval::clamped)
            .unwrap_or_default(),
        renderer: args.renderer.or(file.renderer).unwrap_or_default(),
        extra: args.extra.or(file.extra).unwrap_or_default(),
        render: !args.no_render,
        once: args.once,
        paths: OverlayPaths::in_dir(&output_dir),
        global_config: file
            .global_config
            .unwrap_or_else(|| PathBuf::from(GLOBAL_CONFIG)),
    })
}

fn client_for(server: &ServerArgs) -> PredictClient {
    PredictClient::new(
        server.host.as_deref().unwrap_or(DEFAULT_HOST),
        server.service.as_deref().unwrap_or(DEFAULT_SERVICE),
    )
}

fn status(server: &ServerArgs) -> ExitCode {
    let client = client_for(server);
    let snapshot = match take_snapshot(&client) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error querying {}: {}", client.host(), e);
            return ExitCode::FAILURE;
        }
    };

    match serde_yaml::to_string(&snapshot) {
        Ok(yaml) => {
            print!("{}", yaml);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn take_snapshot<P: Predict>(client: &P) -> Result<Snapshot, PredictError> {
    let station = client.get_qth()?;
    let satellites = client
        .get_list()?
        .iter()
        .map(|name| client.get_sat(name))
        .collect::<Result<Vec<_>, _>>()?;
    let server_time = chrono::DateTime::from_timestamp(client.get_time()?, 0);

    Ok(Snapshot {
        server_time,
        station,
        satellites,
    })
}

fn query(server: &ServerArgs, command: &str) -> ExitCode {
    let client = client_for(server);
    match client.server_addr() {
        Ok(addr) => log::debug!("Sending {:?} to {}", command, addr),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    match client.send_command(command) {
        Ok(reply) => {
            print!("{}", reply);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn circle(latitude: f64, longitude: f64, footprint_km: f64, visibility: &str) -> ExitCode {
    if !(-90.0..=90.0).contains(&latitude) || !(0.0..360.0).contains(&longitude) {
        eprintln!("Latitude must be within -90..=90 and longitude within 0..360");
        return ExitCode::FAILURE;
    }

    let circle = geo::range_circle(
        latitude,
        longitude,
        footprint_km,
        &Visibility::from_code(visibility),
    );
    log::debug!("Footprint half-angle {:.3} deg", circle.beta().to_degrees());

    for vertex in circle {
        println!("{}", tracker::vertex_line(&vertex, true));
    }
    ExitCode::SUCCESS
}
