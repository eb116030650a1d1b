use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use uavcast::fetch::build_client;
use uavcast::projectors::{
    ChartMetric, comparison_chart, project_comparison, project_profile, project_summary,
    project_timeline,
};
use uavcast::render::{Heading, ProfileView, TimelineView};
use uavcast::{
    AppContext, ForecastSnapshot, Geocoder, Location, LocationInput, ProviderId, UavcastConfig,
    UavcastError, WindUnit, logging,
};

#[derive(Debug, Parser)]
#[command(name = "uavcast", version, about = "Multi-source wind forecasts for UAV pilots.")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, env = "UAVCAST_CONFIG")]
    config: Option<PathBuf>,
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Latitude of the point of interest
    #[arg(long, global = true, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,
    /// Longitude of the point of interest
    #[arg(long, global = true, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,
    /// Place name or "lat,lon" instead of --lat/--lon
    #[arg(long, global = true, conflicts_with_all = ["lat", "lon"])]
    place: Option<String>,
    /// Wind speed unit: kmh, ms, mph or kt
    #[arg(long, global = true)]
    unit: Option<WindUnit>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Current conditions from one provider
    Conditions {
        #[arg(short, long, default_value = "gfs")]
        provider: ProviderId,
    },
    /// Next 24 hours from a model provider
    Forecast {
        #[arg(short, long, default_value = "gfs")]
        provider: ProviderId,
    },
    /// Wind by altitude
    Profile {
        #[arg(short, long, default_value = "gfs")]
        provider: ProviderId,
    },
    /// All providers side by side
    Compare,
    /// Keep refreshing and redraw current conditions until Ctrl-C
    Watch {
        #[arg(short, long, default_value = "gfs")]
        provider: ProviderId,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<UavcastError>() {
                Some(err) => eprintln!("Error: {}", err.user_message()),
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = UavcastConfig::load_from_path(cli.config.clone())?;
    logging::init(&config.logging, cli.verbose)?;
    info!("uavcast {} starting", uavcast::VERSION);

    let mut app = AppContext::from_config(&config)?;
    if let Some(unit) = cli.unit {
        app.set_wind_unit(unit);
    }
    if let Some(location) = resolve_location(&cli, &config).await? {
        app.set_location(location)?;
    }

    match cli.cmd {
        Command::Conditions { provider } => {
            let snapshot = refresh(&app).await?;
            print_conditions(&app, &snapshot, provider);
        }
        Command::Forecast { provider } => {
            let snapshot = refresh(&app).await?;
            let rows = project_timeline(&snapshot.store, provider, app.settings(), app.clock());
            print!("{}", heading("Hourly forecast", &snapshot.location, Some(provider)));
            print!("{}", TimelineView { rows: &rows, unit: app.settings().wind_unit });
        }
        Command::Profile { provider } => {
            let snapshot = refresh(&app).await?;
            let rows = project_profile(&snapshot.store, provider, app.settings(), app.clock());
            print!("{}", heading("Wind profile", &snapshot.location, Some(provider)));
            print!("{}", ProfileView { rows: &rows, unit: app.settings().wind_unit });
        }
        Command::Compare => {
            let snapshot = refresh(&app).await?;
            let table = project_comparison(&snapshot.store, app.settings(), app.clock());
            print!("{}", heading("Model comparison", &snapshot.location, None));
            println!("{table}");
            for metric in [ChartMetric::Wind, ChartMetric::Temperature] {
                println!("{}", comparison_chart(&snapshot.store, metric, app.settings()));
            }
        }
        Command::Watch { provider } => watch(&app, provider, &config).await?,
    }

    Ok(())
}

async fn resolve_location(cli: &Cli, config: &UavcastConfig) -> Result<Option<Location>> {
    if let (Some(lat), Some(lon)) = (cli.lat, cli.lon) {
        return Ok(Some(Location::checked(
            lat,
            lon,
            Location::from_coordinates(lat, lon).name,
        )?));
    }

    let Some(place) = &cli.place else {
        return Ok(None);
    };
    let input: LocationInput = place.parse()?;
    let client = build_client(&config.providers)?;
    let geocoder = Geocoder::new(client, config.providers.geocoding_url.clone());
    let location = geocoder
        .resolve(&input)
        .await
        .with_context(|| format!("Could not resolve '{place}'"))?;
    Ok(Some(location))
}

async fn refresh(app: &AppContext) -> Result<std::sync::Arc<ForecastSnapshot>> {
    let report = app.refresh().await?;
    info!("{}", report);
    for failure in &report.failures {
        warn!("{}: {}", failure.provider, failure.reason);
    }
    app.snapshot()
        .ok_or_else(|| UavcastError::all_providers_failed(ProviderId::ALL.len()).into())
}

fn heading<'a>(
    title: &'a str,
    location: &'a Location,
    provider: Option<ProviderId>,
) -> Heading<'a> {
    Heading {
        title,
        location,
        provider,
    }
}

fn print_conditions(app: &AppContext, snapshot: &ForecastSnapshot, provider: ProviderId) {
    print!("{}", heading("Current conditions", &snapshot.location, Some(provider)));
    match project_summary(&snapshot.store, provider, app.settings(), app.clock()) {
        Some(summary) => print!("{summary}"),
        None => println!("  No data from {provider} this cycle."),
    }
    println!(
        "  Updated {}",
        snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
}

async fn watch(app: &AppContext, provider: ProviderId, config: &UavcastConfig) -> Result<()> {
    let mut updates = app.subscribe();
    let Some(_task) = app.start_auto_refresh(config.refresh.interval()) else {
        warn!("Auto-refresh is disabled, showing a single refresh");
        let snapshot = refresh(app).await?;
        print_conditions(app, &snapshot, provider);
        return Ok(());
    };

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = updates.borrow_and_update().clone();
                if let Some(snapshot) = latest {
                    println!();
                    print_conditions(app, &snapshot, provider);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping");
                break;
            }
        }
    }

    Ok(())
}
