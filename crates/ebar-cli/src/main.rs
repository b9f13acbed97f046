//! `ebar`: schedule EBar units from the command line or serve the JSON API.
//!
//! # Usage
//!
//! ```text
//! ebar --config ebar.toml serve
//! ebar suggest --name "Cup Final" --venue LFC --event 2025-07-10 --required 2
//! ebar schedule --name "Cup Final" --venue LFC --event 2025-07-10 --units EBAR004,EBAR009
//! ebar grid --from 2025-07-01 --to 2025-07-14
//! ebar map --output events.geojson
//! ```

mod report;
mod settings;
mod wiring;

use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use axum::Router;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use ebar_core::{event::DateWindow, unit::UnitId};
use ebar_engine::SuggestionRequest;
use settings::Settings;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "ebar", version, about = "EBar fleet availability and assignment")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "ebar.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Serve the JSON API under `/api`.
  Serve,
  /// List every unit with its current location and booked day count.
  Units,
  /// Rank units for a prospective event without committing anything.
  Suggest {
    #[command(flatten)]
    event: EventArgs,
    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,
  },
  /// Rank units for an event and commit the assignment.
  Schedule {
    #[command(flatten)]
    event: EventArgs,
    /// Commit these units instead of the suggested ones.
    #[arg(long, value_delimiter = ',')]
    units: Vec<UnitId>,
  },
  /// Committed events per day.
  Calendar {
    #[arg(long)]
    from: Option<NaiveDate>,
    #[arg(long)]
    to:   Option<NaiveDate>,
  },
  /// Unit × date pivot of committed events.
  Grid {
    #[arg(long)]
    from: NaiveDate,
    #[arg(long)]
    to:   NaiveDate,
  },
  /// Geocoded events as GeoJSON.
  Map {
    /// Write to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
}

#[derive(Args, Debug)]
struct EventArgs {
  #[arg(long)]
  name:       String,
  /// Venue name from the registry.
  #[arg(long)]
  venue:      String,
  /// Delivery date; defaults to the event date.
  #[arg(long)]
  delivery:   Option<NaiveDate>,
  #[arg(long)]
  event:      NaiveDate,
  #[arg(long)]
  collection: Option<NaiveDate>,
  #[arg(long, default_value_t = 1)]
  required:   usize,
}

impl EventArgs {
  fn request(&self) -> SuggestionRequest {
    SuggestionRequest {
      name:            self.name.clone(),
      venue:           self.venue.clone(),
      delivery_date:   self.delivery.unwrap_or(self.event),
      event_date:      self.event,
      collection_date: self.collection,
      required:        self.required,
    }
  }
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;
  let mut engine = wiring::build_engine(&settings).await?;

  match cli.command {
    Command::Serve => {
      let app = Router::new()
        .nest("/api", ebar_api::api_router(ebar_api::share(engine)))
        .layer(TraceLayer::new_for_http());
      let address = format!("{}:{}", settings.server.host, settings.server.port);

      info!("Listening on http://{address}/api");
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
      axum::serve(listener, app).await.context("server error")?;
    }

    Command::Units => print!("{}", report::units(&engine.unit_overview())),

    Command::Suggest { event, json } => {
      let suggestion = engine.suggest(&event.request()).await?;
      if json {
        println!("{}", serde_json::to_string_pretty(&suggestion)?);
      } else {
        print!("{}", report::suggestion(&suggestion));
      }
    }

    Command::Schedule { event, units } => {
      let suggestion = engine.suggest(&event.request()).await?;
      print!("{}", report::suggestion(&suggestion));

      let chosen = if units.is_empty() { suggestion.ranking.units() } else { units };
      if chosen.is_empty() {
        bail!("no units available to commit; pass --units to override");
      }
      let rows = engine
        .commit(suggestion.meta, &chosen)
        .await
        .context("commit failed; nothing was saved")?;
      print!("{}", report::committed(&rows));
    }

    Command::Calendar { from, to } => {
      let window = match (from, to) {
        (None, None) => None,
        (from, to) => Some(DateWindow::new(
          from.unwrap_or(NaiveDate::MIN),
          to.unwrap_or(NaiveDate::MAX),
        )?),
      };
      print!("{}", report::calendar(&engine.calendar(window.as_ref())));
    }

    Command::Grid { from, to } => {
      let window = DateWindow::new(from, to)?;
      print!("{}", report::grid(&engine.schedule_grid(&window)));
    }

    Command::Map { output } => {
      let geojson = serde_json::to_string_pretty(&engine.map_geojson().await)?;
      match output {
        Some(path) => {
          std::fs::write(&path, geojson).with_context(|| format!("failed to write {path:?}"))?;
          info!(path = %path.display(), "map written");
        }
        None => println!("{geojson}"),
      }
    }
  }

  Ok(())
}
