use std::time::Duration;

use clap::{Parser, Subcommand};
use explorer::app::{Update, run};
use explorer::global_view::derive_global_points;
use explorer::{App, Backend, ExplorerConfig, HttpBackend, InputEvent, Neighborhood};
use runtime::window::ScreenPos;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless driver for the CLIP embedding explorer")]
struct Args {
    /// Backend API base URL (default: $EXPLORER_API_BASE or http://localhost:5000/api)
    #[arg(long)]
    api_base: Option<String>,

    /// Neighbors requested per selection (default: $EXPLORER_K or 50)
    #[arg(short, long)]
    k: Option<usize>,

    /// Request timeout in seconds (default: $EXPLORER_TIMEOUT_SECS or 30)
    #[arg(long)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the corpus and print record and point counts
    Summary,

    /// Select one record and print its neighborhood
    Neighbors {
        /// Record index into the corpus
        #[arg(long)]
        index: usize,
    },

    /// Drive the explorer with UI events read from stdin, one per line
    Explore,
}

impl Args {
    fn config(&self) -> ExplorerConfig {
        let mut config = ExplorerConfig::from_env();
        if let Some(base) = &self.api_base {
            config.api_base = base.clone();
        }
        if let Some(k) = self.k {
            config.k = k;
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        config
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = args.config();
    info!(api_base = %config.api_base, k = config.k, "starting");
    let backend = HttpBackend::new(&config)?;

    match args.command {
        Command::Summary => summary(&backend).await?,
        Command::Neighbors { index } => neighbors(&config, &backend, index).await?,
        Command::Explore => explore(&config, &backend).await,
    }
    Ok(())
}

async fn summary(backend: &HttpBackend) -> Result<(), Box<dyn std::error::Error>> {
    let records = backend.fetch_records().await?;
    let points = derive_global_points(&records);
    let captions = points
        .kinds
        .iter()
        .filter(|k| **k == explorer::global_view::EmbeddingKind::Caption)
        .count();
    println!("records: {}", records.len());
    println!("points:  {} ({} caption, {} image)", points.len(), captions, points.len() - captions);
    Ok(())
}

async fn neighbors(
    config: &ExplorerConfig,
    backend: &HttpBackend,
    index: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(config);
    app.corpus_loaded(backend.fetch_records().await);

    let Some(fetch) = app.select_record(index) else {
        return Err(format!("record {index} cannot be selected").into());
    };
    let result = backend.fetch_neighborhood(fetch.selected_idx, fetch.k).await;
    if let Err(err) = &result {
        eprintln!("{err}");
    }
    app.neighborhood_resolved(fetch.ticket, result);

    match app.session().neighborhood() {
        Some(neighborhood) => print_neighborhood(neighborhood),
        None => println!("{}", app.panel()),
    }
    Ok(())
}

fn print_neighborhood(n: &Neighborhood) {
    let selected = n.selected();
    println!("selected #{}: {} (score {:.3})", selected.index, selected.caption, selected.similarity_score);
    for (rank, info) in n.neighbors().iter().enumerate() {
        let [x, y] = n.projected_points()[rank + 1];
        println!(
            "  {:>3}. #{:<6} ({:+.3}, {:+.3}) {}",
            rank + 1,
            info.index,
            x,
            y,
            info.caption
        );
    }
    if !n.explained_variance().is_empty() {
        let parts: Vec<String> = n.explained_variance().iter().map(|v| format!("{v:.3}")).collect();
        println!("explained variance: {}", parts.join(", "));
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Line {
    Event(InputEvent),
    Quit,
}

fn parse_line(line: &str) -> Result<Line, String> {
    let mut words = line.split_whitespace();
    let Some(cmd) = words.next() else {
        return Err("empty line".to_string());
    };
    let args: Vec<&str> = words.collect();
    let num = |i: usize| -> Result<f64, String> {
        args.get(i)
            .ok_or_else(|| format!("{cmd}: missing argument {}", i + 1))?
            .parse::<f64>()
            .map_err(|e| format!("{cmd}: {e}"))
    };

    let event = match cmd {
        "move" => InputEvent::PointerMove(ScreenPos::new(num(0)?, num(1)?)),
        "out" => InputEvent::PointerOut,
        "click" => InputEvent::Click(ScreenPos::new(num(0)?, num(1)?)),
        "pick" => {
            let index = args
                .first()
                .ok_or("pick: missing point index")?
                .parse::<usize>()
                .map_err(|e| format!("pick: {e}"))?;
            InputEvent::ClickPoint(index)
        }
        "back" => InputEvent::Back,
        "orbit" => InputEvent::Orbit {
            d_yaw_rad: num(0)?,
            d_pitch_rad: num(1)?,
        },
        "pan" => InputEvent::Pan {
            dx: num(0)?,
            dy: num(1)?,
        },
        "zoom" => InputEvent::Zoom(num(0)?),
        "frame" => InputEvent::Tick,
        "quit" | "exit" => return Ok(Line::Quit),
        other => return Err(format!("unknown command {other:?}")),
    };
    Ok(Line::Event(event))
}

fn report(app: &App, update: &Update) {
    match update {
        Update::CorpusLoaded => println!("{}", app.panel()),
        Update::Input(InputEvent::Tick) => {
            if let Some(frame) = app.render() {
                let [x, y, z] = frame.eye;
                println!(
                    "frame {}: {} points, eye ({x:.3}, {y:.3}, {z:.3})",
                    app.frame().index,
                    frame.point_count()
                );
            }
        }
        Update::Input(InputEvent::PointerMove(_)) => match app.preview() {
            Some(preview) => println!("preview: {} (score {:.3})", preview.caption, preview.similarity_score),
            None => println!("preview: none"),
        },
        Update::Input(InputEvent::Click(_) | InputEvent::ClickPoint(_) | InputEvent::Back) => {
            println!("{}", app.panel())
        }
        Update::Input(_) => {}
        Update::Resolved { ticket, resolution } => {
            println!("request {} {:?}", ticket.get(), resolution);
            println!("{}", app.panel());
        }
    }
}

async fn explore(config: &ExplorerConfig, backend: &HttpBackend) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut app = App::new(config);

    let reader = async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    warn!(%err, "stdin read failed");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(&line) {
                Ok(Line::Event(event)) => {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
                Ok(Line::Quit) => break,
                Err(msg) => eprintln!("{msg}"),
            }
        }
    };

    tokio::join!(run(&mut app, backend, rx, report), reader);
}
