//! Strictly Tombola - Unified CLI
//!
//! Tombola game server and ticket tools.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use axum::body::Body;
use axum::http::Request;
use clap::Parser;
use cli::{Cli, Command};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use std::path::PathBuf;
use strictly_tombola::{
    GameServer, LayoutKind, SequenceKind, ServerConfig, SessionManager, generate_call_sequence,
    generate_ticket,
};
use tower::ServiceBuilder;
use tracing::{debug, info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Http {
            config,
            port,
            host,
            layout,
            sequence,
            seed,
        } => {
            let config = load_server_config(config, host, port, layout, sequence, seed)?;
            run_http_server(config).await
        }
        Command::Ticket { layout, seed, json } => print_ticket(layout, seed, json),
        Command::Sequence { kind, seed } => print_sequence(kind, seed),
    }
}

/// Merge the config file (if any) with command-line overrides
fn load_server_config(
    path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    layout: Option<LayoutKind>,
    sequence: Option<SequenceKind>,
    seed: Option<u64>,
) -> Result<ServerConfig> {
    let mut config = match path {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }
    if let Some(layout) = layout {
        config = config.with_ticket_layout(layout);
    }
    if let Some(sequence) = sequence {
        config = config.with_call_sequence(sequence);
    }
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    Ok(config)
}

/// Run the HTTP game server
#[instrument(skip_all, fields(addr = %config.bind_addr()))]
async fn run_http_server(config: ServerConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Strictly Tombola server on HTTP");
    debug!(?config, "Server configuration");

    let server = GameServer::with_sessions(SessionManager::from_config(&config));

    // Wrap router with request logging
    let app = server.router().layer(ServiceBuilder::new().map_request(
        |req: Request<Body>| {
            info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            debug!(headers = ?req.headers(), "Request headers");
            req
        },
    ));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("Server ready at http://{}/", config.bind_addr());

    axum::serve(listener, app).await?;

    Ok(())
}

fn seeded_rng(seed: Option<u64>) -> Pcg64 {
    match seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::from_rng(&mut rand::rng()),
    }
}

/// Print one ticket
fn print_ticket(layout: LayoutKind, seed: Option<u64>, json: bool) -> Result<()> {
    let mut rng = seeded_rng(seed);
    let ticket = generate_ticket(&*layout.layout(), &mut rng);
    if json {
        println!("{}", serde_json::to_string_pretty(&ticket)?);
    } else {
        println!("{}", ticket.display());
    }
    Ok(())
}

/// Print one call sequence
fn print_sequence(kind: SequenceKind, seed: Option<u64>) -> Result<()> {
    let mut rng = seeded_rng(seed);
    let sequence = generate_call_sequence(kind, &mut rng);
    println!("{}", serde_json::to_string(&sequence)?);
    Ok(())
}
