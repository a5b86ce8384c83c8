use std::path::PathBuf;

use actix_web::{App, HttpServer, web};
use clap::Parser;
use log::info;

mod app;
mod config;

use app::{AppState, routes};
use config::ServerConfig;

/// HTTP front end for the Markov text generator.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
	/// TOML configuration file
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Corpus file, one message per line (overrides the config file)
	#[arg(long)]
	corpus: Option<PathBuf>,

	#[arg(long)]
	host: Option<String>,

	#[arg(short, long)]
	port: Option<u16>,
}

/// Main entry point for the server.
///
/// Builds the model once at startup (falling back to the snapshot cache),
/// then serves it through an Actix-web HTTP server. Later reloads happen
/// on demand, rate-limited by the configured interval.
#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let cli = Cli::parse();
	let mut config = match &cli.config {
		Some(path) => ServerConfig::load(path)?,
		None => ServerConfig::default(),
	};
	if let Some(corpus) = cli.corpus {
		config.corpus_path = corpus;
	}
	if let Some(host) = cli.host {
		config.host = host;
	}
	if let Some(port) = cli.port {
		config.port = port;
	}

	let state = AppState::new(&config)?;
	state.warm_up();
	let shared_state = web::Data::new(state);

	info!("Listening on {}:{}", config.host, config.port);
	HttpServer::new(move || App::new().app_data(shared_state.clone()).configure(routes))
		.bind((config.host.as_str(), config.port))?
		.run()
		.await?;

	Ok(())
}
