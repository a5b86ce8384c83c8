use std::path::PathBuf;

use actix_web::{HttpResponse, Responder, get, post, put, web};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use rs_markov_core::io::{append_line, load_snapshot, save_snapshot};
use rs_markov_core::sanitize::{Replacements, sanitize_message};
use rs_markov_core::{FileCorpus, GenerateRequest, Generator, MarkovError, ReloadOutcome, ReloadScheduler};

use crate::config::ServerConfig;

/// State shared by every worker.
///
/// Nothing here needs a lock: the scheduler swaps snapshots atomically and
/// everything else is read-only.
pub struct AppState {
	scheduler: ReloadScheduler,
	generator: Generator,
	corpus: FileCorpus,
	replacements: Replacements,
	snapshot_cache: Option<PathBuf>,
}

impl AppState {
	pub fn new(config: &ServerConfig) -> Result<Self, MarkovError> {
		let replacements = match &config.replacements_path {
			Some(path) => Replacements::from_file(path)?,
			None => Replacements::default(),
		};
		Ok(Self {
			scheduler: ReloadScheduler::from_config(&config.generator)?,
			generator: Generator::new(config.generator.clone())?,
			corpus: FileCorpus::new(&config.corpus_path),
			replacements,
			snapshot_cache: config.snapshot_cache_path(),
		})
	}

	/// Initial forced build. Falls back to the cached snapshot if the corpus
	/// cannot be read; with neither, the server starts with an empty model.
	pub fn warm_up(&self) {
		if self.reload(true).is_ok() {
			return;
		}
		let Some(cache) = &self.snapshot_cache else {
			return;
		};
		match load_snapshot(cache).and_then(|snapshot| self.scheduler.install(snapshot)) {
			Ok(()) => info!("Serving cached snapshot from {}", cache.display()),
			Err(e) => warn!("No usable snapshot cache at {}: {}", cache.display(), e),
		}
	}

	/// Rate-limited reload (unless forced); refreshes the cache on success.
	pub fn reload(&self, force: bool) -> Result<ReloadOutcome, MarkovError> {
		let outcome = self.scheduler.reload(&self.corpus, force)?;
		if let (ReloadOutcome::Reloaded { .. }, Some(cache)) = (outcome, &self.snapshot_cache) {
			if let Err(e) = save_snapshot(cache, &self.scheduler.current()) {
				warn!("Failed to write snapshot cache {}: {}", cache.display(), e);
			}
		}
		Ok(outcome)
	}
}

/// Query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	prompt: Option<String>,
	length: Option<usize>,
	temperature: Option<f32>,
}

impl GenerateParams {
	fn to_request(&self) -> Result<GenerateRequest, String> {
		let mut request = GenerateRequest::new();
		if let Some(prompt) = &self.prompt {
			request = request.with_prompt(prompt.as_str());
		}
		if let Some(length) = self.length {
			request = request.with_length(length);
		}
		if let Some(temperature) = self.temperature {
			request.set_temperature(temperature).map_err(|e| e.to_string())?;
		}
		Ok(request)
	}
}

#[derive(Deserialize)]
struct ReloadParams {
	force: Option<bool>,
}

#[derive(Serialize)]
struct Stats {
	order: usize,
	keys: usize,
	start_keys: usize,
	sentences: usize,
	reload_failing: bool,
}

/// HTTP GET endpoint `/v1/generate`
///
/// Tries a rate-limited reload, then returns one generated sentence (or the
/// no-data sentinel) as the response body.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<AppState>, query: web::Query<GenerateParams>) -> impl Responder {
	let request = match query.to_request() {
		Ok(r) => r,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	// Failures are already logged; the current snapshot keeps serving
	let state = data.clone();
	if let Err(e) = web::block(move || state.reload(false)).await {
		warn!("Reload task failed: {}", e);
	}

	let snapshot = data.scheduler.current();
	HttpResponse::Ok().body(data.generator.generate(&snapshot, &request))
}

#[put("/v1/reload")]
async fn put_reload(data: web::Data<AppState>, query: web::Query<ReloadParams>) -> impl Responder {
	let force = query.force.unwrap_or(false);
	let state = data.clone();
	match web::block(move || state.reload(force)).await {
		Ok(Ok(ReloadOutcome::Skipped)) => HttpResponse::Ok().body("Reload skipped"),
		Ok(Ok(ReloadOutcome::Reloaded { keys, .. })) => HttpResponse::Ok().body(format!("Reloaded ({} keys)", keys)),
		Ok(Err(e)) => HttpResponse::InternalServerError().body(format!("Reload failed: {e}")),
		Err(e) => HttpResponse::InternalServerError().body(format!("Reload task failed: {e}")),
	}
}

/// HTTP POST endpoint `/v1/messages`
///
/// Sanitizes the body and appends it to the corpus as one line. Messages
/// that are empty once cleaned are not stored.
#[post("/v1/messages")]
async fn post_message(data: web::Data<AppState>, body: String) -> impl Responder {
	let line = sanitize_message(&body, &data.replacements);
	if line.is_empty() {
		return HttpResponse::BadRequest().body("Empty message");
	}

	let path = data.corpus.path().to_path_buf();
	match web::block(move || append_line(path, &line)).await {
		Ok(Ok(())) => HttpResponse::Ok().body("Message stored"),
		Ok(Err(e)) => HttpResponse::InternalServerError().body(format!("Failed to store message: {e}")),
		Err(e) => HttpResponse::InternalServerError().body(format!("Store task failed: {e}")),
	}
}

#[get("/v1/stats")]
async fn get_stats(data: web::Data<AppState>) -> impl Responder {
	let snapshot = data.scheduler.current();
	HttpResponse::Ok().json(Stats {
		order: snapshot.order(),
		keys: snapshot.table().len(),
		start_keys: snapshot.start_keys().len(),
		sentences: snapshot.sentence_count(),
		reload_failing: data.scheduler.is_failing(),
	})
}

pub fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(get_generated).service(put_reload).service(post_message).service(get_stats);
}
