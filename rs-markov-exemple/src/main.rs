use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use rs_markov_core::{FileCorpus, GenerateRequest, Generator, GeneratorConfig, ReloadOutcome, ReloadScheduler};

/// Learns from a text file and prints generated sentences.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Corpus file (one message per line, or plain prose)
    #[arg(default_value = "./data/message_log.txt")]
    corpus: PathBuf,

    /// Number of trailing tokens used as chain state
    #[arg(short, long, default_value_t = 2)]
    order: usize,

    /// Word or phrase used to bias the first words
    #[arg(short, long)]
    prompt: Option<String>,

    /// Sampling sharpness: low favours frequent words, high flattens
    #[arg(short, long, default_value_t = 1.0)]
    temperature: f32,

    /// How many sentences to print
    #[arg(short, long, default_value_t = 10)]
    count: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    // Every field not set here keeps its default (retries = 12, length 10..=16, ...)
    let config = GeneratorConfig {
        order: cli.order,
        temperature: cli.temperature,
        ..Default::default()
    };
    let generator = Generator::new(config)?;

    // The scheduler owns the model; a forced reload ignores the rate limit
    let scheduler = ReloadScheduler::new(cli.order, Duration::from_secs(60))?;
    match scheduler.reload(&FileCorpus::new(&cli.corpus), true)? {
        ReloadOutcome::Reloaded { keys, start_keys, sentences } => {
            println!("Learned {} keys from {} sentences ({} usable openings)", keys, sentences, start_keys);
        }
        ReloadOutcome::Skipped => println!("Should not happen"),
    }

    // Generation never fails: with nothing learned the sentinel is printed
    let mut request = GenerateRequest::new();
    if let Some(prompt) = cli.prompt {
        request = request.with_prompt(prompt);
    }

    let snapshot = scheduler.current();
    for i in 0..cli.count {
        println!("Generated sentence {}: {}", i + 1, generator.generate(&snapshot, &request));
    }

    Ok(())
}
