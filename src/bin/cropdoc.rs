//! CROPDOC CLI
//!
//! Seeds the knowledge base and runs text, image-label and transcript
//! queries against it. Model inference happens elsewhere; image labels and
//! transcripts are passed in as precomputed results.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use cropdoc::providers::{PrecomputedClassifier, PrecomputedTranscript};
use cropdoc::{
    bootstrap, BootstrapOutcome, Config, HashingEmbedder, MediaInput, Orchestrator, QueryResponse,
    VectorStore, CATALOG,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// CROPDOC - Crop-Health Knowledge Retrieval
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Knowledge base snapshot file
    #[arg(short, long, default_value = "./data/knowledge_base.snap")]
    snapshot: PathBuf,

    /// Keep the knowledge base in memory only
    #[arg(long, default_value_t = false)]
    no_persist: bool,

    /// Embedding dimension
    #[arg(long, default_value_t = 384, value_parser = clap::value_parser!(u32).range(1..))]
    dimension: u32,

    /// Per-call model timeout in seconds (0 = no timeout)
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Print results as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Populate the knowledge base if it is empty
    Seed,

    /// Ask a free-text question
    Query {
        #[arg(required = true)]
        text: Vec<String>,

        /// Number of results
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Act on an image classification
    Analyze {
        /// Label reported by the classifier
        #[arg(long)]
        label: String,

        /// Classifier confidence in [0, 1]
        #[arg(long, value_parser = parse_confidence)]
        confidence: f32,

        /// Image the label was produced from
        #[arg(long, default_value = "image")]
        image: PathBuf,
    },

    /// Answer a transcribed voice question
    Listen {
        /// Text produced by the speech model
        #[arg(long)]
        transcript: String,

        /// Audio clip the transcript was produced from
        #[arg(long, default_value = "audio")]
        audio: PathBuf,
    },

    /// Show knowledge base status
    Stats,
}

#[derive(Serialize)]
struct Stats {
    entries: usize,
    dimension: Option<usize>,
    snapshot: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so JSON output stays clean
    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("cropdoc=info".parse()?))
        .init();

    let args = Args::parse();

    let mut config = Config::default()
        .with_dimension(args.dimension as usize)
        .with_call_timeout((args.timeout_secs > 0).then(|| Duration::from_secs(args.timeout_secs)));
    config = if args.no_persist {
        config.without_persistence()
    } else {
        config.with_snapshot_path(&args.snapshot)
    };

    let store = match &config.snapshot_path {
        Some(path) => VectorStore::open(path)?,
        None => VectorStore::new(),
    };
    if let Some(dim) = store.dimension() {
        if dim != config.embedding_dimension {
            anyhow::bail!(
                "snapshot {} holds {}-dimensional vectors but --dimension is {}",
                args.snapshot.display(),
                dim,
                config.embedding_dimension
            );
        }
    }

    let embedder = Arc::new(HashingEmbedder::new(config.embedding_dimension)?);
    let outcome = bootstrap(&store, embedder.as_ref(), CATALOG, &config).await?;

    match args.command {
        Command::Seed => {
            if args.json {
                print_json(&outcome)?;
            } else {
                match outcome {
                    BootstrapOutcome::Skipped { existing } => {
                        println!("Knowledge base already has {} entries", existing)
                    }
                    BootstrapOutcome::Seeded { inserted, persisted } => println!(
                        "Seeded {} entries{}",
                        inserted,
                        if persisted { " and saved snapshot" } else { "" }
                    ),
                }
            }
        }

        Command::Stats => {
            let stats = Stats {
                entries: store.count(),
                dimension: store.dimension(),
                snapshot: store.snapshot_path().map(|p| p.to_path_buf()),
            };
            if args.json {
                print_json(&stats)?;
            } else {
                println!("Entries:   {}", stats.entries);
                println!(
                    "Dimension: {}",
                    stats.dimension.map_or("-".to_string(), |d| d.to_string())
                );
                println!(
                    "Snapshot:  {}",
                    stats
                        .snapshot
                        .as_ref()
                        .map_or("(in memory)".to_string(), |p| p.display().to_string())
                );
            }
        }

        Command::Query { text, top_k } => {
            let orchestrator = Orchestrator::new(store, embedder, config)?;
            let text = text.join(" ");
            let top_k = top_k.unwrap_or(orchestrator.config().text_top_k);
            let response = orchestrator.query_text(&text, top_k).await?;
            if args.json {
                print_json(&response)?;
            } else {
                print_answers(&response);
            }
            info!(metrics = %orchestrator.metrics().summary(), "query finished");
        }

        Command::Analyze {
            label,
            confidence,
            image,
        } => {
            let orchestrator = Orchestrator::new(store, embedder, config)?
                .with_vision(Arc::new(PrecomputedClassifier::new(label, confidence)));
            let analysis = orchestrator
                .analyze_and_query(&MediaInput::from_path(image))
                .await?;
            if args.json {
                print_json(&analysis)?;
            } else {
                println!(
                    "Label: {} (confidence {:.2}) -> {:?}",
                    analysis.label, analysis.confidence, analysis.action
                );
                match &analysis.advice {
                    Some(advice) => print_answers(advice),
                    None => println!("Confidence too low, please provide a clearer image."),
                }
            }
            info!(metrics = %orchestrator.metrics().summary(), "analysis finished");
        }

        Command::Listen { transcript, audio } => {
            let orchestrator = Orchestrator::new(store, embedder, config)?
                .with_speech(Arc::new(PrecomputedTranscript::new(transcript)));
            let response = orchestrator
                .query_from_audio(&MediaInput::from_path(audio))
                .await?;
            if args.json {
                print_json(&response)?;
            } else {
                println!("Transcription: {}", response.transcription);
                print_answers(&response.response);
            }
            info!(metrics = %orchestrator.metrics().summary(), "audio query finished");
        }
    }

    info!("done");
    Ok(())
}

fn parse_confidence(raw: &str) -> Result<f32, String> {
    let value: f32 = raw.parse().map_err(|e| format!("{}", e))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{} is not in [0, 1]", value))
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_answers(response: &QueryResponse) {
    println!("Query: {}", response.query);
    if response.is_empty() {
        println!("  (no results)");
    }
    for (i, (score, text)) in response.answers().enumerate() {
        println!("\n  [{}] score {:.4}\n      {}", i + 1, score, text);
    }
}
