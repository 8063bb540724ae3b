mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use candidate_loader::CsvCandidateLoader;
use feature_engine::{FeatureBuilder, WordVectors};
use preference_ranker::{FeedbackEvent, SessionController, SessionState};
use serde::Serialize;
use swipe_core::{Candidate, Embedder, Feedback};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::SwipeConfig;

const USAGE: &str = "\
Usage: stock-swipe [OPTIONS]

Options:
  --csv <PATH>          Candidate CSV (env: CANDIDATES_PATH, default stocks.csv)
  --embeddings <PATH>   Word vectors in GloVe/word2vec text format (env: EMBEDDINGS_PATH)
  --budget <N>          Number of swipes before recommending (env: SWIPE_BUDGET)
  --top <N>             Number of recommendations (env: RECOMMENDATION_COUNT)
  --greedy              Always present the best-scoring unseen candidate
  --sequential          Present candidates in file order (default)
  --scope <full|unseen> Pool the final recommendations are drawn from
  --json                Print the shortlist as JSON
  -h, --help            Print this help

Answer each card with y (like), n (dislike) or q (quit).";

#[derive(Serialize)]
struct Shortlist<'a> {
    traversal: String,
    scope: String,
    swipes: usize,
    history: &'a [FeedbackEvent],
    recommendations: &'a [Candidate],
}

enum Answer {
    Swipe(Feedback),
    Quit,
}

fn parse_answer(line: &str) -> Option<Answer> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
        return Some(Answer::Quit);
    }
    line.parse().ok().map(Answer::Swipe)
}

fn print_card(session: &SessionController, candidate: &Candidate) {
    println!();
    println!(
        "[{}/{}] {} ({})",
        session.swipes() + 1,
        session.config().swipe_budget,
        candidate.ticker(),
        candidate.sector()
    );
    println!(
        "  price ${:.2} | market cap ${:.2}B | P/E {:.1} | volatility {:.2} ({})",
        candidate.price(),
        candidate.market_cap() / 1e9,
        candidate.pe_ratio(),
        candidate.volatility(),
        candidate.volatility_category()
    );
    if !candidate.summary().is_empty() {
        println!("  {}", candidate.summary());
    }
    if let Some(score) = session.current_score() {
        println!(
            "  model score {:.3}, {} swipes left",
            score,
            session.remaining_swipes()
        );
    }
}

fn print_shortlist(session: &SessionController) {
    println!();
    println!(
        "Top {} picks after {} swipes:",
        session.recommendations().len(),
        session.swipes()
    );
    for (rank, candidate) in session.recommendations().iter().enumerate() {
        println!(
            "  {:>2}. {:<6} {:<24} ${:.2}",
            rank + 1,
            candidate.ticker(),
            candidate.sector(),
            candidate.price()
        );
    }
}

async fn load_embedder(config: &SwipeConfig) -> Result<Arc<dyn Embedder>> {
    let vectors = match &config.embeddings_path {
        Some(path) => {
            let path = path.clone();
            tokio::task::spawn_blocking(move || WordVectors::open(&path))
                .await
                .context("embedding loader task failed")?
                .context("Failed to load word vectors")?
        }
        None => {
            tracing::warn!(
                "EMBEDDINGS_PATH not set, summaries contribute a zero {}-d embedding",
                config.embedding_dim
            );
            WordVectors::empty(config.embedding_dim)
        }
    };
    Ok(Arc::new(vectors))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays clean for cards and --json output
    let json_logs = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);
    if json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("{}", USAGE);
        return Ok(());
    }

    let mut config = SwipeConfig::from_env().context("Invalid configuration")?;
    config.apply_args(&args)?;

    tracing::info!(
        "Starting stock-swipe: {} traversal, budget {}, top {}",
        config.session.traversal,
        config.session.swipe_budget,
        config.session.recommendation_count
    );

    let embedder = load_embedder(&config).await?;
    let builder = FeatureBuilder::new(embedder).with_weights(config.feature_weights);
    tracing::debug!(
        "Feature weights {:?}, embedding dimension {}",
        config.feature_weights,
        builder.embedding_dimension()
    );
    let loader = CsvCandidateLoader::new(&config.candidates_path);

    let mut session = SessionController::new(config.session.clone());
    session.load(&loader, &builder).await;

    if session.candidates().is_empty() {
        println!("No candidates available");
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while session.state() == SessionState::AwaitingFeedback {
        let Some(candidate) = session.current() else {
            break;
        };
        print_card(&session, candidate);

        let answer = loop {
            println!("  like? [y/n/q]");
            let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
                break Answer::Quit;
            };
            match parse_answer(&line) {
                Some(answer) => break answer,
                None => println!("  please answer y, n or q"),
            }
        };

        match answer {
            Answer::Swipe(feedback) => {
                session.submit(feedback)?;
            }
            Answer::Quit => {
                tracing::info!("Session abandoned after {} swipes", session.swipes());
                println!("Session abandoned, nothing recommended");
                return Ok(());
            }
        }
    }

    if config.json_output {
        let shortlist = Shortlist {
            traversal: session.config().traversal.to_string(),
            scope: session.config().effective_scope().to_string(),
            swipes: session.swipes(),
            history: session.history(),
            recommendations: session.recommendations(),
        };
        println!("{}", serde_json::to_string_pretty(&shortlist)?);
    } else {
        print_shortlist(&session);
    }

    Ok(())
}
