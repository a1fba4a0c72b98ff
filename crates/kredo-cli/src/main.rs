//! Kredo command line interface.
//!
//! Thin front-end over `kredo-core` and `kredo-runtime`: score a credit
//! profile, run the full recommendation ensemble, or inspect the seeded
//! profile for a user id. All output is JSON on stdout, diagnostics go
//! to stderr via tracing.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kredo_core::{
    dummy_profile, CreditProfile, MemoryProfileStore, PolicyLimits, RecommendationRequest,
    ScoringEngine,
};
use kredo_runtime::{EnsembleDecider, GeminiJudge, JudgeConfig, JudgeProvider, StaticJudge};

#[derive(Parser)]
#[command(name = "kredo", version, about = "Educational credit scoring and underwriting ensemble")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute a credit score from a profile JSON
    Score {
        /// Path to a profile JSON file; reads stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Run the three-voter recommendation ensemble on an application
    Recommend {
        /// Path to a recommendation request JSON file; reads stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Optional policy limits YAML; defaults plus env overrides otherwise
        #[arg(long)]
        policy: Option<PathBuf>,

        /// Use a deterministic stub judge instead of calling the API
        #[arg(long)]
        offline: bool,
    },

    /// Print the deterministic seeded profile for a user id
    Profile {
        /// User identifier to seed from
        user_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Score { input } => score(input),
        Command::Recommend {
            input,
            policy,
            offline,
        } => recommend(input, policy, offline).await,
        Command::Profile { user_id } => profile(&user_id),
    }
}

fn score(input: Option<PathBuf>) -> Result<()> {
    let profile: CreditProfile =
        serde_json::from_str(&read_input(input)?).context("failed to parse profile JSON")?;
    let score = ScoringEngine::new().compute(&profile);
    println!("{}", serde_json::to_string_pretty(&score)?);
    Ok(())
}

async fn recommend(input: Option<PathBuf>, policy: Option<PathBuf>, offline: bool) -> Result<()> {
    let request: RecommendationRequest =
        serde_json::from_str(&read_input(input)?).context("failed to parse request JSON")?;

    let limits = match policy {
        Some(path) => PolicyLimits::from_yaml_file(&path)
            .with_context(|| format!("failed to load policy from {}", path.display()))?,
        None => PolicyLimits::default(),
    }
    .with_env_overrides();

    let provider: Arc<dyn JudgeProvider> = if offline {
        // The stub dissents on nothing; the deterministic voters carry
        // the decision.
        Arc::new(StaticJudge::canned(
            r#"{"recommendation": "APPROVE", "confidence": 0.5,
                "reasons": ["offline mode: no model judgment available"]}"#,
        ))
    } else {
        Arc::new(GeminiJudge::from_env().context("judge provider not configured")?)
    };

    let decider = EnsembleDecider::new(
        provider,
        JudgeConfig::default().with_env_overrides(),
        limits,
        Arc::new(MemoryProfileStore::new()),
    );

    let outcome = decider.decide(&request).await?;

    let output = serde_json::json!({
        "success": true,
        "recommendation": outcome.recommendation,
        "credit_score_used": outcome.credit_score,
        "model_used": outcome.model,
        "judgment_degraded": outcome.judgment_degraded,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn profile(user_id: &str) -> Result<()> {
    let profile = dummy_profile(user_id);
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

fn read_input(input: Option<PathBuf>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            use std::io::Read;
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}
