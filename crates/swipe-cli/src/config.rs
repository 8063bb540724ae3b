use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use feature_engine::FeatureWeights;
use preference_ranker::{RecommendationScope, SessionConfig, TraversalPolicy};

#[derive(Debug, Clone)]
pub struct SwipeConfig {
    // Input data
    pub candidates_path: PathBuf,
    pub embeddings_path: Option<PathBuf>,
    pub embedding_dim: usize, // only used without an embeddings file

    // Session
    pub session: SessionConfig,
    pub feature_weights: FeatureWeights,

    // Output
    pub json_output: bool,
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse()
        .with_context(|| format!("{} has invalid value '{}'", key, raw))
}

impl SwipeConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = SessionConfig::default();
        let weights = FeatureWeights::default();

        let scope = match lookup("RECOMMENDATION_SCOPE") {
            Some(raw) if !raw.trim().is_empty() => Some(
                raw.parse::<RecommendationScope>()
                    .with_context(|| format!("RECOMMENDATION_SCOPE has invalid value '{}'", raw))?,
            ),
            _ => None,
        };

        let config = Self {
            candidates_path: lookup("CANDIDATES_PATH")
                .unwrap_or_else(|| "stocks.csv".to_string())
                .into(),
            embeddings_path: lookup("EMBEDDINGS_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            embedding_dim: parse_var(&lookup, "EMBEDDING_DIM", "300")?,

            session: SessionConfig {
                swipe_budget: parse_var(&lookup, "SWIPE_BUDGET", &defaults.swipe_budget.to_string())?,
                recommendation_count: parse_var(
                    &lookup,
                    "RECOMMENDATION_COUNT",
                    &defaults.recommendation_count.to_string(),
                )?,
                traversal: parse_var(&lookup, "TRAVERSAL", &defaults.traversal.to_string())?,
                scope,
            },
            feature_weights: FeatureWeights {
                numeric: parse_var(&lookup, "FEATURE_WEIGHT_NUMERIC", &weights.numeric.to_string())?,
                categorical: parse_var(
                    &lookup,
                    "FEATURE_WEIGHT_CATEGORICAL",
                    &weights.categorical.to_string(),
                )?,
                text: parse_var(&lookup, "FEATURE_WEIGHT_TEXT", &weights.text.to_string())?,
            },

            json_output: false,
        };

        Ok(config)
    }

    /// Apply command-line overrides on top of the environment
    pub fn apply_args(&mut self, args: &[String]) -> Result<()> {
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--greedy" => self.session.traversal = TraversalPolicy::Greedy,
                "--sequential" => self.session.traversal = TraversalPolicy::Sequential,
                "--json" => self.json_output = true,
                "--budget" => self.session.swipe_budget = next_value(&mut iter, arg)?,
                "--top" => self.session.recommendation_count = next_value(&mut iter, arg)?,
                "--scope" => self.session.scope = Some(next_value(&mut iter, arg)?),
                "--csv" => self.candidates_path = next_value::<String>(&mut iter, arg)?.into(),
                "--embeddings" => {
                    self.embeddings_path = Some(next_value::<String>(&mut iter, arg)?.into())
                }
                other => bail!("Unknown argument: {}", other),
            }
        }
        Ok(())
    }
}

fn next_value<'a, T>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = iter
        .next()
        .with_context(|| format!("{} requires a value", flag))?;
    raw.parse()
        .with_context(|| format!("{} has invalid value '{}'", flag, raw))
}
