use serde::{Deserialize, Serialize};

use crate::SwipeError;

/// A single rankable stock.
///
/// Construction goes through [`Candidate::new`], which rejects empty tickers
/// and sectors and negative prices or market caps. Once built, a candidate
/// is immutable for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CandidateRecord", into = "CandidateRecord")]
pub struct Candidate {
    ticker: String,
    price: f64,
    market_cap: f64,
    pe_ratio: f64,
    sector: String,
    volatility: f64,
    volatility_category: String,
    summary: String,
}

/// Raw, unvalidated form of a [`Candidate`] used on the serde boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub ticker: String,
    pub price: f64,
    pub market_cap: f64,
    pub pe_ratio: f64,
    pub sector: String,
    pub volatility: f64,
    #[serde(default)]
    pub volatility_category: String,
    #[serde(default, alias = "Summary")]
    pub summary: String,
}

impl Candidate {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ticker: impl Into<String>,
        price: f64,
        market_cap: f64,
        pe_ratio: f64,
        sector: impl Into<String>,
        volatility: f64,
        volatility_category: impl Into<String>,
        summary: impl Into<String>,
    ) -> Result<Self, SwipeError> {
        let ticker = ticker.into().trim().to_string();
        let sector = sector.into().trim().to_string();

        if ticker.is_empty() {
            return Err(SwipeError::Validation("ticker must not be empty".to_string()));
        }
        if sector.is_empty() {
            return Err(SwipeError::Validation(format!(
                "{}: sector must not be empty",
                ticker
            )));
        }
        if !price.is_finite() || price < 0.0 {
            return Err(SwipeError::Validation(format!(
                "{}: price must be >= 0, got {}",
                ticker, price
            )));
        }
        if !market_cap.is_finite() || market_cap < 0.0 {
            return Err(SwipeError::Validation(format!(
                "{}: market cap must be >= 0, got {}",
                ticker, market_cap
            )));
        }
        for (name, value) in [("pe ratio", pe_ratio), ("volatility", volatility)] {
            if !value.is_finite() {
                return Err(SwipeError::Validation(format!(
                    "{}: {} must be finite, got {}",
                    ticker, name, value
                )));
            }
        }

        Ok(Self {
            ticker,
            price,
            market_cap,
            pe_ratio,
            sector,
            volatility,
            volatility_category: volatility_category.into(),
            summary: summary.into(),
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn market_cap(&self) -> f64 {
        self.market_cap
    }

    pub fn pe_ratio(&self) -> f64 {
        self.pe_ratio
    }

    pub fn sector(&self) -> &str {
        &self.sector
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn volatility_category(&self) -> &str {
        &self.volatility_category
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Numeric attributes in feature order: price, market cap, P/E, volatility.
    pub fn numeric_attributes(&self) -> [f64; 4] {
        [self.price, self.market_cap, self.pe_ratio, self.volatility]
    }
}

impl TryFrom<CandidateRecord> for Candidate {
    type Error = SwipeError;

    fn try_from(record: CandidateRecord) -> Result<Self, Self::Error> {
        Candidate::new(
            record.ticker,
            record.price,
            record.market_cap,
            record.pe_ratio,
            record.sector,
            record.volatility,
            record.volatility_category,
            record.summary,
        )
    }
}

impl From<Candidate> for CandidateRecord {
    fn from(candidate: Candidate) -> Self {
        Self {
            ticker: candidate.ticker,
            price: candidate.price,
            market_cap: candidate.market_cap,
            pe_ratio: candidate.pe_ratio,
            sector: candidate.sector,
            volatility: candidate.volatility,
            volatility_category: candidate.volatility_category,
            summary: candidate.summary,
        }
    }
}

/// Binary swipe feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feedback {
    Like,
    Dislike,
}

impl Feedback {
    /// Direction of the weight update (+1 for like, -1 for dislike)
    pub fn sign(&self) -> f64 {
        match self {
            Feedback::Like => 1.0,
            Feedback::Dislike => -1.0,
        }
    }

    pub fn is_like(&self) -> bool {
        matches!(self, Feedback::Like)
    }
}

impl From<bool> for Feedback {
    fn from(liked: bool) -> Self {
        if liked {
            Feedback::Like
        } else {
            Feedback::Dislike
        }
    }
}

impl std::fmt::Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Feedback::Like => write!(f, "like"),
            Feedback::Dislike => write!(f, "dislike"),
        }
    }
}

impl std::str::FromStr for Feedback {
    type Err = SwipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "like" | "l" | "y" | "yes" | "right" => Ok(Feedback::Like),
            "dislike" | "d" | "n" | "no" | "left" => Ok(Feedback::Dislike),
            _ => Err(SwipeError::Validation(format!("Invalid feedback: {}", s))),
        }
    }
}
