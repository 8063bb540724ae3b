//! Text embedding by averaging word vectors.

use std::collections::HashMap;
use std::path::Path;

use nalgebra::DVector;
use swipe_core::{Embedder, SwipeError};

/// Lowercase, drop punctuation and symbols (Unicode included), split on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Mean of the embedder vectors of every known token in `text`.
///
/// Unknown tokens are ignored. Text with no known token (including empty
/// text) embeds to the zero vector of the embedder's dimension.
///
/// # Panics
///
/// If the embedder returns a vector whose length differs from its declared
/// dimension.
pub fn embed_text(text: &str, embedder: &dyn Embedder) -> DVector<f64> {
    let dim = embedder.dimension();
    let mut sum = DVector::<f64>::zeros(dim);
    let mut matched = 0usize;

    for token in tokenize(text) {
        if let Some(vector) = embedder.vector(&token) {
            assert_eq!(
                vector.len(),
                dim,
                "embedder returned {} components for '{}', expected {}",
                vector.len(),
                token,
                dim
            );
            for (acc, v) in sum.iter_mut().zip(vector.iter()) {
                *acc += f64::from(*v);
            }
            matched += 1;
        }
    }

    if matched > 0 {
        sum /= matched as f64;
    }
    sum
}

/// In-memory word vectors keyed by lowercase token.
#[derive(Debug, Clone)]
pub struct WordVectors {
    dimension: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl WordVectors {
    /// Vocabulary-free embedder: every text embeds to zeros.
    pub fn empty(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: HashMap::new(),
        }
    }

    /// Build from explicit `(token, vector)` pairs.
    pub fn from_pairs<I, S>(dimension: usize, pairs: I) -> Result<Self, SwipeError>
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: Into<String>,
    {
        let mut vectors = HashMap::new();
        for (token, vector) in pairs {
            let token = token.into();
            if vector.len() != dimension {
                return Err(SwipeError::Embedding(format!(
                    "vector for '{}' has {} components, expected {}",
                    token,
                    vector.len(),
                    dimension
                )));
            }
            vectors.insert(token.to_lowercase(), vector);
        }
        Ok(Self { dimension, vectors })
    }

    /// Parse the plain-text GloVe / word2vec format.
    ///
    /// One `token v1 v2 .. vD` entry per line. A leading `count dim` line
    /// (word2vec) is accepted and its dimension enforced. Otherwise the
    /// dimension is taken from the first entry.
    pub fn parse(text: &str) -> Result<Self, SwipeError> {
        let mut lines = text
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty())
            .peekable();

        let mut dimension: Option<usize> = None;
        if let Some(&(_, first)) = lines.peek() {
            let parts: Vec<&str> = first.split_whitespace().collect();
            if parts.len() == 2 {
                if let (Ok(_), Ok(dim)) = (parts[0].parse::<usize>(), parts[1].parse::<usize>()) {
                    dimension = Some(dim);
                    lines.next();
                }
            }
        }

        let mut vectors = HashMap::new();
        for (idx, line) in lines {
            let mut parts = line.split_whitespace();
            let token = match parts.next() {
                Some(t) => t.to_lowercase(),
                None => continue,
            };
            let values = parts
                .map(|p| p.parse::<f32>())
                .collect::<Result<Vec<f32>, _>>()
                .map_err(|e| {
                    SwipeError::Embedding(format!("line {}: invalid component: {}", idx + 1, e))
                })?;

            let expected = *dimension.get_or_insert(values.len());
            if values.len() != expected || expected == 0 {
                return Err(SwipeError::Embedding(format!(
                    "line {}: '{}' has {} components, expected {}",
                    idx + 1,
                    token,
                    values.len(),
                    expected
                )));
            }
            vectors.insert(token, values);
        }

        let dimension = dimension
            .ok_or_else(|| SwipeError::Embedding("no word vectors found".to_string()))?;

        Ok(Self { dimension, vectors })
    }

    /// Read and parse a word-vector file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SwipeError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let vectors = Self::parse(&text)?;
        tracing::info!(
            "Loaded {} word vectors (dim={}) from {}",
            vectors.len(),
            vectors.dimension,
            path.display()
        );
        Ok(vectors)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl Embedder for WordVectors {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn vector(&self, token: &str) -> Option<Vec<f32>> {
        self.vectors.get(token).cloned()
    }
}
