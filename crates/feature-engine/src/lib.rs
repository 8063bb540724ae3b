//! Feature Engine
//!
//! Converts a closed candidate corpus into a fixed-width feature matrix:
//! min-max scaled numeric attributes, one-hot sector columns and averaged
//! word embeddings of the company summary, each block scaled by a weight.

pub mod builder;
pub mod embedding;
pub mod encoding;
pub mod normalize;

pub use builder::{FeatureBuilder, FeatureLayout, FeatureMatrix, FeatureWeights, NUMERIC_FEATURES};
pub use embedding::{embed_text, tokenize, WordVectors};
pub use encoding::{one_hot_encode, OneHotEncoding};
pub use normalize::normalize;
