//! Processing stages around the model forward pass.
//!
//! # Modules
//!
//! * `encoder` - Image decoding, resizing and planar tensor encoding
//! * `softmax` - Numerically stable softmax
//! * `topk` - Top-k selection with stable tie-breaking
//! * `classifier` - Ranking raw outputs against a class table
//! * `aggregator` - Merging per-backend results into a report

pub mod aggregator;
pub mod classifier;
pub mod encoder;
mod softmax;
mod topk;

pub use aggregator::aggregate;
pub use classifier::{Classifier, classify};
pub use encoder::{ResizeFilter, TensorEncoder, encode};
pub use softmax::softmax;
pub use topk::{ScoredIndex, top_k};
