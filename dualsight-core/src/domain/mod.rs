//! Domain types shared across the pipeline.

pub mod backend;
pub mod report;
pub mod tensor;

pub use backend::BackendId;
pub use report::{AggregatedReport, BackendResult, ClassificationEntry, Headline};
pub use tensor::{ImageTensor, TENSOR_CHANNELS, Tensor4D};
