//! File I/O, validation, and serialization for the dissim pipeline.

mod align;
mod domain;
mod error;
mod reader;
mod writer;

pub use align::align_channels;
pub use domain::{Dataset, ExperimentName, SampleId};
pub use error::IoError;
pub use reader::SampleReader;
pub use writer::{ChannelPrototypes, FeatureWriter};
