pub mod enricher;
pub mod etl;
pub mod fetcher;
pub mod pipeline;
pub mod raw_scan;
pub mod trigger;
pub mod writer;

pub use crate::domain::model::{IngestedRecord, ObjectLocation, RatePayload, RawTableRow};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
