pub mod local;
#[cfg(feature = "lambda")]
pub mod s3;

pub use local::LocalStorage;
#[cfg(feature = "lambda")]
pub use s3::S3Storage;
