use common::error::Res;
use futures::future::BoxFuture;

pub mod keys;
pub mod memory;
pub mod s3;

pub use memory::MemoryStorage;
pub use s3::S3Storage;

/// Object storage for listing images.
///
/// Calls are awaited inline by request handlers; implementations do not retry.
pub trait ObjectStorage: Send + Sync {
    /// Stores `bytes` under `key` and returns the stored key.
    fn put<'a>(&'a self, key: &'a str, bytes: Vec<u8>, content_type: &'a str) -> BoxFuture<'a, Res<String>>;

    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Res<()>>;

    /// Address clients can fetch `key` from.
    fn public_url(&self, key: &str) -> String;
}
