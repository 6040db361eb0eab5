use crate::domain::Snapshot;
use async_trait::async_trait;

/// Something that can produce the current snapshot on demand.
///
/// Implementations must always produce a complete snapshot; there is no
/// error channel. [`SnapshotFetcher`](crate::core::fetcher::SnapshotFetcher)
/// is the production implementation, falling back to synthetic data when
/// the remote endpoint is unusable.
#[async_trait]
pub trait SnapshotSource: Send + Sync + 'static {
    async fn snapshot(&self) -> Snapshot;
}
