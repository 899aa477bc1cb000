use std::sync::Arc;

use crate::errors::NewsfeedResult;

/// Run a synchronous repository call on the blocking pool.
pub(crate) async fn run_blocking<R, T, F>(repository: &Arc<R>, f: F) -> NewsfeedResult<T>
where
    R: Send + Sync + 'static,
    T: Send + 'static,
    F: FnOnce(&R) -> NewsfeedResult<T> + Send + 'static,
{
    let repository = Arc::clone(repository);
    tokio::task::spawn_blocking(move || f(&repository)).await?
}
