use std::future::Future;

use futures::future::BoxFuture;

use crate::errors::RefreshError;

pub type RefreshFuture = BoxFuture<'static, Result<(), RefreshError>>;

/// Caller-supplied data refresh.
///
/// Invoked repeatedly; the scheduler never assumes it is idempotent. Any
/// `Fn() -> impl Future<Output = Result<(), RefreshError>>` closure qualifies.
pub trait RefreshOperation: Send + Sync + 'static {
    fn refresh(&self) -> RefreshFuture;
}

impl<F, Fut> RefreshOperation for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), RefreshError>> + Send + 'static,
{
    fn refresh(&self) -> RefreshFuture {
        Box::pin(self())
    }
}
