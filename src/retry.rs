//! Bounded retry over candidate queries

use std::future::Future;

/// Try candidates in order until one is accepted, giving up after `max_attempts`.
///
/// `attempt` returns `None` to reject a candidate (failed or empty result).
pub async fn first_accepted<C, T, F, Fut>(
    candidates: impl IntoIterator<Item = C>,
    max_attempts: usize,
    mut attempt: F,
) -> Option<T>
where
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for (n, candidate) in candidates.into_iter().take(max_attempts).enumerate() {
        if let Some(value) = attempt(candidate).await {
            return Some(value);
        }
        tracing::debug!("Attempt {}/{} rejected", n + 1, max_attempts);
    }
    None
}
