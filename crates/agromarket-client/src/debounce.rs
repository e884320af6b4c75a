//! Debounced input.
//!
//! Search boxes fire on every keystroke; only the value that stays unchanged
//! for the whole delay should trigger a query.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Delay used by the forum thread search box.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Shortest trimmed query worth searching for.
pub const MIN_QUERY_LEN: usize = 2;

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: AtomicU64,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            generation: AtomicU64::new(0),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits out the delay and returns `Some(value)` only if no newer call
    /// was made in the meantime. Superseded calls resolve to `None`.
    pub async fn settle<V>(&self, value: V) -> Option<V> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        (self.generation.load(Ordering::SeqCst) == ticket).then_some(value)
    }

    /// Debounces a search box value. Returns the trimmed query once it has
    /// settled, or `None` if it was superseded or is too short to search.
    /// A short query still supersedes earlier ones.
    pub async fn settle_query(&self, raw: &str) -> Option<String> {
        let query = self.settle(raw.trim().to_string()).await?;
        (query.chars().count() >= MIN_QUERY_LEN).then_some(query)
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn lone_call_settles() {
        let debouncer = Debouncer::default();
        assert_eq!(debouncer.settle("tomatoes").await, Some("tomatoes"));
    }

    #[tokio::test(start_paused = true)]
    async fn only_last_of_a_burst_settles() {
        let debouncer = Debouncer::new(Duration::from_millis(300));

        let first = debouncer.settle("tom");
        let second = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            debouncer.settle("tomatoes").await
        };

        let (a, b) = tokio::join!(first, second);
        assert_eq!(a, None);
        assert_eq!(b, Some("tomatoes"));
    }

    #[tokio::test(start_paused = true)]
    async fn query_is_trimmed_and_needs_two_chars() {
        let debouncer = Debouncer::default();
        assert_eq!(debouncer.settle_query("  kale ").await, Some("kale".to_string()));
        assert_eq!(debouncer.settle_query(" k ").await, None);
        assert_eq!(debouncer.settle_query("   ").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn short_query_cancels_pending_search() {
        let debouncer = Debouncer::default();

        let first = debouncer.settle_query("kale");
        let second = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            debouncer.settle_query("k").await
        };

        let (a, b) = tokio::join!(first, second);
        assert_eq!(a, None);
        assert_eq!(b, None);
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_calls_both_settle() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        assert_eq!(debouncer.settle(1).await, Some(1));
        assert_eq!(debouncer.settle(2).await, Some(2));
    }
}
