//! Bounded execution of Argon2 work off the async scheduler.
//!
//! Argon2 is CPU and memory bound. The pool runs every hash and verify on
//! tokio's blocking thread pool and caps how many run at once with a
//! semaphore; callers beyond the cap wait in the semaphore's FIFO queue.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::{Error, PasswordHasher, Result, TRACING_TARGET_HASHING_POOL};

/// Async front end for a [`PasswordHasher`] with bounded concurrency.
///
/// Dropping a pending future is safe: the operations have no side effects
/// to undo, and the permit is released when the blocking task finishes.
#[derive(Debug, Clone)]
pub struct HashingPool {
    hasher: PasswordHasher,
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
}

impl HashingPool {
    /// Creates a pool running at most `max_concurrent` operations at once.
    ///
    /// A `max_concurrent` of zero is treated as one.
    pub fn new(hasher: PasswordHasher, max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            hasher,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    /// Returns the hasher operations are delegated to.
    #[inline]
    #[must_use]
    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// Maximum number of operations running at once.
    #[inline]
    #[must_use]
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Number of operations that could start right now.
    #[inline]
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Hashes a secret on the blocking pool.
    ///
    /// Fails with the same errors as [`PasswordHasher::hash`], or an internal
    /// error if the worker task could not complete.
    pub async fn hash(&self, raw: String) -> Result<String> {
        let hasher = self.hasher.clone();
        self.run(move || hasher.hash(&raw)).await?
    }

    /// Verifies a secret on the blocking pool.
    ///
    /// Returns `false` in every case [`PasswordHasher::verify`] does, and
    /// also when the worker task could not complete.
    pub async fn verify(&self, raw: String, hashed: String) -> bool {
        let hasher = self.hasher.clone();
        match self.run(move || hasher.verify(&raw, &hashed)).await {
            Ok(verified) => verified,
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET_HASHING_POOL,
                    error = %error,
                    "verification task failed"
                );
                false
            }
        }
    }

    /// Runs a dummy verification on the blocking pool; always `false`.
    pub async fn verify_dummy(&self, raw: String) -> bool {
        let hasher = self.hasher.clone();
        if let Err(error) = self.run(move || hasher.verify_dummy(&raw)).await {
            tracing::error!(
                target: TRACING_TARGET_HASHING_POOL,
                error = %error,
                "dummy verification task failed"
            );
        }

        false
    }

    async fn run<T, F>(&self, task: F) -> Result<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = self.semaphore.clone().acquire_owned().await.map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_HASHING_POOL,
                "semaphore closed, rejecting hashing task"
            );

            Error::internal("hashing_pool", "pool is closed").with_source(e)
        })?;

        tracing::trace!(
            target: TRACING_TARGET_HASHING_POOL,
            available = self.semaphore.available_permits(),
            "hashing task started"
        );

        tokio::task::spawn_blocking(move || {
            // Hold permit until the work completes
            let _permit = permit;
            task()
        })
        .await
        .map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_HASHING_POOL,
                error = %e,
                "hashing task panicked or was cancelled"
            );

            Error::internal("hashing_pool", "hashing task failed").with_source(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::ErrorKind;
    use crate::hasher::tests::fast_hasher;

    #[tokio::test]
    async fn test_hash_and_verify() -> anyhow::Result<()> {
        let pool = HashingPool::new(fast_hasher(), 2);

        let hash = pool.hash("TestPassword123!".to_owned()).await?;
        assert!(pool.verify("TestPassword123!".to_owned(), hash.clone()).await);
        assert!(!pool.verify("WrongPassword456!".to_owned(), hash).await);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_secret_error_propagates() {
        let pool = HashingPool::new(fast_hasher(), 1);
        let error = pool.hash(String::new()).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_malformed_hash_is_false() {
        let pool = HashingPool::new(fast_hasher(), 1);
        assert!(!pool.verify("TestPassword123!".to_owned(), "junk".to_owned()).await);
        assert!(!pool.verify_dummy("TestPassword123!".to_owned()).await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_hashing_completes() -> anyhow::Result<()> {
        let pool = HashingPool::new(fast_hasher(), 2);
        assert_eq!(pool.max_concurrent(), 2);

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let pool = pool.clone();
                tokio::spawn(async move { pool.hash(format!("Concurrent{i}!Aa")).await })
            })
            .collect();

        let mut hashes = Vec::new();
        for task in tasks {
            hashes.push(task.await??);
        }

        assert_eq!(hashes.len(), 8);
        assert_eq!(pool.available_permits(), 2);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_running_tasks_never_exceed_limit() -> anyhow::Result<()> {
        let pool = HashingPool::new(fast_hasher(), 2);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let pool = pool.clone();
                let in_flight = in_flight.clone();
                let peak = peak.clone();
                tokio::spawn(async move {
                    pool.run(move || {
                        let running = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(running, Ordering::SeqCst);
                        std::thread::sleep(Duration::from_millis(50));
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                    })
                    .await
                })
            })
            .collect();

        // Both permits are held while the first tasks sleep.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(pool.available_permits(), 0);

        for task in tasks {
            task.await??;
        }

        let peak = peak.load(Ordering::SeqCst);
        assert!(peak <= 2, "{peak} tasks ran at once with a limit of 2");
        assert!(peak >= 1);
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
        assert_eq!(pool.available_permits(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_closed_pool_fails_safely() {
        let pool = HashingPool::new(fast_hasher(), 1);
        pool.semaphore.close();

        assert!(!pool.verify_dummy("TestPassword123!".to_owned()).await);
        assert!(!pool.verify("TestPassword123!".to_owned(), "junk".to_owned()).await);

        let error = pool.hash("TestPassword123!".to_owned()).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let pool = HashingPool::new(fast_hasher(), 0);
        assert_eq!(pool.max_concurrent(), 1);
    }
}
