//! Wait-for-all fan-out of independent platform calls.
//!
//! Every registered operation is polled concurrently and allowed to finish.
//! The join fails if any operation failed, reporting each failure by label.
//! Completed operations keep their side effects.

use std::future::Future;

use futures::future::{join_all, BoxFuture};
use tracing::{debug, warn};

use crate::error::{CallError, FanOutError, OperationFailure};

/// A batch of labelled, independent operations.
#[derive(Default)]
pub struct FanOut<'a> {
    operations: Vec<(String, BoxFuture<'a, Result<(), CallError>>)>,
}

impl<'a> FanOut<'a> {
    /// Create an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation. It does not start until [`join`](Self::join).
    pub fn push<F>(&mut self, label: impl Into<String>, operation: F)
    where
        F: Future<Output = Result<(), CallError>> + Send + 'a,
    {
        self.operations.push((label.into(), Box::pin(operation)));
    }

    /// Number of registered operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether no operations are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Run all operations to completion.
    ///
    /// Returns the number of operations on success.
    pub async fn join(self) -> Result<usize, FanOutError> {
        let total = self.operations.len();
        let (labels, futures): (Vec<String>, Vec<_>) = self.operations.into_iter().unzip();

        let results = join_all(futures).await;

        let failures: Vec<OperationFailure> = labels
            .into_iter()
            .zip(results)
            .filter_map(|(label, result)| match result {
                Ok(()) => {
                    debug!(operation = %label, "Fan-out operation completed");
                    None
                }
                Err(error) => {
                    warn!(operation = %label, error = %error, "Fan-out operation failed");
                    Some(OperationFailure { label, error })
                }
            })
            .collect();

        if failures.is_empty() {
            Ok(total)
        } else {
            Err(FanOutError { total, failures })
        }
    }
}
