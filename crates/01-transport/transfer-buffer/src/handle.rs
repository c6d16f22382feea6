//! Split producer/consumer views over one shared buffer.
//!
//! Neither handle is `Clone` and both take `&mut self` for transfers, so the
//! one-producer/one-consumer contract is enforced at compile time rather
//! than by the buffer's runtime Overflow check.

use std::sync::Arc;

use crate::buffer::TransferBuffer;
use crate::config::{BufferConfig, PopOptions, PushOptions};
use crate::error::{ConfigResult, FailureCause, PopError, PushError};
use crate::outcome::TransferOutcome;

/// Producer side of a [`channel`].
#[derive(Debug)]
pub struct Producer<T> {
    inner: Arc<TransferBuffer<T>>,
}

impl<T> Producer<T> {
    pub async fn push(&mut self, value: T) -> Result<(), PushError> {
        self.inner.push(value).await
    }

    pub async fn push_final(&mut self, value: T) -> Result<(), PushError> {
        self.inner.push_final(value).await
    }

    pub async fn push_with(&mut self, value: T, options: PushOptions<'_>) -> Result<(), PushError> {
        self.inner.push_with(value, options).await
    }

    pub fn fail(&self, message: impl Into<String>, cause: Option<FailureCause>) {
        self.inner.fail(message, cause);
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    pub fn buffer(&self) -> &Arc<TransferBuffer<T>> {
        &self.inner
    }
}

/// Consumer side of a [`channel`].
#[derive(Debug)]
pub struct Consumer<T> {
    inner: Arc<TransferBuffer<T>>,
}

impl<T> Consumer<T> {
    pub async fn pop(&mut self) -> Result<TransferOutcome<T>, PopError> {
        self.inner.pop().await
    }

    pub async fn pop_with(
        &mut self,
        options: PopOptions<'_>,
    ) -> Result<TransferOutcome<T>, PopError> {
        self.inner.pop_with(options).await
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    pub fn is_failed(&self) -> bool {
        self.inner.is_failed()
    }

    pub fn failure_message(&self) -> Option<String> {
        self.inner.failure_message()
    }

    pub fn buffer(&self) -> &Arc<TransferBuffer<T>> {
        &self.inner
    }
}

/// Creates a buffer from `config` and splits it into its two ends.
pub fn channel<T>(config: BufferConfig) -> ConfigResult<(Producer<T>, Consumer<T>)> {
    let shared = Arc::new(TransferBuffer::with_config(config)?);
    Ok((
        Producer {
            inner: Arc::clone(&shared),
        },
        Consumer { inner: shared },
    ))
}
