//! Errors raised outside of a stream.
//!
//! Stream failures are values delivered through [`Completion::Failed`]; the
//! variants here cover the few operations that can fail before or beside a
//! subscription, such as building an executor or appending to a finished
//! [`Recording`].
//!
//! [`Completion::Failed`]: crate::subscriber::Completion::Failed
//! [`Recording`]: crate::publisher::Recording

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build thread pool: {0}")]
  ThreadPool(#[from] std::io::Error),

  #[error("failed to spawn task: {0}")]
  Spawn(#[from] futures::task::SpawnError),

  #[cfg(feature = "tokio-scheduler")]
  #[error("no tokio runtime: {0}")]
  NoRuntime(#[from] tokio::runtime::TryCurrentError),

  #[error("recording already finished")]
  RecordingFinished,
}

pub type Result<T> = std::result::Result<T, Error>;
