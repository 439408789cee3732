use super::Publisher;
use crate::{
  error::{Error, Result},
  subscriber::{Completion, Subscriber},
  subscription::{link::Link, Subscription},
};

/// Replays a pre-captured list of values, then a pre-captured completion.
///
/// Values are gated by demand; the completion follows as soon as the values
/// run out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record<T, E> {
  values: Vec<T>,
  completion: Completion<E>,
}

impl<T, E> Record<T, E> {
  pub fn new(values: Vec<T>, completion: Completion<E>) -> Self { Record { values, completion } }

  /// Builds a record by driving a [`Recording`]. A recording left without a
  /// completion finishes.
  pub fn record(f: impl FnOnce(&mut Recording<T, E>) -> Result<()>) -> Result<Self> {
    let mut recording = Recording::new();
    f(&mut recording)?;
    Ok(recording.finish())
  }

  pub fn values(&self) -> &[T] { &self.values }

  pub fn completion(&self) -> &Completion<E> { &self.completion }
}

impl<T, E> Publisher for Record<T, E>
where
  T: Clone + Send + 'static,
  E: Clone + Send + 'static,
{
  type Output = T;
  type Failure = E;

  fn subscribe<Sub>(&self, subscriber: Sub) -> Subscription
  where
    Sub: Subscriber<T, E> + Send + 'static,
  {
    Link::new(
      subscriber,
      Some(Box::new(self.values.clone().into_iter())),
      Some(self.completion.clone()),
    )
    .start()
  }
}

/// Captures values and one completion for a [`Record`].
#[derive(Debug)]
pub struct Recording<T, E> {
  values: Vec<T>,
  completion: Option<Completion<E>>,
}

impl<T, E> Default for Recording<T, E> {
  fn default() -> Self { Recording { values: Vec::new(), completion: None } }
}

impl<T, E> Recording<T, E> {
  pub fn new() -> Self { Self::default() }

  /// Appends a value. Fails once a completion has been recorded.
  pub fn receive(&mut self, value: T) -> Result<()> {
    if self.completion.is_some() {
      return Err(Error::RecordingFinished);
    }
    self.values.push(value);
    Ok(())
  }

  /// Records the completion. Only one is accepted.
  pub fn receive_completion(&mut self, completion: Completion<E>) -> Result<()> {
    if self.completion.is_some() {
      return Err(Error::RecordingFinished);
    }
    self.completion = Some(completion);
    Ok(())
  }

  pub fn is_finished(&self) -> bool { self.completion.is_some() }

  pub fn finish(self) -> Record<T, E> {
    Record::new(self.values, self.completion.unwrap_or(Completion::Finished))
  }
}
