//! Error types carried by error-Items and returned by operator constructors.

use std::{error::Error, fmt, sync::Arc};

/// A user error, shared so that an error-Item can be cloned into every
/// observer of a connectable stream.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Cheaply cloneable wrapper around a user supplied error.
#[derive(Clone)]
pub struct SharedError(Arc<dyn Error + Send + Sync + 'static>);

impl SharedError {
  pub fn new(err: impl Into<BoxError>) -> Self { Self(Arc::from(err.into())) }

  /// Attempts to view the wrapped error as a concrete type.
  pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> { self.0.downcast_ref::<E>() }
}

impl fmt::Debug for SharedError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Debug::fmt(&self.0, f) }
}

impl fmt::Display for SharedError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Display::fmt(&self.0, f) }
}

impl Error for SharedError {
  fn source(&self) -> Option<&(dyn Error + 'static)> { Some(&*self.0) }
}

/// Everything that can go wrong in a stream.
///
/// Channel closure is not part of this enum: a closed channel is the normal
/// completion signal.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RxError {
  /// Raised by a producer or supplier.
  #[error("producer error: {0}")]
  Producer(SharedError),

  /// Raised by a user function running inside an operator (map, filter,
  /// distinct key, codec).
  #[error("operator error: {0}")]
  Operator(SharedError),

  /// Rejected at operator construction time, before any subscription.
  #[error("invalid argument `{name}`: {reason}")]
  InvalidArgument { name: &'static str, reason: &'static str },

  /// `group_by` key function returned a key outside `0..groups`.
  #[error("group key {key} out of range for {groups} groups")]
  GroupOutOfRange { key: usize, groups: usize },

  #[error("observable is already connected")]
  AlreadyConnected,

  #[error("observable was not built with the publish strategy")]
  NotConnectable,
}

impl RxError {
  /// Wraps a producer error. An `RxError` is returned as is.
  pub fn producer(err: impl Into<BoxError>) -> Self { Self::wrap(err.into(), RxError::Producer) }

  /// Wraps an error from a user function. An `RxError` is returned as is.
  pub fn operator(err: impl Into<BoxError>) -> Self { Self::wrap(err.into(), RxError::Operator) }

  fn wrap(err: BoxError, kind: fn(SharedError) -> RxError) -> Self {
    match err.downcast::<RxError>() {
      Ok(err) => *err,
      Err(other) => kind(SharedError(Arc::from(other))),
    }
  }

  pub(crate) fn invalid(name: &'static str, reason: &'static str) -> Self {
    RxError::InvalidArgument { name, reason }
  }
}
