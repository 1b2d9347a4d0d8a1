//! The unit flowing through every channel.

use crate::error::{BoxError, RxError};

/// Bound shared by every payload type.
///
/// Items are cloned when a connectable observable fans out, when a cold
/// `just` replays its values and when `repeat` replays a recorded sequence,
/// and they cross task boundaries, hence `Clone + Send + Sync + 'static`.
/// Streams mixing several kinds of values use a caller defined enum as `T`.
pub trait Payload: Clone + Send + Sync + 'static {}

impl<T> Payload for T where T: Clone + Send + Sync + 'static {}

/// A value or an error, never both.
#[derive(Debug, Clone)]
pub enum Item<T> {
  Value(T),
  Error(RxError),
}

impl<T> Item<T> {
  /// Wraps a value.
  #[inline]
  pub fn of(value: T) -> Self { Item::Value(value) }

  /// Wraps an error raised by producer code.
  #[inline]
  pub fn error(err: impl Into<BoxError>) -> Self { Item::Error(RxError::producer(err)) }

  #[inline]
  pub fn is_error(&self) -> bool { matches!(self, Item::Error(_)) }

  pub fn value(&self) -> Option<&T> {
    match self {
      Item::Value(v) => Some(v),
      Item::Error(_) => None,
    }
  }

  pub fn err(&self) -> Option<&RxError> {
    match self {
      Item::Value(_) => None,
      Item::Error(e) => Some(e),
    }
  }

  pub fn into_result(self) -> Result<T, RxError> {
    match self {
      Item::Value(v) => Ok(v),
      Item::Error(e) => Err(e),
    }
  }

  /// Applies `f` to a value, leaving an error untouched.
  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Item<U> {
    match self {
      Item::Value(v) => Item::Value(f(v)),
      Item::Error(e) => Item::Error(e),
    }
  }
}

impl<T> From<Result<T, RxError>> for Item<T> {
  fn from(res: Result<T, RxError>) -> Self {
    match res {
      Ok(v) => Item::Value(v),
      Err(e) => Item::Error(e),
    }
  }
}
