//! Observer trait, closure adapters and the completion signal.
//!
//! An Observer receives values, then at most one terminal notification:
//! `error` or `complete`. Both terminal methods consume the observer, so no
//! notification can follow them.

use std::{
  future::Future,
  pin::Pin,
  task::{Context, Poll},
};

use pin_project_lite::pin_project;
use tokio::sync::oneshot;

use crate::error::RxError;

// ============================================================================
// Observer Trait
// ============================================================================

/// The consumer side of a subscription.
pub trait Observer<T> {
  /// Receive the next value.
  fn next(&mut self, value: T);

  /// The stream failed. Consumes the observer: nothing follows an error.
  fn error(self, err: RxError);

  /// The stream drained without error. Consumes the observer.
  fn complete(self);
}

// ============================================================================
// Closure adapters
// ============================================================================

/// Observer built from three closures, as used by `for_each`.
pub struct FnObserver<N, E, C> {
  pub(crate) on_next: N,
  pub(crate) on_error: E,
  pub(crate) on_complete: C,
}

impl<N, E, C> FnObserver<N, E, C> {
  pub fn new(on_next: N, on_error: E, on_complete: C) -> Self {
    Self { on_next, on_error, on_complete }
  }
}

impl<T, N, E, C> Observer<T> for FnObserver<N, E, C>
where
  N: FnMut(T),
  E: FnOnce(RxError),
  C: FnOnce(),
{
  #[inline]
  fn next(&mut self, value: T) { (self.on_next)(value) }

  #[inline]
  fn error(self, err: RxError) { (self.on_error)(err) }

  #[inline]
  fn complete(self) { (self.on_complete)() }
}

/// Observer that only reacts to values.
#[derive(Clone)]
pub struct FnMutObserver<F>(pub F);

impl<T, F> Observer<T> for FnMutObserver<F>
where
  F: FnMut(T),
{
  #[inline]
  fn next(&mut self, value: T) { (self.0)(value) }

  fn error(self, _err: RxError) {}

  fn complete(self) {}
}

// ============================================================================
// Completion
// ============================================================================

pin_project! {
  /// Fires once a subscription is finished: after `complete`, after `error`,
  /// or when its context is cancelled.
  ///
  /// Await it from async code or call [`Completion::wait`] from a plain
  /// thread. Dropping it does not cancel the subscription.
  pub struct Completion {
    #[pin]
    done: oneshot::Receiver<()>,
  }
}

/// Sending half kept by the task driving a subscription.
pub(crate) struct CompletionTrigger(oneshot::Sender<()>);

impl CompletionTrigger {
  pub(crate) fn fire(self) { let _ = self.0.send(()); }
}

impl Completion {
  pub(crate) fn pair() -> (CompletionTrigger, Completion) {
    let (tx, rx) = oneshot::channel();
    (CompletionTrigger(tx), Completion { done: rx })
  }

  /// Blocks the current thread until the subscription is finished.
  ///
  /// Must not be called from within an async context.
  pub fn wait(self) { futures::executor::block_on(self) }
}

impl Future for Completion {
  type Output = ();

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
    // A dropped trigger also means the driving task is gone.
    self.project().done.poll(cx).map(|_| ())
  }
}
