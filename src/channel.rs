//! Emitter channels: the only transport between producers, operator stages
//! and consumers.
//!
//! A channel is FIFO. A bounded channel applies backpressure: `send` waits
//! while the buffer is full. The channel ends once every [`ItemSender`] clone
//! is dropped and the queue is drained, so items already sent are never lost
//! to an early close.

use std::sync::Arc;

use futures::stream::{self, Stream};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::{error::BoxError, item::Item};

/// Creates a bounded channel. A capacity of zero is rounded up to one, the
/// closest an async channel gets to a rendezvous.
pub fn channel<T>(capacity: usize) -> (ItemSender<T>, ItemReceiver<T>) {
  let (tx, rx) = mpsc::channel(capacity.max(1));
  (ItemSender { inner: Tx::Bounded(tx) }, ItemReceiver::owned(Rx::Bounded(rx)))
}

/// Creates a channel whose senders never wait.
pub fn unbounded_channel<T>() -> (ItemSender<T>, ItemReceiver<T>) {
  let (tx, rx) = mpsc::unbounded_channel();
  (ItemSender { inner: Tx::Unbounded(tx) }, ItemReceiver::owned(Rx::Unbounded(rx)))
}

// ============================================================================
// Sender
// ============================================================================

enum Tx<T> {
  Bounded(mpsc::Sender<Item<T>>),
  Unbounded(mpsc::UnboundedSender<Item<T>>),
}

/// Writing end of an emitter channel. Clone it to add writers.
pub struct ItemSender<T> {
  inner: Tx<T>,
}

impl<T> Clone for ItemSender<T> {
  fn clone(&self) -> Self {
    let inner = match &self.inner {
      Tx::Bounded(tx) => Tx::Bounded(tx.clone()),
      Tx::Unbounded(tx) => Tx::Unbounded(tx.clone()),
    };
    Self { inner }
  }
}

impl<T> ItemSender<T> {
  /// Sends an item, waiting for buffer space.
  ///
  /// Returns `false` once the reading end is gone; producers should stop.
  pub async fn send(&self, item: Item<T>) -> bool {
    match &self.inner {
      Tx::Bounded(tx) => tx.send(item).await.is_ok(),
      Tx::Unbounded(tx) => tx.send(item).is_ok(),
    }
  }

  #[inline]
  pub async fn next(&self, value: T) -> bool { self.send(Item::Value(value)).await }

  #[inline]
  pub async fn error(&self, err: impl Into<BoxError>) -> bool { self.send(Item::error(err)).await }

  /// Sends unless `token` is cancelled first.
  pub async fn send_until(&self, item: Item<T>, token: &CancellationToken) -> bool {
    tokio::select! {
      biased;
      _ = token.cancelled() => false,
      sent = self.send(item) => sent,
    }
  }

  /// Sends without waiting. Fails when the buffer is full or the reading end
  /// is gone.
  pub fn try_send(&self, item: Item<T>) -> bool {
    match &self.inner {
      Tx::Bounded(tx) => tx.try_send(item).is_ok(),
      Tx::Unbounded(tx) => tx.send(item).is_ok(),
    }
  }

  /// Sends from a thread that is not driving an async runtime.
  ///
  /// Panics when called from within an async context, like
  /// `tokio::sync::mpsc::Sender::blocking_send`.
  pub fn blocking_send(&self, item: Item<T>) -> bool {
    match &self.inner {
      Tx::Bounded(tx) => tx.blocking_send(item).is_ok(),
      Tx::Unbounded(tx) => tx.send(item).is_ok(),
    }
  }

  /// `true` once the reading end has been dropped.
  pub fn is_closed(&self) -> bool {
    match &self.inner {
      Tx::Bounded(tx) => tx.is_closed(),
      Tx::Unbounded(tx) => tx.is_closed(),
    }
  }
}

// ============================================================================
// Receiver
// ============================================================================

pub(crate) enum Rx<T> {
  Bounded(mpsc::Receiver<Item<T>>),
  Unbounded(mpsc::UnboundedReceiver<Item<T>>),
}

impl<T> Rx<T> {
  async fn recv(&mut self) -> Option<Item<T>> {
    match self {
      Rx::Bounded(rx) => rx.recv().await,
      Rx::Unbounded(rx) => rx.recv().await,
    }
  }

  fn blocking_recv(&mut self) -> Option<Item<T>> {
    match self {
      Rx::Bounded(rx) => rx.blocking_recv(),
      Rx::Unbounded(rx) => rx.blocking_recv(),
    }
  }
}

/// One receiving end read by many consumers. Each item goes to whichever
/// consumer holds the lock when it arrives.
pub(crate) type SharedRx<T> = Arc<Mutex<Rx<T>>>;

enum RxInner<T> {
  Owned(Rx<T>),
  Shared(SharedRx<T>),
}

/// Reading end of an emitter channel.
///
/// Returned by [`Observable::observe`](crate::observable::Observable::observe).
/// `recv` yields `None` once the stream is over. Items are not interpreted:
/// an error-Item comes back as [`Item::Error`] and the caller must check it.
pub struct ItemReceiver<T> {
  inner: RxInner<T>,
}

impl<T> ItemReceiver<T> {
  fn owned(rx: Rx<T>) -> Self { Self { inner: RxInner::Owned(rx) } }

  pub(crate) fn shared(rx: SharedRx<T>) -> Self { Self { inner: RxInner::Shared(rx) } }

  /// A receiver that is already at end of stream.
  pub fn closed() -> Self {
    let (_, rx) = mpsc::unbounded_channel();
    Self::owned(Rx::Unbounded(rx))
  }

  /// Turns this receiver into one that can be read by several consumers.
  pub(crate) fn into_shared(self) -> SharedRx<T> {
    match self.inner {
      RxInner::Owned(rx) => Arc::new(Mutex::new(rx)),
      RxInner::Shared(rx) => rx,
    }
  }

  pub async fn recv(&mut self) -> Option<Item<T>> {
    match &mut self.inner {
      RxInner::Owned(rx) => rx.recv().await,
      RxInner::Shared(rx) => rx.lock().await.recv().await,
    }
  }

  /// Receives unless `token` is cancelled first, in which case the stream is
  /// treated as over.
  pub async fn recv_until(&mut self, token: &CancellationToken) -> Option<Item<T>> {
    tokio::select! {
      biased;
      _ = token.cancelled() => None,
      item = self.recv() => item,
    }
  }

  /// Receives from a thread that is not driving an async runtime.
  ///
  /// Panics when called from within an async context.
  pub fn blocking_recv(&mut self) -> Option<Item<T>> {
    match &mut self.inner {
      RxInner::Owned(rx) => rx.blocking_recv(),
      RxInner::Shared(rx) => rx.blocking_lock().blocking_recv(),
    }
  }

  /// Adapts the receiver into a `futures` stream.
  pub fn into_stream(self) -> impl Stream<Item = Item<T>> + Send
  where
    T: Send + 'static,
  {
    stream::unfold(self, |mut rx| async move { rx.recv().await.map(|item| (item, rx)) })
  }
}
