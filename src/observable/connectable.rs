//! Deferred multicast for Observables built with the publish strategy.
//!
//! The connector bridges one source emission and many observers.
//!
//! # Key Concepts
//!
//! - **Register**: every subscription before `connect` gets its own channel
//!   and nothing else happens.
//! - **Connect**: opens the source once and copies each item into every
//!   registered channel. Connecting is a one-time, irreversible gate.
//! - **Late subscribers**: receive an already closed channel.
//!
//! # Example
//!
//! ```rust,no_run
//! use rxchan::prelude::*;
//!
//! # async fn demo() -> Result<(), RxError> {
//! let published = Options::new().with_publish_strategy().just([1, 2, 3]);
//!
//! let first = published.do_on_next(|v| println!("first: {v}"));
//! let second = published.do_on_next(|v| println!("second: {v}"));
//!
//! published.connect(CancellationToken::new())?;
//! first.await;
//! second.await;
//! # Ok(())
//! # }
//! ```

use std::{
  fmt,
  sync::{Mutex, MutexGuard, PoisonError},
};

use smallvec::SmallVec;
use tokio_util::sync::CancellationToken;

use super::Factory;
use crate::{
  channel::{ItemReceiver, ItemSender},
  error::RxError,
  item::Payload,
  observer::Completion,
  options::Options,
  scheduler,
};

/// Type-erased connect, so every Observable chained off a connectable one can
/// start it whatever its own item type.
pub(crate) trait Connect: Send + Sync {
  fn connect(&self, token: CancellationToken) -> Result<Connection, RxError>;

  /// `true` once a connection was disposed before the source ran dry. Set
  /// before the observer channels close.
  fn halted(&self) -> bool;
}

struct ConnectorState<T> {
  observers: SmallVec<[ItemSender<T>; 4]>,
  connected: bool,
}

pub(crate) struct Connector<T> {
  source: Factory<T>,
  options: Options,
  state: Mutex<ConnectorState<T>>,
  halt: CancellationToken,
}

impl<T: Payload> Connector<T> {
  pub(crate) fn new(source: Factory<T>, options: Options) -> Self {
    Self {
      source,
      options,
      state: Mutex::new(ConnectorState { observers: SmallVec::new(), connected: false }),
      halt: CancellationToken::new(),
    }
  }

  fn state(&self) -> MutexGuard<'_, ConnectorState<T>> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Adds an observer. After `connect` the observer gets an empty stream.
  pub(crate) fn register(&self) -> ItemReceiver<T> {
    let mut state = self.state();
    if state.connected {
      tracing::debug!("subscription after connect, returning an empty stream");
      return ItemReceiver::closed();
    }
    let (tx, rx) = self.options.channel();
    state.observers.push(tx);
    rx
  }
}

impl<T: Payload> Connect for Connector<T> {
  fn connect(&self, token: CancellationToken) -> Result<Connection, RxError> {
    let observers = {
      let mut state = self.state();
      if state.connected {
        return Err(RxError::AlreadyConnected);
      }
      state.connected = true;
      std::mem::take(&mut state.observers)
    };

    let token = token.child_token();
    let input = (self.source)(token.clone());
    tracing::debug!(observers = observers.len(), "connecting");

    let (trigger, done) = Completion::pair();
    let task_token = token.clone();
    let halt = self.halt.clone();
    scheduler::spawn(async move {
      let mut observers = observers;
      broadcast(input, &mut observers, &task_token).await;
      if task_token.is_cancelled() {
        halt.cancel();
      }
      drop(observers);
      trigger.fire();
    });
    Ok(Connection { token, done })
  }

  fn halted(&self) -> bool { self.halt.is_cancelled() }
}

/// Copies every item into each observer channel, in registration order.
///
/// A slow observer holds back all of them once its buffer is full. Observers
/// are left in place on cancellation so the caller decides when their
/// channels close.
async fn broadcast<T: Payload>(
  mut input: ItemReceiver<T>,
  observers: &mut SmallVec<[ItemSender<T>; 4]>,
  token: &CancellationToken,
) {
  while let Some(item) = input.recv_until(token).await {
    let terminal = item.is_error();
    let mut i = 0;
    while i < observers.len() {
      if observers[i].send_until(item.clone(), token).await {
        i += 1;
      } else if token.is_cancelled() {
        return;
      } else {
        tracing::trace!("observer went away, dropping it from the fan-out");
        observers.remove(i);
      }
    }
    if terminal {
      break;
    }
  }
}

/// Handle on a running connection.
pub struct Connection {
  token: CancellationToken,
  done: Completion,
}

impl fmt::Debug for Connection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Connection").field("disposed", &self.is_disposed()).finish()
  }
}

impl Connection {
  /// Stops the fan-out. Observers see their streams end without a
  /// completion.
  pub fn dispose(&self) { self.token.cancel() }

  pub fn is_disposed(&self) -> bool { self.token.is_cancelled() }

  /// Resolves once the source is exhausted or the connection is disposed.
  pub async fn join(self) { self.done.await }
}

#[cfg(test)]
mod tests {
  use std::{
    sync::{Arc, Mutex},
    time::Duration,
  };

  use crate::prelude::*;

  fn create_value_capture<T: Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl FnMut(T) + Send) {
    let values = Arc::new(Mutex::new(Vec::new()));
    let values_clone = values.clone();
    let capture = move |value: T| {
      values_clone.lock().unwrap().push(value);
    };
    (values, capture)
  }

  #[rxchan_macro::test]
  async fn test_connectable_basic() {
    let connectable = Options::new().with_publish_strategy().just([42]);
    assert_eq!(connectable.strategy(), Strategy::Connectable);

    let (captured, observer) = create_value_capture();
    let done = connectable.do_on_next(observer);
    connectable.connect(CancellationToken::new()).unwrap().join().await;
    done.await;

    assert_eq!(*captured.lock().unwrap(), vec![42]);
  }

  #[rxchan_macro::test]
  async fn test_connectable_multiple_observers() {
    let (tx, rx) = channel(0);
    tokio::spawn(async move {
      for i in 1..=3 {
        tx.next(i).await;
      }
    });
    let connectable = Options::new().with_publish_strategy().from_channel(rx);

    let (vals1, obs1) = create_value_capture();
    let (vals2, obs2) = create_value_capture();
    let first = connectable.do_on_next(obs1);
    let second = connectable.do_on_next(obs2);

    // nothing flows before connect
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(vals1.lock().unwrap().is_empty());

    connectable.connect(CancellationToken::new()).unwrap();
    first.await;
    second.await;

    assert_eq!(*vals1.lock().unwrap(), vec![1, 2, 3]);
    assert_eq!(*vals2.lock().unwrap(), vec![1, 2, 3]);
  }

  #[rxchan_macro::test]
  async fn late_observer_gets_nothing() {
    let connectable = Options::new().with_publish_strategy().range(0, 5);
    let early = connectable.observe();
    connectable.connect(CancellationToken::new()).unwrap();
    let late = connectable.to_vec().await.unwrap();
    assert!(late.is_empty());

    let mut early = early;
    let mut got = vec![];
    while let Some(item) = early.recv().await {
      got.push(item.into_result().unwrap());
    }
    assert_eq!(got, vec![0, 1, 2, 3, 4]);
  }

  #[rxchan_macro::test]
  async fn second_connect_fails() {
    let connectable = Options::new().with_publish_strategy().just([1]);
    connectable.connect(CancellationToken::new()).unwrap();
    let err = connectable.connect(CancellationToken::new()).unwrap_err();
    assert!(matches!(err, RxError::AlreadyConnected));
  }

  #[rxchan_macro::test]
  async fn connect_through_an_operator() {
    let connectable = Options::new().with_publish_strategy().just([1, 2, 3]);
    let doubled = connectable.map(|v| Ok::<_, RxError>(v * 2));
    let a = doubled.observe();
    let b = connectable.observe();
    doubled.connect(CancellationToken::new()).unwrap();

    let collect = |mut rx: ItemReceiver<i32>| async move {
      let mut got = vec![];
      while let Some(item) = rx.recv().await {
        got.push(item.into_result().unwrap());
      }
      got
    };
    let (a, b) = tokio::join!(collect(a), collect(b));
    assert_eq!(a, vec![2, 4, 6]);
    assert_eq!(b, vec![1, 2, 3]);
  }

  #[rxchan_macro::test(paused)]
  async fn dispose_stops_fan_out() {
    let connectable = Options::new()
      .with_publish_strategy()
      .with_duration(Duration::from_millis(10))
      .interval()
      .unwrap();
    let mut rx = connectable.observe();
    let connection = connectable.connect(CancellationToken::new()).unwrap();

    assert_eq!(rx.recv().await.unwrap().into_result().unwrap(), 0);
    connection.dispose();
    assert!(connection.is_disposed());
    connection.join().await;
    assert!(rx.recv().await.is_none());
  }

  #[rxchan_macro::test(paused)]
  async fn dispose_does_not_complete_observers() {
    let connectable = Options::new()
      .with_publish_strategy()
      .with_duration(Duration::from_millis(10))
      .interval()
      .unwrap();
    let events = Arc::new(Mutex::new(Vec::new()));
    let (n, c) = (events.clone(), events.clone());
    let done = connectable.map(|v| Ok::<_, RxError>(v)).for_each(
      move |v| n.lock().unwrap().push(format!("next {v}")),
      |_| {},
      move || c.lock().unwrap().push("complete".to_string()),
    );
    let connection = connectable.connect(CancellationToken::new()).unwrap();
    tokio::time::sleep(Duration::from_millis(25)).await;
    connection.dispose();
    done.await;

    let events = events.lock().unwrap();
    assert!(!events.is_empty());
    assert!(events.iter().all(|e| e.starts_with("next")));
  }

  #[rxchan_macro::test]
  async fn exhausted_source_completes_observers() {
    let connectable = Options::new().with_publish_strategy().just([1, 2]);
    let completed = Arc::new(Mutex::new(false));
    let c = completed.clone();
    let done = connectable.do_on_completed(move || *c.lock().unwrap() = true);
    connectable.connect(CancellationToken::new()).unwrap();
    done.await;
    assert!(*completed.lock().unwrap());
  }

  #[rxchan_macro::test]
  async fn error_reaches_every_observer() {
    let connectable = Options::new()
      .with_publish_strategy()
      .just_items([Item::of(1), Item::error("boom"), Item::of(3)]);
    let a = connectable.to_vec();
    let b = connectable.to_vec();
    connectable.connect(CancellationToken::new()).unwrap();
    let (a, b) = tokio::join!(a, b);
    assert!(a.is_err());
    assert!(b.is_err());
  }
}
