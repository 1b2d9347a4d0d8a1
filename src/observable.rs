//! The Observable type and its subscription lifecycle.
//!
//! An Observable is one of three sources:
//!
//! | Strategy | Backing | A second subscription... |
//! |----------|---------|---------------------------|
//! | Hot | one channel, filled from construction on | competes for the remaining items, gets nothing once drained |
//! | Cold | a factory opening a fresh channel | gets a fresh emission |
//! | Connectable | a [`connector`](connectable) | registers and waits for `connect` |
//!
//! Operators are always lazy: chaining one allocates nothing, each
//! subscription to the chained Observable opens a channel and starts one task
//! per stage. Whether items are shared or replayed is decided by the root of
//! the chain.

use std::{future::Future, sync::Arc};

use tokio_util::sync::CancellationToken;

use crate::{
  channel::{ItemReceiver, ItemSender, SharedRx},
  error::RxError,
  item::{Item, Payload},
  observer::{Completion, FnMutObserver, FnObserver, Observer},
  options::{Options, Strategy},
  scheduler,
};

mod connectable;
mod create;
mod defer;
mod from_channel;
mod interval;
mod just;
mod range;
mod start;

pub use connectable::Connection;
pub(crate) use connectable::{Connect, Connector};
pub use create::{create, Producer};
pub use defer::defer;
pub use from_channel::from_channel;
pub use interval::interval;
pub use just::{just, just_items};
pub use range::range;
pub use start::{start, Supplier};

/// Opens the channel of one subscription.
pub(crate) type Factory<T> = Arc<dyn Fn(CancellationToken) -> ItemReceiver<T> + Send + Sync>;

enum Source<T> {
  Hot(SharedRx<T>),
  Cold(Factory<T>),
  Connectable(Arc<Connector<T>>),
}

impl<T> Clone for Source<T> {
  fn clone(&self) -> Self {
    match self {
      Source::Hot(rx) => Source::Hot(rx.clone()),
      Source::Cold(factory) => Source::Cold(factory.clone()),
      Source::Connectable(connector) => Source::Connectable(connector.clone()),
    }
  }
}

/// A composable, asynchronous sequence of [`Item`]s.
///
/// Cloning an Observable clones a handle: clones of a hot Observable share its
/// channel, clones of a connectable one share its connector.
pub struct Observable<T> {
  source: Source<T>,
  strategy: Strategy,
  pub(crate) options: Options,
  connector: Option<Arc<dyn Connect>>,
}

impl<T> Clone for Observable<T> {
  fn clone(&self) -> Self {
    Self {
      source: self.source.clone(),
      strategy: self.strategy,
      options: self.options.clone(),
      connector: self.connector.clone(),
    }
  }
}

impl<T: Payload> Observable<T> {
  /// Builds a root Observable according to `options.strategy`.
  ///
  /// A hot root opens its one channel right away, under the options' context.
  pub(crate) fn build(options: Options, factory: Factory<T>) -> Self {
    match options.strategy {
      Strategy::Hot => {
        let rx = factory(options.context.clone());
        Self::from_shared(rx.into_shared(), options)
      }
      Strategy::Cold => {
        Self { source: Source::Cold(factory), strategy: Strategy::Cold, options, connector: None }
      }
      Strategy::Connectable => {
        let connector = Arc::new(Connector::new(factory, options.clone()));
        Self {
          connector: Some(connector.clone()),
          source: Source::Connectable(connector),
          strategy: Strategy::Connectable,
          options,
        }
      }
    }
  }

  pub(crate) fn from_shared(rx: SharedRx<T>, options: Options) -> Self {
    Self { source: Source::Hot(rx), strategy: Strategy::Hot, options, connector: None }
  }

  /// Chains a stage: every subscription to the returned Observable subscribes
  /// to `self` and runs `stage` from the input receiver to a fresh output
  /// channel sized by `options`.
  pub(crate) fn lift<U, F, Fut>(&self, options: Options, stage: F) -> Observable<U>
  where
    U: Payload,
    F: Fn(ItemReceiver<T>, ItemSender<U>, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
  {
    let upstream = self.clone();
    let channel_opts = options.clone();
    let factory: Factory<U> = Arc::new(move |token: CancellationToken| {
      let input = upstream.observe_with(token.clone());
      let (tx, rx) = channel_opts.channel();
      scheduler::spawn(stage(input, tx, token));
      rx
    });
    Observable {
      source: Source::Cold(factory),
      strategy: self.strategy,
      options,
      connector: self.connector.clone(),
    }
  }

  /// Emission strategy of the root of this chain.
  pub fn strategy(&self) -> Strategy { self.strategy }

  pub fn options(&self) -> &Options { &self.options }

  // ==================== Consumption ====================

  /// Returns the raw item channel of a new subscription.
  ///
  /// The receiver yields error-Items as ordinary items: check
  /// [`Item::is_error`] on each one. Use [`Observable::for_each`] to have
  /// errors routed to a callback instead.
  pub fn observe(&self) -> ItemReceiver<T> { self.observe_with(self.options.context.clone()) }

  /// Like [`Observable::observe`], under an explicit cancellation context.
  ///
  /// The context reaches every cold stage of the chain. A hot root keeps
  /// running under the context it was built with.
  pub fn observe_with(&self, token: CancellationToken) -> ItemReceiver<T> {
    match &self.source {
      Source::Hot(rx) => ItemReceiver::shared(rx.clone()),
      Source::Cold(factory) => factory(token),
      Source::Connectable(connector) => connector.register(),
    }
  }

  /// Drains a new subscription into `observer` on its own task.
  ///
  /// `observer` gets every value, then either one `error` (the first
  /// error-Item, after which the subscription stops) or one `complete`.
  /// Neither is called when the context is cancelled first, or when the
  /// connection feeding a connectable chain is disposed.
  pub fn subscribe<O>(&self, observer: O) -> Completion
  where
    O: Observer<T> + Send + 'static,
  {
    let token = self.options.context.clone();
    let mut input = self.observe_with(token.clone());
    let connector = self.connector.clone();
    let (trigger, done) = Completion::pair();
    scheduler::spawn(async move {
      let mut observer = observer;
      loop {
        match input.recv_until(&token).await {
          Some(Item::Value(v)) => observer.next(v),
          Some(Item::Error(err)) => {
            observer.error(err);
            break;
          }
          None => {
            let halted = connector.as_ref().is_some_and(|c| c.halted());
            if !token.is_cancelled() && !halted {
              observer.complete();
            }
            break;
          }
        }
      }
      trigger.fire();
    });
    done
  }

  pub fn for_each<N, E, C>(&self, on_next: N, on_error: E, on_complete: C) -> Completion
  where
    N: FnMut(T) + Send + 'static,
    E: FnOnce(RxError) + Send + 'static,
    C: FnOnce() + Send + 'static,
  {
    self.subscribe(FnObserver::new(on_next, on_error, on_complete))
  }

  pub fn do_on_next<N>(&self, on_next: N) -> Completion
  where
    N: FnMut(T) + Send + 'static,
  {
    self.subscribe(FnMutObserver(on_next))
  }

  pub fn do_on_error<E>(&self, on_error: E) -> Completion
  where
    E: FnOnce(RxError) + Send + 'static,
  {
    self.subscribe(FnObserver::new(|_: T| {}, on_error, || {}))
  }

  pub fn do_on_completed<C>(&self, on_complete: C) -> Completion
  where
    C: FnOnce() + Send + 'static,
  {
    self.subscribe(FnObserver::new(|_: T| {}, |_| {}, on_complete))
  }

  /// Collects a new subscription, stopping at the first error.
  ///
  /// The subscription is made when `to_vec` is called, not when the future
  /// is first polled, so it counts as registered for a later `connect`.
  pub fn to_vec(&self) -> impl Future<Output = Result<Vec<T>, RxError>> + Send + 'static {
    let token = self.options.context.clone();
    let mut input = self.observe_with(token.clone());
    // drained on its own task, so a connector never waits on an unpolled
    // future
    let collecting = scheduler::spawn(async move {
      let mut values = Vec::new();
      while let Some(item) = input.recv_until(&token).await {
        values.push(item.into_result()?);
      }
      Ok(values)
    });
    async move {
      match collecting.await {
        Ok(values) => values,
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        // runtime shut down under the task
        Err(_) => Ok(Vec::new()),
      }
    }
  }

  /// Starts the connectable root of this chain.
  ///
  /// Everything subscribed before this call receives a copy of every item;
  /// anything subscribed later receives nothing. Cancelling `token`, or
  /// disposing the returned [`Connection`], stops the fan-out.
  pub fn connect(&self, token: CancellationToken) -> Result<Connection, RxError> {
    match &self.connector {
      Some(connector) => connector.connect(token),
      None => Err(RxError::NotConnectable),
    }
  }
}
