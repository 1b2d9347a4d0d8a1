use std::{future::Future, sync::Arc};

use futures::future::{BoxFuture, FutureExt};
use tokio_util::sync::CancellationToken;

use crate::{
  channel::ItemSender,
  item::Payload,
  observable::{Factory, Observable},
  options::Options,
  scheduler,
};

/// User code writing items into a shared channel.
///
/// A producer returns when it has nothing more to emit. It should watch the
/// token and stop when `send` reports the reading end is gone.
///
/// ```rust,no_run
/// # use rxchan::prelude::*;
/// let producer = Producer::new(|_token, tx: ItemSender<i32>| async move {
///   tx.next(1).await;
///   tx.error("unknown").await;
/// });
/// ```
pub struct Producer<T>(
  Arc<dyn Fn(CancellationToken, ItemSender<T>) -> BoxFuture<'static, ()> + Send + Sync>,
);

impl<T> Clone for Producer<T> {
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T: Payload> Producer<T> {
  pub fn new<F, Fut>(f: F) -> Self
  where
    F: Fn(CancellationToken, ItemSender<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
  {
    Self(Arc::new(move |token, tx| f(token, tx).boxed()))
  }

  fn run(&self, token: CancellationToken, tx: ItemSender<T>) -> BoxFuture<'static, ()> {
    (self.0)(token, tx)
  }
}

/// Runs every producer concurrently into one channel, completing when the
/// last of them returns.
pub fn create<T, I>(producers: I) -> Observable<T>
where
  T: Payload,
  I: IntoIterator<Item = Producer<T>>,
{
  Options::default().create(producers)
}

impl Options {
  pub fn create<T, I>(self, producers: I) -> Observable<T>
  where
    T: Payload,
    I: IntoIterator<Item = Producer<T>>,
  {
    let factory = producers_factory(&self, producers);
    Observable::build(self, factory)
  }
}

/// Each call starts a fresh run of every producer. The channel ends when all
/// sender clones, one per producer, are dropped.
pub(super) fn producers_factory<T, I>(options: &Options, producers: I) -> Factory<T>
where
  T: Payload,
  I: IntoIterator<Item = Producer<T>>,
{
  let producers: Arc<[Producer<T>]> = producers.into_iter().collect();
  let opts = options.clone();
  Arc::new(move |token: CancellationToken| {
    let (tx, rx) = opts.channel();
    tracing::debug!(producers = producers.len(), "starting producers");
    for producer in producers.iter() {
      scheduler::spawn(producer.run(token.clone(), tx.clone()));
    }
    rx
  })
}
