use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
  item::{Item, Payload},
  observable::{Factory, Observable},
  options::Options,
  scheduler,
};

/// A zero-argument computation producing exactly one item.
pub struct Supplier<T>(Arc<dyn Fn(&CancellationToken) -> Item<T> + Send + Sync>);

impl<T> Clone for Supplier<T> {
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T: Payload> Supplier<T> {
  pub fn new<F>(f: F) -> Self
  where
    F: Fn(&CancellationToken) -> Item<T> + Send + Sync + 'static,
  {
    Self(Arc::new(f))
  }
}

/// Runs every supplier concurrently; each contributes one item, in completion
/// order.
pub fn start<T, I>(suppliers: I) -> Observable<T>
where
  T: Payload,
  I: IntoIterator<Item = Supplier<T>>,
{
  Options::default().start(suppliers)
}

impl Options {
  pub fn start<T, I>(self, suppliers: I) -> Observable<T>
  where
    T: Payload,
    I: IntoIterator<Item = Supplier<T>>,
  {
    let suppliers: Arc<[Supplier<T>]> = suppliers.into_iter().collect();
    let opts = self.clone();
    let factory: Factory<T> = Arc::new(move |token: CancellationToken| {
      let (tx, rx) = opts.channel();
      for supplier in suppliers.iter().cloned() {
        let tx = tx.clone();
        let token = token.clone();
        scheduler::spawn(async move {
          let item = (supplier.0)(&token);
          tx.send_until(item, &token).await;
        });
      }
      rx
    });
    Observable::build(self, factory)
  }
}
