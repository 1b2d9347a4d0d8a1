use std::sync::Arc;

use crate::{
  channel::unbounded_channel,
  item::{Item, Payload},
  observable::{Factory, Observable},
  options::Options,
};

/// Emits `items` in order, then completes.
///
/// Hot by default: the sequence is queued at construction and whichever
/// subscriber drains it first gets it.
///
/// ```rust,no_run
/// # use rxchan::prelude::*;
/// # async fn demo() {
/// let mut rx = observable::just([1, 2, 3]).observe();
/// while let Some(item) = rx.recv().await {
///   println!("{:?}", item.value());
/// }
/// # }
/// ```
pub fn just<T, I>(items: I) -> Observable<T>
where
  T: Payload,
  I: IntoIterator<Item = T>,
{
  Options::default().just(items)
}

/// Like [`just`], with error-Items allowed anywhere in the sequence.
pub fn just_items<T, I>(items: I) -> Observable<T>
where
  T: Payload,
  I: IntoIterator<Item = Item<T>>,
{
  Options::default().just_items(items)
}

impl Options {
  pub fn just<T, I>(self, items: I) -> Observable<T>
  where
    T: Payload,
    I: IntoIterator<Item = T>,
  {
    self.just_items(items.into_iter().map(Item::Value))
  }

  pub fn just_items<T, I>(self, items: I) -> Observable<T>
  where
    T: Payload,
    I: IntoIterator<Item = Item<T>>,
  {
    let items: Arc<[Item<T>]> = items.into_iter().collect();
    let factory: Factory<T> = Arc::new(move |_| {
      let (tx, rx) = unbounded_channel();
      for item in items.iter() {
        tx.try_send(item.clone());
      }
      rx
    });
    Observable::build(self, factory)
  }
}
