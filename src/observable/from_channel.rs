use std::sync::Arc;

use crate::{
  channel::ItemReceiver,
  item::Payload,
  observable::{Factory, Observable},
  options::{Options, Strategy},
};

/// Adapts a caller owned channel.
///
/// The stream ends when the caller drops every sender. A single external
/// channel cannot be replayed, so the result is shared (hot) unless built with
/// the publish strategy.
pub fn from_channel<T: Payload>(rx: ItemReceiver<T>) -> Observable<T> {
  Options::default().from_channel(rx)
}

impl Options {
  pub fn from_channel<T: Payload>(mut self, rx: ItemReceiver<T>) -> Observable<T> {
    if self.strategy == Strategy::Cold {
      self.strategy = Strategy::Hot;
    }
    let shared = rx.into_shared();
    let factory: Factory<T> = Arc::new(move |_| ItemReceiver::shared(shared.clone()));
    Observable::build(self, factory)
  }
}
