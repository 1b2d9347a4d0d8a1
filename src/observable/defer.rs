use crate::{
  item::Payload,
  observable::{create::producers_factory, Observable, Producer},
  options::{Options, Strategy},
};

/// Creates an observable that runs nothing until subscribed, then runs the
/// producer set afresh for that subscriber.
///
/// Always cold, unless built with the publish strategy, in which case the
/// producers run once per `connect`.
pub fn defer<T, I>(producers: I) -> Observable<T>
where
  T: Payload,
  I: IntoIterator<Item = Producer<T>>,
{
  Options::default().defer(producers)
}

impl Options {
  pub fn defer<T, I>(mut self, producers: I) -> Observable<T>
  where
    T: Payload,
    I: IntoIterator<Item = Producer<T>>,
  {
    if self.strategy == Strategy::Hot {
      self.strategy = Strategy::Cold;
    }
    let factory = producers_factory(&self, producers);
    Observable::build(self, factory)
  }
}
