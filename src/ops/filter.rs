use std::sync::Arc;

use crate::{
  item::{Item, Payload},
  observable::Observable,
  ops::fail,
};

impl<T: Payload> Observable<T> {
  /// Emits only the values satisfying `predicate`, in order.
  pub fn filter<F>(&self, predicate: F) -> Observable<T>
  where
    F: Fn(&T) -> bool + Send + Sync + 'static,
  {
    let predicate = Arc::new(predicate);
    self.lift(self.options.clone(), move |mut input, tx, token| {
      let predicate = predicate.clone();
      async move {
        while let Some(item) = input.recv_until(&token).await {
          match item {
            Item::Value(v) => {
              if predicate(&v) && !tx.send_until(Item::Value(v), &token).await {
                return;
              }
            }
            Item::Error(err) => return fail(&tx, err, &token).await,
          }
        }
      }
    })
  }
}
