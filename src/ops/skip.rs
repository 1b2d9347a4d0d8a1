use crate::{
  item::{Item, Payload},
  observable::Observable,
  ops::fail,
};

impl<T: Payload> Observable<T> {
  /// Drops the first `count` values and emits the rest.
  pub fn skip(&self, count: usize) -> Observable<T> {
    self.lift(self.options.clone(), move |mut input, tx, token| async move {
      let mut skipped = 0;
      while let Some(item) = input.recv_until(&token).await {
        match item {
          Item::Value(_) if skipped < count => skipped += 1,
          Item::Value(v) => {
            if !tx.send_until(Item::Value(v), &token).await {
              return;
            }
          }
          Item::Error(err) => return fail(&tx, err, &token).await,
        }
      }
    })
  }
}
