use crate::{
  item::{Item, Payload},
  observable::Observable,
  ops::fail,
};

impl<T: Payload> Observable<T> {
  /// Emits only the value at zero-based `index`, or nothing if the stream is
  /// shorter.
  pub fn element_at(&self, index: usize) -> Observable<T> {
    self.lift(self.options.clone(), move |mut input, tx, token| async move {
      let mut position = 0;
      while let Some(item) = input.recv_until(&token).await {
        match item {
          Item::Value(v) if position == index => {
            tx.send_until(Item::Value(v), &token).await;
            return;
          }
          Item::Value(_) => position += 1,
          Item::Error(err) => return fail(&tx, err, &token).await,
        }
      }
    })
  }
}
