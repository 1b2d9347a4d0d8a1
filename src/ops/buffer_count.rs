use crate::{
  error::RxError,
  item::{Item, Payload},
  observable::Observable,
  ops::fail,
};

impl<T: Payload> Observable<T> {
  /// Collects values into batches of `count`. The last batch holds whatever
  /// is left when the source completes and may be shorter.
  ///
  /// An upstream error drops the partial batch and is forwarded.
  pub fn buffer_with_count(&self, count: usize) -> Result<Observable<Vec<T>>, RxError> {
    if count == 0 {
      return Err(RxError::invalid("count", "must be positive"));
    }
    Ok(self.lift(self.options.clone(), move |mut input, tx, token| async move {
      let mut buffer = Vec::with_capacity(count);
      while let Some(item) = input.recv_until(&token).await {
        match item {
          Item::Value(v) => {
            buffer.push(v);
            if buffer.len() == count {
              let batch = std::mem::replace(&mut buffer, Vec::with_capacity(count));
              if !tx.send_until(Item::Value(batch), &token).await {
                return;
              }
            }
          }
          Item::Error(err) => return fail(&tx, err, &token).await,
        }
      }
      if !buffer.is_empty() && !token.is_cancelled() {
        tx.send_until(Item::Value(buffer), &token).await;
      }
    }))
  }
}
