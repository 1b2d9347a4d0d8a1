use crate::{
  item::{Item, Payload},
  observable::Observable,
  ops::fail,
};

impl<T: Payload> Observable<T> {
  /// Emits the first `count` values, then completes without reading further.
  ///
  /// `take(0)` completes immediately.
  pub fn take(&self, count: usize) -> Observable<T> {
    self.lift(self.options.clone(), move |mut input, tx, token| async move {
      let mut taken = 0;
      while taken < count {
        match input.recv_until(&token).await {
          Some(Item::Value(v)) => {
            taken += 1;
            if !tx.send_until(Item::Value(v), &token).await {
              return;
            }
          }
          Some(Item::Error(err)) => return fail(&tx, err, &token).await,
          None => return,
        }
      }
    })
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use crate::prelude::*;

  #[rxchan_macro::test]
  async fn base_function() {
    assert_eq!(range(0, 100).take(5).to_vec().await.unwrap(), vec![0, 1, 2, 3, 4]);
  }

  #[rxchan_macro::test]
  async fn take_zero_completes_empty() {
    assert!(range(0, 100).take(0).to_vec().await.unwrap().is_empty());
  }

  #[rxchan_macro::test]
  async fn shorter_source() {
    assert_eq!(just([1, 2]).take(5).to_vec().await.unwrap(), vec![1, 2]);
  }

  #[rxchan_macro::test]
  async fn stops_cold_producer() {
    let produced = Arc::new(AtomicUsize::new(0));
    let p = produced.clone();
    let obs = defer([Producer::new(move |_, tx| {
      let p = p.clone();
      async move {
        for i in 0.. {
          if !tx.next(i).await {
            break;
          }
          p.fetch_add(1, Ordering::SeqCst);
        }
      }
    })]);
    assert_eq!(obs.take(3).to_vec().await.unwrap(), vec![0, 1, 2]);
    tokio::task::yield_now().await;
    assert!(produced.load(Ordering::SeqCst) < 10);
  }
}
