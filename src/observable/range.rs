use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
  item::Item,
  observable::{Factory, Observable},
  options::Options,
  scheduler,
};

/// Emits `count` consecutive integers starting at `start`, then completes.
///
/// Values are produced lazily, one per free buffer slot.
pub fn range(start: i64, count: usize) -> Observable<i64> { Options::default().range(start, count) }

impl Options {
  pub fn range(self, start: i64, count: usize) -> Observable<i64> {
    let opts = self.clone();
    let factory: Factory<i64> = Arc::new(move |token: CancellationToken| {
      let (tx, rx) = opts.channel();
      scheduler::spawn(async move {
        for value in (start..).take(count) {
          if !tx.send_until(Item::of(value), &token).await {
            break;
          }
        }
      });
      rx
    });
    Observable::build(self, factory)
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[rxchan_macro::test]
  async fn emits_count_values() {
    assert_eq!(range(0, 5).to_vec().await.unwrap(), vec![0, 1, 2, 3, 4]);
    assert_eq!(range(-2, 3).to_vec().await.unwrap(), vec![-2, -1, 0]);
  }

  #[rxchan_macro::test]
  async fn zero_count_completes_empty() {
    assert!(range(7, 0).to_vec().await.unwrap().is_empty());
  }

  #[rxchan_macro::test]
  async fn cancel_stops_the_producer() {
    let token = CancellationToken::new();
    let obs = Options::new().with_context(token.clone()).range(0, usize::MAX);
    let mut rx = obs.observe();
    assert_eq!(rx.recv().await.unwrap().into_result().unwrap(), 0);
    token.cancel();
    // at most the already buffered value is left
    let mut rest = 0;
    while rx.recv().await.is_some() {
      rest += 1;
    }
    assert!(rest <= 1);
  }
}
