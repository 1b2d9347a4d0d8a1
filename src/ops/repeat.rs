use std::time::Duration;

use tokio::time;

use crate::{
  item::{Item, Payload},
  observable::Observable,
  ops::fail,
};

impl<T: Payload> Observable<T> {
  /// Forwards the source while recording it, then replays the recording
  /// `count` more times, pausing `interval` before each replay.
  ///
  /// A source error is forwarded and nothing is replayed.
  pub fn repeat(&self, count: usize, interval: Duration) -> Observable<T> {
    self.lift(self.options.clone(), move |mut input, tx, token| async move {
      let mut recorded = Vec::new();
      while let Some(item) = input.recv_until(&token).await {
        match item {
          Item::Value(v) => {
            recorded.push(v.clone());
            if !tx.send_until(Item::Value(v), &token).await {
              return;
            }
          }
          Item::Error(err) => return fail(&tx, err, &token).await,
        }
      }
      for round in 0..count {
        tokio::select! {
          biased;
          _ = token.cancelled() => return,
          _ = time::sleep(interval) => {}
        }
        tracing::trace!(round, len = recorded.len(), "replaying");
        for v in &recorded {
          if !tx.send_until(Item::Value(v.clone()), &token).await {
            return;
          }
        }
      }
    })
  }
}
