use std::time::Duration;

use tokio::time::{self, Instant};

use crate::{
  item::{Item, Payload},
  observable::Observable,
  ops::fail,
};

impl<T: Payload> Observable<T> {
  /// Emits a value only once `duration` has passed without a newer one.
  ///
  /// Every value restarts the timer. The trailing value is flushed when the
  /// source completes and dropped when it fails.
  pub fn debounce(&self, duration: Duration) -> Observable<T> {
    self.lift(self.options.clone(), move |mut input, tx, token| async move {
      let mut trailing: Option<T> = None;
      let timer = time::sleep(duration);
      tokio::pin!(timer);
      loop {
        tokio::select! {
          biased;
          _ = token.cancelled() => return,
          _ = &mut timer, if trailing.is_some() => {
            if let Some(v) = trailing.take() {
              if !tx.send_until(Item::Value(v), &token).await {
                return;
              }
            }
          }
          item = input.recv() => match item {
            Some(Item::Value(v)) => {
              trailing = Some(v);
              timer.as_mut().reset(Instant::now() + duration);
            }
            Some(Item::Error(err)) => return fail(&tx, err, &token).await,
            None => {
              if let Some(v) = trailing.take() {
                tx.send_until(Item::Value(v), &token).await;
              }
              return;
            }
          },
        }
      }
    })
  }
}
