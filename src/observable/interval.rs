use std::{sync::Arc, time::Duration};

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
  error::RxError,
  item::Item,
  observable::{Factory, Observable},
  options::Options,
  scheduler,
};

/// Creates an observable which fires `0, 1, 2, ...`, one value per `period`,
/// starting one `period` after subscription.
///
/// Never completes on its own: cancel its context, or chain `take`.
pub fn interval(period: Duration) -> Result<Observable<usize>, RxError> {
  Options::default().with_duration(period).interval()
}

impl Options {
  /// Interval over the period set by [`Options::with_duration`].
  pub fn interval(self) -> Result<Observable<usize>, RxError> {
    let period = match self.duration {
      None => return Err(RxError::invalid("duration", "interval needs a period")),
      Some(period) if period.is_zero() => {
        return Err(RxError::invalid("duration", "interval period must be positive"))
      }
      Some(period) => period,
    };

    let opts = self.clone();
    let factory: Factory<usize> = Arc::new(move |token: CancellationToken| {
      let (tx, rx) = opts.channel();
      scheduler::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        // a slow consumer delays the ticks instead of receiving a burst
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        for seq in 0.. {
          tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
          }
          if !tx.send_until(Item::of(seq), &token).await {
            break;
          }
        }
      });
      rx
    });
    Ok(Observable::build(self, factory))
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use tokio::time::Instant;

  use crate::prelude::*;

  #[rxchan_macro::test(paused)]
  async fn ticks_every_period() {
    let stamp = Instant::now();
    let ticks = interval(Duration::from_millis(100)).unwrap().take(5).to_vec().await.unwrap();
    assert_eq!(ticks, vec![0, 1, 2, 3, 4]);
    assert!(stamp.elapsed() >= Duration::from_millis(500));
  }

  #[rxchan_macro::test]
  fn zero_or_missing_period_is_rejected() {
    assert!(matches!(
      interval(Duration::ZERO),
      Err(RxError::InvalidArgument { name: "duration", .. })
    ));
    assert!(Options::new().interval().is_err());
  }

  #[rxchan_macro::test(paused)]
  async fn cancel_ends_the_stream() {
    let token = CancellationToken::new();
    let obs = Options::new()
      .with_context(token.clone())
      .with_duration(Duration::from_secs(1))
      .interval()
      .unwrap();
    let mut rx = obs.observe();
    assert_eq!(rx.recv().await.unwrap().into_result().unwrap(), 0);
    token.cancel();
    let mut rest = 0;
    while rx.recv().await.is_some() {
      rest += 1;
    }
    assert!(rest <= 1);
  }
}
