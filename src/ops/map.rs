use std::{num::NonZeroUsize, sync::Arc};

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{
  channel::{ItemReceiver, ItemSender},
  error::{BoxError, RxError},
  item::{Item, Payload},
  observable::Observable,
  ops::fail,
  options::Options,
  scheduler,
};

impl<T: Payload> Observable<T> {
  /// Applies `f` to each value, in order.
  ///
  /// The first `Err` returned by `f` is emitted as an error-Item and ends the
  /// stream: one failure invalidates everything after it.
  ///
  /// ```rust,no_run
  /// # use rxchan::prelude::*;
  /// # async fn demo() {
  /// let out = observable::just([1, 2, 3])
  ///   .map(|v| Ok::<_, RxError>(v * 2))
  ///   .map(|v| Ok::<_, RxError>(v + 1));
  /// assert_eq!(out.to_vec().await.unwrap(), vec![3, 5, 7]);
  /// # }
  /// ```
  pub fn map<U, E, F>(&self, f: F) -> Observable<U>
  where
    U: Payload,
    E: Into<BoxError> + 'static,
    F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
  {
    let mut options = self.options.clone();
    options.pool = None;
    self.map_with(f, options)
  }

  /// Like [`Observable::map`], configured by `options`.
  ///
  /// With [`Options::with_cpu_pool`] or [`Options::with_pool`], `f` runs on
  /// that many concurrent workers and values come out in completion order,
  /// not input order.
  pub fn map_with<U, E, F>(&self, f: F, options: Options) -> Observable<U>
  where
    U: Payload,
    E: Into<BoxError> + 'static,
    F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
  {
    let f = Arc::new(f);
    match options.pool {
      None => self.lift(options, move |input, tx, token| map_stage(input, tx, token, f.clone())),
      Some(workers) => {
        self.lift(options, move |input, tx, token| pooled_map(input, tx, token, f.clone(), workers))
      }
    }
  }
}

async fn map_stage<T, U, E, F>(
  mut input: ItemReceiver<T>,
  tx: ItemSender<U>,
  token: CancellationToken,
  f: Arc<F>,
) where
  E: Into<BoxError>,
  F: Fn(T) -> Result<U, E>,
{
  while let Some(item) = input.recv_until(&token).await {
    let mapped = match item {
      Item::Value(v) => f(v).map_err(RxError::operator),
      Item::Error(err) => Err(err),
    };
    match mapped {
      Ok(v) => {
        if !tx.send_until(Item::Value(v), &token).await {
          return;
        }
      }
      Err(err) => return fail(&tx, err, &token).await,
    }
  }
}

/// Workers pull from one shared input and take turns on the output. The
/// first failing worker sets `failed` under the same lock before sending its
/// error, so no value can follow it, then stops its siblings through a child
/// token, leaving the caller's context alone.
async fn pooled_map<T, U, E, F>(
  input: ItemReceiver<T>,
  tx: ItemSender<U>,
  token: CancellationToken,
  f: Arc<F>,
  workers: NonZeroUsize,
) where
  T: Payload,
  U: Payload,
  E: Into<BoxError>,
  F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
{
  let shared = input.into_shared();
  let stop = token.child_token();
  let failed = Arc::new(Mutex::new(false));
  for _ in 0..workers.get() {
    let mut input = ItemReceiver::shared(shared.clone());
    let (tx, token, stop) = (tx.clone(), token.clone(), stop.clone());
    let (f, failed) = (f.clone(), failed.clone());
    scheduler::spawn(async move {
      while let Some(item) = input.recv_until(&stop).await {
        let mapped = match item {
          Item::Value(v) => f(v).map_err(RxError::operator),
          Item::Error(err) => Err(err),
        };
        let mut failed = failed.lock().await;
        if *failed {
          return;
        }
        match mapped {
          Ok(v) => {
            if !tx.send_until(Item::Value(v), &token).await {
              return;
            }
          }
          Err(err) => {
            *failed = true;
            stop.cancel();
            return fail(&tx, err, &token).await;
          }
        }
      }
    });
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use crate::prelude::*;

  #[rxchan_macro::test]
  async fn primitive_type() {
    let out = just([100]).map(|v| Ok::<_, RxError>(v * 2));
    assert_eq!(out.to_vec().await.unwrap(), vec![200]);
  }

  #[rxchan_macro::test]
  async fn map_types_mixed() {
    let out = just(['a', 'b', 'c']).map(|c| Ok::<_, RxError>(c as u32 - 'a' as u32));
    assert_eq!(out.to_vec().await.unwrap(), vec![0, 1, 2]);
  }

  #[rxchan_macro::test]
  async fn composition_law() {
    let f1 = |v: i64| v * 3;
    let f2 = |v: i64| v - 7;
    let chained = range(0, 50)
      .map(move |v| Ok::<_, RxError>(f1(v)))
      .map(move |v| Ok::<_, RxError>(f2(v)))
      .to_vec()
      .await
      .unwrap();
    let composed =
      range(0, 50).map(move |v| Ok::<_, RxError>(f2(f1(v)))).to_vec().await.unwrap();
    assert_eq!(chained, composed);
  }

  #[rxchan_macro::test]
  async fn first_failure_ends_the_stream() {
    let out = just([1, 2, 3, 4]).map(|v| if v == 3 { Err("three") } else { Ok(v * 10) });
    let mut rx = out.observe();
    assert_eq!(rx.recv().await.unwrap().into_result().unwrap(), 10);
    assert_eq!(rx.recv().await.unwrap().into_result().unwrap(), 20);
    let err = rx.recv().await.unwrap().into_result().unwrap_err();
    assert_eq!(err.to_string(), "operator error: three");
    assert!(rx.recv().await.is_none());
  }

  #[rxchan_macro::test]
  async fn upstream_error_is_not_mapped() {
    let out = just_items([Item::of(1), Item::error("bad"), Item::of(3)])
      .map(|v: i32| Ok::<_, RxError>(v.to_string()));
    let mut rx = out.observe();
    assert_eq!(rx.recv().await.unwrap().into_result().unwrap(), "1");
    assert!(matches!(rx.recv().await.unwrap(), Item::Error(RxError::Producer(_))));
    assert!(rx.recv().await.is_none());
  }

  #[rxchan_macro::test(shared)]
  async fn pooled_map_keeps_every_value() {
    let out = range(1, 20).map_with(
      |v| {
        std::thread::sleep(Duration::from_millis((v % 3) as u64));
        Ok::<_, RxError>(v * 2 + 1)
      },
      Options::new().with_pool(4),
    );
    let mut got = out.to_vec().await.unwrap();
    got.sort_unstable();
    assert_eq!(got, (1..=20).map(|v| v * 2 + 1).collect::<Vec<_>>());
  }

  #[rxchan_macro::test(shared)]
  async fn pooled_map_fails_fast() {
    let out = range(0, 1000).map_with(
      |v| if v == 10 { Err("ten") } else { Ok(v) },
      Options::new().with_cpu_pool(),
    );
    let err = out.to_vec().await.unwrap_err();
    assert_eq!(err.to_string(), "operator error: ten");
  }

  #[rxchan_macro::test(shared)]
  async fn pooled_map_sends_nothing_after_error() {
    for _ in 0..50 {
      let mut rx = range(0, 200)
        .map_with(|v| if v % 7 == 6 { Err("seventh") } else { Ok(v) }, Options::new().with_pool(4))
        .observe();
      let mut errors = 0;
      while let Some(item) = rx.recv().await {
        assert_eq!(errors, 0, "an item followed the error");
        if item.is_error() {
          errors += 1;
        }
      }
      assert_eq!(errors, 1);
    }
  }

  #[rxchan_macro::test]
  async fn rx_error_passes_through_unwrapped() {
    let err = just([1]).map(|_| Err::<i32, _>(RxError::AlreadyConnected)).to_vec().await.unwrap_err();
    assert!(matches!(err, RxError::AlreadyConnected));
  }
}
