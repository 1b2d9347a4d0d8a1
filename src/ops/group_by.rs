use std::sync::Arc;

use crate::{
  error::RxError,
  item::{Item, Payload},
  observable::Observable,
  ops::fail,
  options::{Options, Strategy, DEFAULT_CAPACITY},
};

impl<T: Payload> Observable<T> {
  /// Splits the stream into `num_groups` hot sub-Observables.
  ///
  /// All groups are emitted on the outer stream first, then every value is
  /// routed to group `key_fn(&value)`. Each group channel holds
  /// `options.with_buffered_channel` items (one by default), and routing
  /// waits while the target group is full: a group nobody reads stalls every
  /// other group once its buffer fills. Read the groups concurrently, or size
  /// the buffer for the largest group when reading them one after another.
  ///
  /// A key outside `0..num_groups` emits [`RxError::GroupOutOfRange`] on the
  /// outer stream and ends the split; groups are closed in both cases.
  ///
  /// ```rust,no_run
  /// # use rxchan::prelude::*;
  /// # async fn demo() -> Result<(), RxError> {
  /// let groups = range(0, 10)
  ///   .group_by(3, |v| (*v % 3) as usize, Options::new().with_buffered_channel(10))?
  ///   .to_vec()
  ///   .await?;
  /// for group in groups {
  ///   println!("{:?}", group.to_vec().await?);
  /// }
  /// # Ok(())
  /// # }
  /// ```
  pub fn group_by<F>(
    &self,
    num_groups: usize,
    key_fn: F,
    options: Options,
  ) -> Result<Observable<Observable<T>>, RxError>
  where
    F: Fn(&T) -> usize + Send + Sync + 'static,
  {
    if num_groups == 0 {
      return Err(RxError::invalid("num_groups", "must be positive"));
    }
    let key_fn = Arc::new(key_fn);
    let mut group_opts = options.clone();
    group_opts.strategy = Strategy::Hot;
    // all groups go out before the first value is routed
    let mut outer_opts = options;
    outer_opts.buffer = Some(outer_opts.buffer.unwrap_or(DEFAULT_CAPACITY).max(num_groups));

    Ok(self.lift(outer_opts, move |mut input, tx, token| {
      let key_fn = key_fn.clone();
      let group_opts = group_opts.clone();
      async move {
        let mut groups = Vec::with_capacity(num_groups);
        for _ in 0..num_groups {
          let (group_tx, group_rx) = group_opts.channel();
          let group = Observable::from_shared(group_rx.into_shared(), group_opts.clone());
          if !tx.send_until(Item::Value(group), &token).await {
            return;
          }
          groups.push(group_tx);
        }
        tracing::trace!(num_groups, "groups opened");

        while let Some(item) = input.recv_until(&token).await {
          let v = match item {
            Item::Value(v) => v,
            Item::Error(err) => return fail(&tx, err, &token).await,
          };
          let key = key_fn(&v);
          let Some(group) = groups.get(key) else {
            return fail(&tx, RxError::GroupOutOfRange { key, groups: num_groups }, &token).await;
          };
          if !group.send_until(Item::Value(v), &token).await && token.is_cancelled() {
            return;
          }
        }
      }
    }))
  }
}
