//! Configuration shared by constructors and option-taking operators.
//!
//! `Options` plays the part of the execution context: it carries the
//! cancellation token, the emission strategy and channel sizing, and every
//! Observable derived from another inherits it.
//!
//! ```rust,no_run
//! use rxchan::prelude::*;
//!
//! # async fn demo() {
//! let groups = Options::new().with_buffered_channel(10).range(0, 10);
//! let connectable = Options::new().with_publish_strategy().just([1, 2, 3]);
//! # }
//! ```

use std::{num::NonZeroUsize, thread, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::channel::{channel, ItemReceiver, ItemSender};

/// Capacity used for every channel when no buffer size is configured.
pub const DEFAULT_CAPACITY: usize = 1;

/// How an Observable hands its items to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
  /// Emission starts at construction and all subscribers share one channel.
  /// Each item goes to exactly one subscriber; a subscriber arriving after the
  /// source is drained gets an empty stream.
  #[default]
  Hot,
  /// Emission starts anew for every subscription.
  Cold,
  /// Subscribers register first; `connect` starts one emission that is
  /// copied to each of them.
  Connectable,
}

#[derive(Debug, Clone)]
pub struct Options {
  pub(crate) buffer: Option<usize>,
  pub(crate) duration: Option<Duration>,
  pub(crate) strategy: Strategy,
  pub(crate) pool: Option<NonZeroUsize>,
  pub(crate) context: CancellationToken,
  pub(crate) distinct_capacity: Option<NonZeroUsize>,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      buffer: None,
      duration: None,
      strategy: Strategy::Hot,
      pool: None,
      context: CancellationToken::new(),
      distinct_capacity: None,
    }
  }
}

impl Options {
  pub fn new() -> Self { Self::default() }

  /// Timer period, used by [`Options::interval`].
  pub fn with_duration(mut self, duration: Duration) -> Self {
    self.duration = Some(duration);
    self
  }

  /// Capacity of the channels this Observable and its operators allocate.
  pub fn with_buffered_channel(mut self, capacity: usize) -> Self {
    self.buffer = Some(capacity);
    self
  }

  /// Makes the Observable connectable.
  pub fn with_publish_strategy(mut self) -> Self {
    self.strategy = Strategy::Connectable;
    self
  }

  /// Makes constructors re-run their source for every subscription.
  pub fn with_cold_strategy(mut self) -> Self {
    self.strategy = Strategy::Cold;
    self
  }

  /// Runs `map` on one worker per available CPU.
  pub fn with_cpu_pool(mut self) -> Self {
    self.pool = Some(thread::available_parallelism().unwrap_or(NonZeroUsize::MIN));
    self
  }

  /// Runs `map` on `workers` concurrent workers. Zero means no pool.
  pub fn with_pool(mut self, workers: usize) -> Self {
    self.pool = NonZeroUsize::new(workers);
    self
  }

  /// Cancellation context observed by producers and operator stages.
  pub fn with_context(mut self, token: CancellationToken) -> Self {
    self.context = token;
    self
  }

  /// Bounds the key set kept by `distinct`, forgetting the oldest key first.
  pub fn with_distinct_capacity(mut self, capacity: usize) -> Self {
    self.distinct_capacity = NonZeroUsize::new(capacity);
    self
  }

  pub fn strategy(&self) -> Strategy { self.strategy }

  pub fn context(&self) -> &CancellationToken { &self.context }

  pub(crate) fn channel<T>(&self) -> (ItemSender<T>, ItemReceiver<T>) {
    channel(self.buffer.unwrap_or(DEFAULT_CAPACITY))
  }
}
