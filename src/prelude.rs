//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and functions for easy access.

pub use tokio_util::sync::CancellationToken;

pub use crate::{
  channel::{channel, unbounded_channel, ItemReceiver, ItemSender},
  error::{BoxError, RxError, SharedError},
  item::{Item, Payload},
  observable::{
    self, create, defer, from_channel, interval, just, just_items, range, start, Connection,
    Observable, Producer, Supplier,
  },
  observer::{Completion, FnMutObserver, FnObserver, Observer},
  options::{Options, Strategy, DEFAULT_CAPACITY},
};
