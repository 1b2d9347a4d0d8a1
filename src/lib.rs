//! # rxchan: channel-backed reactive streams
//!
//! Observables built on tokio channels. Producers write [`Item`]s into an
//! emitter channel, operators are tasks reading one channel and writing the
//! next, and observers drain the last one.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rxchan::prelude::*;
//!
//! # async fn demo() -> Result<(), RxError> {
//! let evens = range(1, 10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| Ok::<_, RxError>(v * 10))
//!   .to_vec()
//!   .await?;
//! assert_eq!(evens, vec![20, 40, 60, 80, 100]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Item`] | A value or an error, never both |
//! | [`ItemSender`] / [`ItemReceiver`] | Ends of an emitter channel |
//! | [`Observable`] | A hot, cold or connectable stream with operator methods |
//! | [`Observer`] | Consumes `next`, then one `error` or one `complete` |
//! | [`Options`] | Strategy, buffering, pooling and cancellation context |
//!
//! ## Feature Flags
//!
//! - **`default-runtime`** (default): tasks started outside a tokio runtime
//!   run on a lazily built crate-wide runtime instead of panicking.
//!
//! [`Item`]: item::Item
//! [`ItemSender`]: channel::ItemSender
//! [`ItemReceiver`]: channel::ItemReceiver
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Options`]: options::Options

pub mod channel;
pub mod error;
pub mod item;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod options;
pub mod prelude;
pub mod scheduler;

pub use prelude::*;

#[cfg(doctest)]
mod __markdown_doctests {
  mod readme {
    #![doc = include_str!("../README.md")]
  }
}
