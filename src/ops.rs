//! Operators. Each file adds methods to [`Observable`](crate::observable::Observable).
//!
//! Every stage follows the same policy: values are transformed in order,
//! the first error-Item (from upstream or from a user function) is forwarded
//! and ends the stage, and a cancelled context ends it silently.

use tokio_util::sync::CancellationToken;

use crate::{channel::ItemSender, error::RxError, item::Item};

pub mod buffer_count;
pub mod debounce;
pub mod distinct;
pub mod element_at;
pub mod filter;
pub mod group_by;
pub mod map;
pub mod marshal;
pub mod repeat;
pub mod skip;
pub mod take;

/// Forwards the error that terminates a stage.
pub(crate) async fn fail<U>(tx: &ItemSender<U>, err: RxError, token: &CancellationToken) {
  tracing::debug!(error = %err, "stream terminated by error");
  tx.send_until(Item::Error(err), token).await;
}
