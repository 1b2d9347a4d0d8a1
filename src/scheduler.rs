//! Where stream tasks run.
//!
//! Every producer, operator stage, connector and subscription is a tokio task.
//! Inside a runtime, tasks go to the ambient runtime. Outside of one (plain
//! `fn main`, a std thread) they go to a crate-wide multi-thread runtime that
//! is built on first use.

use std::future::Future;

#[cfg(feature = "default-runtime")]
use once_cell::sync::Lazy;
use tokio::{runtime::Handle, task::JoinHandle};

#[cfg(feature = "default-runtime")]
static DEFAULT_RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
  tokio::runtime::Builder::new_multi_thread()
    .thread_name("rxchan-worker")
    .enable_time()
    .build()
    .expect("build the default rxchan runtime failed.")
});

/// Spawns `task` on the ambient runtime, or on the default one.
pub fn spawn<F>(task: F) -> JoinHandle<F::Output>
where
  F: Future + Send + 'static,
  F::Output: Send + 'static,
{
  match Handle::try_current() {
    Ok(handle) => handle.spawn(task),
    Err(_) => spawn_detached(task),
  }
}

#[cfg(feature = "default-runtime")]
fn spawn_detached<F>(task: F) -> JoinHandle<F::Output>
where
  F: Future + Send + 'static,
  F::Output: Send + 'static,
{
  tracing::trace!("no ambient runtime, spawning on the default runtime");
  DEFAULT_RUNTIME.spawn(task)
}

#[cfg(not(feature = "default-runtime"))]
fn spawn_detached<F>(_task: F) -> JoinHandle<F::Output>
where
  F: Future + Send + 'static,
  F::Output: Send + 'static,
{
  panic!(
    "rxchan needs a tokio runtime: call it from within one or enable the `default-runtime` feature"
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[rxchan_macro::test]
  fn spawn_outside_runtime() {
    let handle = spawn(async { 40 + 2 });
    assert_eq!(futures::executor::block_on(handle).unwrap(), 42);
  }

  #[rxchan_macro::test]
  async fn spawn_inside_runtime() {
    let handle = spawn(async { "ambient" });
    assert_eq!(handle.await.unwrap(), "ambient");
  }
}
