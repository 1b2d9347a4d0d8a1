use std::{
  collections::{HashSet, VecDeque},
  hash::Hash,
  num::NonZeroUsize,
  sync::Arc,
};

use crate::{
  error::{BoxError, RxError},
  item::{Item, Payload},
  observable::Observable,
  ops::fail,
  options::Options,
};

impl<T: Payload> Observable<T> {
  /// Suppresses values whose key was already seen.
  ///
  /// The first value of each key goes through, in order. An `Err` from
  /// `key_fn` ends the stream with an error-Item.
  pub fn distinct<K, E, F>(&self, key_fn: F) -> Observable<T>
  where
    K: Hash + Eq + Clone + Send + 'static,
    E: Into<BoxError>,
    F: Fn(&T) -> Result<K, E> + Send + Sync + 'static,
  {
    self.distinct_with(key_fn, self.options.clone())
  }

  /// Like [`Observable::distinct`]. With
  /// [`Options::with_distinct_capacity`] only that many keys are remembered
  /// and the oldest one is forgotten first, so a key may pass again once it
  /// has been evicted.
  pub fn distinct_with<K, E, F>(&self, key_fn: F, options: Options) -> Observable<T>
  where
    K: Hash + Eq + Clone + Send + 'static,
    E: Into<BoxError>,
    F: Fn(&T) -> Result<K, E> + Send + Sync + 'static,
  {
    let key_fn = Arc::new(key_fn);
    let capacity = options.distinct_capacity;
    self.lift(options, move |mut input, tx, token| {
      let key_fn = key_fn.clone();
      async move {
        let mut seen = Seen::new(capacity);
        while let Some(item) = input.recv_until(&token).await {
          let v = match item {
            Item::Value(v) => v,
            Item::Error(err) => return fail(&tx, err, &token).await,
          };
          let key = key_fn(&v).map_err(RxError::operator);
          match key {
            Ok(key) => {
              if seen.insert(key) && !tx.send_until(Item::Value(v), &token).await {
                return;
              }
            }
            Err(err) => return fail(&tx, err, &token).await,
          }
        }
      }
    })
  }
}

struct Seen<K> {
  keys: HashSet<K>,
  order: VecDeque<K>,
  capacity: Option<NonZeroUsize>,
}

impl<K: Hash + Eq + Clone> Seen<K> {
  fn new(capacity: Option<NonZeroUsize>) -> Self {
    Self { keys: HashSet::new(), order: VecDeque::new(), capacity }
  }

  /// Returns `false` if the key is already known.
  fn insert(&mut self, key: K) -> bool {
    let Some(capacity) = self.capacity else {
      return self.keys.insert(key);
    };
    if self.keys.contains(&key) {
      return false;
    }
    if self.order.len() == capacity.get() {
      if let Some(oldest) = self.order.pop_front() {
        self.keys.remove(&oldest);
      }
    }
    self.order.push_back(key.clone());
    self.keys.insert(key);
    true
  }
}
