use crate::{error::BoxError, item::Payload, observable::Observable};

impl<T: Payload> Observable<T> {
  /// Serializes each value with `encode`. Fails fast like
  /// [`Observable::map`].
  pub fn marshal<E, F>(&self, encode: F) -> Observable<Vec<u8>>
  where
    E: Into<BoxError> + 'static,
    F: Fn(&T) -> Result<Vec<u8>, E> + Send + Sync + 'static,
  {
    self.map(move |v| encode(&v))
  }
}

impl<T: Payload + AsRef<[u8]>> Observable<T> {
  /// Deserializes each byte payload with `decode` into a fresh
  /// `new_instance()`.
  pub fn unmarshal<U, E, D, N>(&self, decode: D, new_instance: N) -> Observable<U>
  where
    U: Payload,
    E: Into<BoxError> + 'static,
    D: Fn(&[u8], &mut U) -> Result<(), E> + Send + Sync + 'static,
    N: Fn() -> U + Send + Sync + 'static,
  {
    self.map(move |bytes| {
      let mut out = new_instance();
      decode(bytes.as_ref(), &mut out).map(|_| out)
    })
  }
}
