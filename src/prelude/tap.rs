pub trait Tap<T> {
  fn tap(self, action: impl FnOnce(&T) -> ()) -> Self;
}

impl<T, E> Tap<T> for Result<T, E> {
  fn tap(self, action: impl FnOnce(&T) -> ()) -> Self {
    self.map(|v| {
          action(&v);
          v
        })
  }
}

impl<T> Tap<T> for Option<T> {
  fn tap(self, action: impl FnOnce(&T) -> ()) -> Self {
    self.map(|v| {
          action(&v);
          v
        })
  }
}

pub trait TapErr<E> {
  fn tap_err(self, action: impl FnOnce(&E) -> ()) -> Self;
}

impl<T, E> TapErr<E> for Result<T, E> {
  fn tap_err(self, action: impl FnOnce(&E) -> ()) -> Self {
    self.map_err(|e| {
          action(&e);
          e
        })
  }
}
