pub trait Monad<A, B>
  where Self: Sized
{
  type Out;
  fn bind(self, f: impl FnOnce(A) -> Self::Out) -> Self::Out;
}

impl<A, B, E> Monad<A, B> for Result<A, E> {
  type Out = Result<B, E>;
  fn bind(self, f: impl FnOnce(A) -> Self::Out) -> Self::Out {
    self.and_then(f)
  }
}

impl<A, B> Monad<A, B> for Option<A> {
  type Out = Option<B>;
  fn bind(self, f: impl FnOnce(A) -> Self::Out) -> Self::Out {
    self.and_then(f)
  }
}
