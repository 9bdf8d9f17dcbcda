/// A statically proven conversion to an embedded base.
///
/// Generated by [`polymorphic!`](crate::polymorphic) for each declared base path. It never
/// reads the runtime type, so neither the oracle nor the cache is involved.
pub trait Upcast<T> {
    fn upcast(&self) -> &T;
    fn upcast_mut(&mut self) -> &mut T;
}
