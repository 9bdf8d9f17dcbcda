use core::any::type_name;

use super::polymorphic::Polymorphic;

/// A reference cast whose target is not reachable from the concrete type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("`{concrete}` viewed as `{from}` does not convert to `{to}`")]
pub struct BadCast {
    pub from: &'static str,
    pub concrete: &'static str,
    pub to: &'static str,
}

impl BadCast {
    pub fn new<T: 'static, S: ?Sized + Polymorphic>(s: &S) -> Self {
        Self {
            from: type_name::<S>(),
            concrete: s.type_name(),
            to: type_name::<T>(),
        }
    }
}
