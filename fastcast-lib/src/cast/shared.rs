use core::{fmt, ops::Deref, ptr::NonNull};
use std::{rc::Rc, sync::Arc};

use super::{fast_cast::adjust, polymorphic::Polymorphic};

/// A shared owning pointer whose pointee does not move while any clone is alive.
///
/// # Safety
///
/// `deref` returns the same address for the pointer and all its clones.
pub unsafe trait Owner: Deref + Clone {}

unsafe impl<S: ?Sized> Owner for Rc<S> {}

unsafe impl<S: ?Sized> Owner for Arc<S> {}

/// A handle in the ownership group of `P` that views a `T` inside the owned value, or
/// nothing when the cast failed.
pub struct Shared<P: Owner, T> {
    owner: P,
    target: Option<NonNull<T>>,
}

impl<P: Owner, T> Shared<P, T> {
    #[inline(always)]
    pub fn get(&self) -> Option<&T> {
        self.target.map(|t| unsafe { t.as_ref() })
    }
    #[inline(always)]
    pub fn is_none(&self) -> bool {
        self.target.is_none()
    }
    #[inline(always)]
    pub fn owner(&self) -> &P {
        &self.owner
    }
    pub fn into_owner(self) -> P {
        self.owner
    }
}

impl<P: Owner, T> Shared<P, T>
where
    P::Target: Polymorphic,
{
    /// Views the same owned value as a `U`.
    pub fn cast<U: 'static>(&self) -> Shared<P, U> {
        cast_shared(&self.owner)
    }
}

impl<P: Owner, T> Clone for Shared<P, T> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            target: self.target,
        }
    }
}

impl<P: Owner, T: fmt::Debug> fmt::Debug for Shared<P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&self.get()).finish()
    }
}

unsafe impl<P: Owner + Send, T: Sync> Send for Shared<P, T> {}

unsafe impl<P: Owner + Sync, T: Sync> Sync for Shared<P, T> {}

/// Casts the value owned by `owner`. The result keeps `owner` alive, even when the cast
/// fails.
///
/// ```
/// use std::rc::Rc;
/// use fastcast_lib::{cast::cast_shared, fixture::simple::{SimpleA, SimpleB, SimpleBase}};
///
/// let owner: Rc<dyn SimpleBase> = Rc::new(SimpleB::default());
/// let b = cast_shared::<SimpleB, _>(&owner);
/// assert_eq!(b.get().map(SimpleB::method_b_only), Some(42));
/// assert_eq!(Rc::strong_count(&owner), 2);
/// ```
pub fn cast_shared<T: 'static, P: Owner>(owner: &P) -> Shared<P, T>
where
    P::Target: Polymorphic,
{
    let target = unsafe { adjust::<T, P::Target>(NonNull::from(&**owner)) };
    Shared {
        owner: owner.clone(),
        target,
    }
}
