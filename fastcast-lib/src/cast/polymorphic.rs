use core::{any::TypeId, ptr::NonNull};

/// Identity of the concrete (most-derived) type of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct TypeIdentity(TypeId);

impl TypeIdentity {
    #[inline(always)]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(TypeId::of::<T>())
    }
}

/// A value that can be checked-cast to the types embedded in it.
///
/// # Safety
///
/// - `find(target)` returns either `None` or a pointer to a live value of the type whose
///   `TypeId` is `target`, located inside `self` (or `self` itself).
/// - `type_identity` keeps its default implementation.
pub unsafe trait Polymorphic: 'static {
    /// Read through the vtable, so a `dyn` view reports the concrete type.
    #[inline(always)]
    fn type_identity(&self) -> TypeIdentity {
        TypeIdentity::of::<Self>()
    }
    fn type_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
    /// The authoritative conversion. The default only knows `Self`.
    fn find(&self, target: TypeId) -> Option<NonNull<()>> {
        if target == TypeId::of::<Self>() {
            Some(NonNull::from(self).cast())
        } else {
            None
        }
    }
}

/// Picks the sub-object of type `target`.
///
/// No candidate, or two candidates at different addresses, is a failure. Candidates at the
/// same address are one sub-object reached by several paths.
pub fn find_unique(
    target: TypeId,
    candidates: impl IntoIterator<Item = (TypeId, NonNull<()>)>,
) -> Option<NonNull<()>> {
    let mut result = None;
    for (id, p) in candidates {
        if id != target {
            continue;
        }
        match result {
            None => result = Some(p),
            Some(r) if r == p => {}
            Some(_) => return None,
        }
    }
    result
}

/// Uncached conversion, straight from the oracle.
pub fn oracle_cast<T: 'static, S: ?Sized + Polymorphic>(s: &S) -> Option<&T> {
    s.find(TypeId::of::<T>())
        .map(|p| unsafe { p.cast::<T>().as_ref() })
}

/// Implements [`Polymorphic`](crate::cast::Polymorphic) for a type from the paths of its
/// embedded bases, and [`Upcast`](crate::cast::Upcast) for each of them.
///
/// ```
/// use fastcast_lib::{cast::{FastCast, Upcast}, polymorphic};
///
/// struct Wheel(u8);
/// struct Car { front: Wheel }
///
/// polymorphic!(Wheel {});
/// polymorphic!(Car { front: Wheel });
///
/// let car = Car { front: Wheel(7) };
/// assert_eq!(car.cast::<Wheel>().map(|w| w.0), Some(7));
/// assert_eq!(car.upcast().0, 7);
/// ```
///
/// Two bases of the same type would make the upcast ambiguous:
///
/// ```compile_fail
/// use fastcast_lib::polymorphic;
///
/// struct Wheel(u8);
/// struct Bike { front: Wheel, back: Wheel }
///
/// polymorphic!(Wheel {});
/// polymorphic!(Bike { front: Wheel, back: Wheel });
/// ```
#[macro_export]
macro_rules! polymorphic {
    ($ty:ty { $($($field:ident).+ : $base:ty),* $(,)? }) => {
        unsafe impl $crate::cast::Polymorphic for $ty {
            fn find(
                &self,
                target: ::core::any::TypeId,
            ) -> ::core::option::Option<::core::ptr::NonNull<()>> {
                $crate::cast::find_unique(
                    target,
                    [
                        (
                            ::core::any::TypeId::of::<Self>(),
                            ::core::ptr::NonNull::from(self).cast::<()>(),
                        )
                        $(, {
                            let base: &$base = &self.$($field).+;
                            (
                                ::core::any::TypeId::of::<$base>(),
                                ::core::ptr::NonNull::from(base).cast::<()>(),
                            )
                        })*
                    ],
                )
            }
        }
        $(
            impl $crate::cast::Upcast<$base> for $ty {
                #[inline(always)]
                fn upcast(&self) -> &$base {
                    &self.$($field).+
                }
                #[inline(always)]
                fn upcast_mut(&mut self) -> &mut $base {
                    &mut self.$($field).+
                }
            }
        )*
    };
}
