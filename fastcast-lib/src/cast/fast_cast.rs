use core::{
    any::TypeId,
    ptr::{null, null_mut, NonNull},
};

use super::{cache, error::BadCast, polymorphic::Polymorphic, record::Adjustment};

/// # Safety
///
/// `source` points to a live `S`.
#[inline(always)]
pub(crate) unsafe fn adjust<T: 'static, S: ?Sized + Polymorphic>(
    source: NonNull<S>,
) -> Option<NonNull<T>> {
    if TypeId::of::<S>() == TypeId::of::<T>() {
        return Some(source.cast());
    }
    let s = source.as_ref();
    let base = source.as_ptr().cast::<u8>();
    cache::resolve::<S, T>(s.type_identity(), || {
        Adjustment::between(base, s.find(TypeId::of::<T>()))
    })
    .apply(base)
}

/// Casts a possibly-null pointer. Null and failed casts give null.
///
/// # Safety
///
/// A non-null `ptr` points to a live `S`.
///
/// ```
/// use fastcast_lib::{cast::cast_ptr, fixture::simple::{SimpleA, SimpleB, SimpleBase}};
///
/// let p: *const dyn SimpleBase = core::ptr::null::<SimpleA>();
/// assert!(unsafe { cast_ptr::<SimpleB, _>(p) }.is_null());
/// ```
#[inline(always)]
pub unsafe fn cast_ptr<T: 'static, S: ?Sized + Polymorphic>(ptr: *const S) -> *const T {
    match NonNull::new(ptr.cast_mut()) {
        Some(p) => adjust::<T, S>(p).map_or(null(), |t| t.as_ptr().cast_const()),
        None => null(),
    }
}

/// # Safety
///
/// A non-null `ptr` points to a live `S`.
#[inline(always)]
pub unsafe fn cast_ptr_mut<T: 'static, S: ?Sized + Polymorphic>(ptr: *mut S) -> *mut T {
    match NonNull::new(ptr) {
        Some(p) => adjust::<T, S>(p).map_or(null_mut(), |t| t.as_ptr()),
        None => null_mut(),
    }
}

/// Cached checked casts. Implemented for every [`Polymorphic`] type, `dyn` views included.
///
/// A shared view never yields a mutable target:
///
/// ```compile_fail
/// use fastcast_lib::{cast::FastCast, fixture::simple::{SimpleB, SimpleBase}};
///
/// fn f(a: &dyn SimpleBase) -> &mut SimpleB {
///     a.cast_mut().unwrap()
/// }
/// ```
///
/// The source has to be [`Polymorphic`]:
///
/// ```compile_fail
/// use fastcast_lib::cast::FastCast;
///
/// struct Plain(u32);
/// let _ = Plain(1).cast::<u32>();
/// ```
pub trait FastCast: Polymorphic {
    /// `None` if the concrete type does not convert to `T`.
    ///
    /// The first call for a pair of types runs the full search even when `Self` is concrete
    /// and the conversion is known at compile time. Use [`Upcast`](super::Upcast) for those
    /// projections: it reads the field directly and leaves the cache alone.
    fn cast<T: 'static>(&self) -> Option<&T>;
    fn cast_mut<T: 'static>(&mut self) -> Option<&mut T>;
    /// Like [`FastCast::cast`], but a failure is a [`BadCast`].
    fn try_ref<T: 'static>(&self) -> Result<&T, BadCast>;
    fn try_mut<T: 'static>(&mut self) -> Result<&mut T, BadCast>;
}

impl<S: ?Sized + Polymorphic> FastCast for S {
    #[inline(always)]
    fn cast<T: 'static>(&self) -> Option<&T> {
        unsafe { adjust::<T, S>(NonNull::from(self)).map(|t| t.as_ref()) }
    }
    #[inline(always)]
    fn cast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        unsafe { adjust::<T, S>(NonNull::from(self)).map(|mut t| t.as_mut()) }
    }
    #[inline(always)]
    fn try_ref<T: 'static>(&self) -> Result<&T, BadCast> {
        self.cast().ok_or_else(|| BadCast::new::<T, S>(self))
    }
    #[inline(always)]
    fn try_mut<T: 'static>(&mut self) -> Result<&mut T, BadCast> {
        let error = BadCast::new::<T, S>(self);
        self.cast_mut().ok_or(error)
    }
}

#[cfg(test)]
mod test {
    use core::ptr::{self, null, null_mut};

    use wasm_bindgen_test::wasm_bindgen_test;

    use crate::{
        cast::{
            cache::{len, peek, stats},
            oracle_cast,
            record::Adjustment,
        },
        fixture::{
            complex::{ComplexA, ComplexB, ComplexBase, ComplexC, ComplexD, ComplexE, ComplexF, ComplexG},
            fresh,
            multi::{AnotherBase, AnotherLike, Base, BaseLike, Derived, Multi, Twin},
            probe::{oracle_calls, ProbeTarget, ProbeX, ProbeY, ProbeZ, Probed},
            simple::{SimpleA, SimpleB, SimpleBase},
        },
    };

    use super::*;

    /// Same verdict and same target address as the oracle.
    fn agrees<T: 'static, S: ?Sized + Polymorphic>(s: &S) -> bool {
        match (s.cast::<T>(), oracle_cast::<T, S>(s)) {
            (Some(fast), Some(slow)) => ptr::eq(fast, slow),
            (None, None) => true,
            _ => false,
        }
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_simple() {
        let b = SimpleB::default();
        let a: &dyn SimpleBase = &b;
        assert_eq!(a.try_ref::<SimpleB>().unwrap().method_b_only(), 42);
        assert_eq!(a.try_ref::<SimpleB>().unwrap().method_b_only(), 42);
        assert!(ptr::eq(a.cast::<SimpleA>().unwrap(), &b.a));
        assert!(agrees::<SimpleB, _>(a));
        assert!(agrees::<SimpleA, _>(a));
        assert_eq!(a.name(), "B");
        assert_eq!(a.cast::<SimpleA>().map(|s| s.name()), Some("A"));
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_simple_failure() {
        let a = SimpleA::default();
        let base: &dyn SimpleBase = &a;
        assert!(base.cast::<SimpleB>().is_none());
        let e = base.try_ref::<SimpleB>().unwrap_err();
        assert!(e.concrete.ends_with("SimpleA"));
        assert!(agrees::<SimpleB, _>(base));
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_null() {
        let p: *const dyn SimpleBase = null::<SimpleB>();
        assert!(unsafe { cast_ptr::<SimpleB, _>(p) }.is_null());
        let p: *mut dyn ComplexBase = null_mut::<ComplexG>();
        assert!(unsafe { cast_ptr_mut::<ComplexG, _>(p) }.is_null());
    }

    #[test]
    fn test_null_has_no_cache_interaction() {
        fresh(|| {
            let before = stats();
            let p: *const dyn ComplexBase = null::<ComplexG>();
            assert!(unsafe { cast_ptr::<ComplexF, _>(p) }.is_null());
            assert_eq!(stats(), before);
            assert_eq!(len(), 0);
        });
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_ptr() {
        let mut g = ComplexG::default();
        let p: *mut dyn ComplexBase = &mut g;
        let f = unsafe { cast_ptr_mut::<ComplexF, _>(p) };
        assert!(ptr::eq(f, &g.f));
        let c = unsafe { cast_ptr::<ComplexC, _>(p.cast_const()) };
        assert!(ptr::eq(c, &g.d.c));
        let e = ComplexE::default();
        let p: *const dyn ComplexBase = &e;
        assert!(unsafe { cast_ptr::<ComplexG, _>(p) }.is_null());
    }

    #[test]
    fn test_identity() {
        fresh(|| {
            let x = ProbeX::default();
            let before = oracle_calls();
            assert!(ptr::eq(x.cast::<ProbeX>().unwrap(), &x));
            let d: &dyn Probed = &x;
            assert!(ptr::eq(
                unsafe { cast_ptr::<ProbeX, ProbeX>(&x) },
                d.cast::<ProbeX>().unwrap()
            ));
            assert_eq!(oracle_calls(), before + 1);
            // only the `dyn Probed -> ProbeX` pair got a record
            assert_eq!(len(), 1);
            assert!(peek::<ProbeX, ProbeX>().is_cold());
        });
    }

    #[test]
    fn test_warm_hit() {
        fresh(|| {
            let x = ProbeX::default();
            let d: &dyn Probed = &x;
            for _ in 0..10 {
                assert!(ptr::eq(d.cast::<ProbeTarget>().unwrap(), &x.target));
            }
            assert_eq!(oracle_calls(), 1);
            assert_eq!(stats().misses, 1);
            assert_eq!(stats().hits, 9);
        });
    }

    #[test]
    fn test_failure_memoization() {
        fresh(|| {
            let y = ProbeY::default();
            let d: &dyn Probed = &y;
            assert!(d.cast::<ProbeTarget>().is_none());
            assert!(d.try_ref::<ProbeTarget>().is_err());
            assert_eq!(oracle_calls(), 1);
            assert_eq!(
                peek::<dyn Probed, ProbeTarget>().lookup(y.type_identity()),
                Some(Adjustment::Failure)
            );
            // a failure for `ProbeY` does not hide a success for `ProbeX`
            let x = ProbeX::default();
            let d: &dyn Probed = &x;
            assert!(ptr::eq(d.cast::<ProbeTarget>().unwrap(), &x.target));
            assert_eq!(oracle_calls(), 2);
        });
    }

    #[test]
    fn test_type_change() {
        fresh(|| {
            let x = ProbeX::default();
            let y = ProbeY::default();
            let z = ProbeZ::default();
            let values: [&dyn Probed; 5] = [&x, &z, &y, &z, &x];
            for d in values {
                assert!(agrees::<ProbeTarget, _>(d));
            }
            // every switch of concrete type is a cold miss
            assert_eq!(stats().misses, 5);
            assert_eq!(stats().hits, 0);
            assert!(ptr::eq(values[0].cast::<ProbeTarget>().unwrap(), &x.target));
            assert!(ptr::eq(values[1].cast::<ProbeTarget>().unwrap(), &z.target));
        });
    }

    #[test]
    fn test_same_type_other_value() {
        fresh(|| {
            let first = ProbeX::default();
            let second = ProbeX::default();
            let d: &dyn Probed = &first;
            assert!(ptr::eq(d.cast::<ProbeTarget>().unwrap(), &first.target));
            let d: &dyn Probed = &second;
            assert!(ptr::eq(d.cast::<ProbeTarget>().unwrap(), &second.target));
            assert_eq!(oracle_calls(), 1);
        });
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_complex() {
        let g = ComplexG::default();
        let a: &dyn ComplexBase = &g;
        for _ in 0..2 {
            let fg = a.try_ref::<ComplexG>().unwrap();
            assert_eq!(fg.method_g_only(), 1729);
            assert!(ptr::eq(fg, oracle_cast::<ComplexG, _>(a).unwrap()));
        }
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_cross_cast() {
        let g = ComplexG::default();
        let a: &dyn ComplexBase = &g;
        for _ in 0..2 {
            let f = a.cast::<ComplexF>().unwrap();
            assert_eq!(f.method(), oracle_cast::<ComplexF, _>(a).unwrap().method());
            assert!(agrees::<ComplexF, _>(a));
            assert!(agrees::<ComplexE, _>(a));
            assert!(agrees::<ComplexD, _>(a));
            assert!(agrees::<ComplexC, _>(a));
            assert!(agrees::<ComplexB, _>(a));
            assert!(agrees::<ComplexA, _>(a));
        }
        assert_eq!(a.cast::<ComplexE>().unwrap().method(), 2520);
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_complex_mixed_sources() {
        let g = ComplexG::default();
        let d = ComplexD::default();
        let f = ComplexF::default();
        let b = ComplexB::default();
        let values: [&dyn ComplexBase; 4] = [&g, &d, &f, &b];
        for _ in 0..2 {
            for v in values {
                assert!(agrees::<ComplexG, _>(v));
                assert!(agrees::<ComplexF, _>(v));
                assert!(agrees::<ComplexC, _>(v));
                assert!(agrees::<ComplexB, _>(v));
                assert!(agrees::<ComplexA, _>(v));
            }
        }
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_branch_shared_base() {
        let f = ComplexF::default();
        let d = ComplexD::default();
        for _ in 0..2 {
            let a: &dyn ComplexBase = &f;
            let b = a.cast::<ComplexB>().unwrap();
            assert!(ptr::eq(b, &f.e.b));
            assert!(ptr::eq(b, oracle_cast::<ComplexB, _>(a).unwrap()));
            assert_eq!(b.method(), 2);
            let a: &dyn ComplexBase = &d;
            let base = a.cast::<ComplexA>().unwrap();
            assert!(ptr::eq(base, &d.c.b.a));
            assert!(ptr::eq(base, oracle_cast::<ComplexA, _>(a).unwrap()));
        }
        let g = ComplexG::default();
        let a: &dyn ComplexBase = &g;
        assert!(ptr::eq(a.cast::<ComplexB>().unwrap(), &g.b));
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_multi() {
        let m = Multi::default();
        let another: &dyn AnotherLike = &m;
        for _ in 0..2 {
            assert!(ptr::eq(another.cast::<Base>().unwrap(), &m.base));
            assert!(ptr::eq(another.cast::<Multi>().unwrap(), &m));
            assert!(agrees::<Base, _>(another));
        }
        let base: &dyn BaseLike = &m;
        assert!(ptr::eq(base.cast::<AnotherBase>().unwrap(), &m.another));
        let derived = Derived::default();
        let base: &dyn BaseLike = &derived;
        assert!(base.cast::<AnotherBase>().is_none());
        assert!(agrees::<AnotherBase, _>(base));
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_ambiguous() {
        let t = Twin::default();
        let base: &dyn BaseLike = &t;
        assert!(base.cast::<Base>().is_none());
        assert!(base.cast::<Base>().is_none());
        assert!(agrees::<Base, _>(base));
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_mut() {
        let mut m = Multi::default();
        {
            let another: &mut dyn AnotherLike = &mut m;
            another.try_mut::<Base>().unwrap().id = 5;
            another.cast_mut::<AnotherBase>().unwrap().id = 6;
            assert!(another.try_mut::<Derived>().is_err());
        }
        assert_eq!(m.base.id, 5);
        assert_eq!(m.another.id, 6);
    }

    #[test]
    fn test_thread_isolation() {
        let run = |x_first: bool| {
            move || {
                let x = ProbeX::default();
                let y = ProbeY::default();
                let d: &dyn Probed = if x_first { &x } else { &y };
                let expected = oracle_cast::<ProbeTarget, _>(d).map(|t| t as *const ProbeTarget);
                for _ in 0..1000 {
                    assert_eq!(d.cast::<ProbeTarget>().map(|t| t as *const ProbeTarget), expected);
                }
                // one for `expected`, one cold miss
                assert_eq!(oracle_calls(), 2);
                assert_eq!(
                    peek::<dyn Probed, ProbeTarget>().last_seen(),
                    Some(d.type_identity())
                );
            }
        };
        std::thread::scope(|s| {
            let handles = [
                s.spawn(run(true)),
                s.spawn(run(false)),
                s.spawn(run(true)),
                s.spawn(run(false)),
            ];
            for h in handles {
                h.join().unwrap();
            }
        });
    }
}
