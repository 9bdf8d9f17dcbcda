//! Types whose oracle counts its calls on the current thread.
use core::{any::TypeId, cell::Cell, ptr::NonNull};

use crate::cast::{find_unique, Polymorphic};

thread_local! {
    static ORACLE_CALLS: Cell<usize> = const { Cell::new(0) };
}

pub fn oracle_calls() -> usize {
    ORACLE_CALLS.with(|c| c.get())
}

fn counted(
    target: TypeId,
    candidates: impl IntoIterator<Item = (TypeId, NonNull<()>)>,
) -> Option<NonNull<()>> {
    ORACLE_CALLS.with(|c| c.set(c.get() + 1));
    find_unique(target, candidates)
}

pub trait Probed: Polymorphic {}

#[derive(Debug, Default)]
pub struct ProbeTarget {
    pub value: u32,
}

/// Converts to `ProbeTarget` at a non-zero offset.
#[derive(Debug, Default)]
#[repr(C)]
pub struct ProbeX {
    pub pad: u64,
    pub target: ProbeTarget,
}

/// Does not convert to `ProbeTarget`.
#[derive(Debug, Default)]
pub struct ProbeY {
    pub value: u32,
}

/// Converts to `ProbeTarget` at offset zero.
#[derive(Debug, Default)]
#[repr(C)]
pub struct ProbeZ {
    pub target: ProbeTarget,
    pub pad: u64,
}

unsafe impl Polymorphic for ProbeTarget {}

unsafe impl Polymorphic for ProbeX {
    fn find(&self, target: TypeId) -> Option<NonNull<()>> {
        counted(
            target,
            [
                (TypeId::of::<Self>(), NonNull::from(self).cast::<()>()),
                (TypeId::of::<ProbeTarget>(), NonNull::from(&self.target).cast::<()>()),
            ],
        )
    }
}

unsafe impl Polymorphic for ProbeY {
    fn find(&self, target: TypeId) -> Option<NonNull<()>> {
        counted(target, [(TypeId::of::<Self>(), NonNull::from(self).cast::<()>())])
    }
}

unsafe impl Polymorphic for ProbeZ {
    fn find(&self, target: TypeId) -> Option<NonNull<()>> {
        counted(
            target,
            [
                (TypeId::of::<Self>(), NonNull::from(self).cast::<()>()),
                (TypeId::of::<ProbeTarget>(), NonNull::from(&self.target).cast::<()>()),
            ],
        )
    }
}

impl Probed for ProbeX {}
impl Probed for ProbeY {}
impl Probed for ProbeZ {}
