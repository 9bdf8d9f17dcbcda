use core::{any::TypeId, ptr::NonNull};

use crate::{
    cast::{find_unique, Polymorphic},
    polymorphic,
};

pub trait BaseLike: Polymorphic {}

pub trait AnotherLike: Polymorphic {}

#[derive(Debug, Default)]
pub struct Base {
    pub id: u64,
}

#[derive(Debug, Default)]
pub struct Derived {
    pub base: Base,
}

#[derive(Debug, Default)]
pub struct AnotherBase {
    pub id: u64,
}

/// `another` sits right after `base`.
#[derive(Debug, Default)]
#[repr(C)]
pub struct Multi {
    pub base: Base,
    pub another: AnotherBase,
}

/// Two distinct `Base`s: a cast to `Base` is ambiguous.
#[derive(Debug, Default)]
pub struct Twin {
    pub left: Base,
    pub right: Base,
}

polymorphic!(Base {});
polymorphic!(Derived { base: Base });
polymorphic!(AnotherBase {});
polymorphic!(Multi {
    base: Base,
    another: AnotherBase,
});

unsafe impl Polymorphic for Twin {
    fn find(&self, target: TypeId) -> Option<NonNull<()>> {
        find_unique(
            target,
            [
                (TypeId::of::<Self>(), NonNull::from(self).cast::<()>()),
                (TypeId::of::<Base>(), NonNull::from(&self.left).cast::<()>()),
                (TypeId::of::<Base>(), NonNull::from(&self.right).cast::<()>()),
            ],
        )
    }
}

impl BaseLike for Base {}
impl BaseLike for Derived {}
impl BaseLike for Multi {}
impl BaseLike for Twin {}

impl AnotherLike for AnotherBase {}
impl AnotherLike for Multi {}
