//! ```text
//!      A
//!      |
//!      B
//!     / \
//!    C   E
//!    |   |
//!    D   F
//!     \ /
//!      G
//! ```
//!
//! `B` is a shared base. A standalone `ComplexC` or `ComplexE` owns its `ComplexB`, so a
//! standalone `ComplexD` or `ComplexF` converts to `ComplexB` and `ComplexA` through it.
//! `ComplexG` holds the single `ComplexB` both branches share and declares only that one;
//! the copies inside its branch parts are not reachable from a `ComplexG`.
use crate::{cast::Polymorphic, polymorphic};

pub trait ComplexBase: Polymorphic {
    fn method(&self) -> i32;
}

#[derive(Debug, Default)]
pub struct ComplexA {
    pub id: i32,
}

#[derive(Debug, Default)]
pub struct ComplexB {
    pub a: ComplexA,
}

#[derive(Debug, Default)]
pub struct ComplexC {
    pub level: i32,
    pub b: ComplexB,
}

#[derive(Debug, Default)]
#[repr(C)]
pub struct ComplexD {
    pub level: i32,
    pub c: ComplexC,
}

#[derive(Debug, Default)]
pub struct ComplexE {
    pub level: i32,
    pub b: ComplexB,
}

#[derive(Debug, Default)]
#[repr(C)]
pub struct ComplexF {
    pub level: i32,
    pub e: ComplexE,
}

#[derive(Debug, Default)]
#[repr(C)]
pub struct ComplexG {
    pub d: ComplexD,
    pub f: ComplexF,
    pub b: ComplexB,
}

impl ComplexG {
    pub fn method_g_only(&self) -> i32 {
        self.method()
    }
}

polymorphic!(ComplexA {});
polymorphic!(ComplexB { a: ComplexA });
polymorphic!(ComplexC { b: ComplexB, b.a: ComplexA });
polymorphic!(ComplexD {
    c: ComplexC,
    c.b: ComplexB,
    c.b.a: ComplexA,
});
polymorphic!(ComplexE { b: ComplexB, b.a: ComplexA });
polymorphic!(ComplexF {
    e: ComplexE,
    e.b: ComplexB,
    e.b.a: ComplexA,
});
polymorphic!(ComplexG {
    d: ComplexD,
    d.c: ComplexC,
    f: ComplexF,
    f.e: ComplexE,
    b: ComplexB,
    b.a: ComplexA,
});

impl ComplexBase for ComplexA {
    fn method(&self) -> i32 {
        1
    }
}

impl ComplexBase for ComplexB {
    fn method(&self) -> i32 {
        2
    }
}

impl ComplexBase for ComplexC {
    fn method(&self) -> i32 {
        3
    }
}

impl ComplexBase for ComplexD {
    fn method(&self) -> i32 {
        4
    }
}

impl ComplexBase for ComplexE {
    fn method(&self) -> i32 {
        2520
    }
}

impl ComplexBase for ComplexF {
    fn method(&self) -> i32 {
        6
    }
}

impl ComplexBase for ComplexG {
    fn method(&self) -> i32 {
        1729
    }
}
