//! ```text
//! A
//! |
//! B
//! ```
use crate::{cast::Polymorphic, polymorphic};

pub trait SimpleBase: Polymorphic {
    fn name(&self) -> &'static str;
}

#[derive(Debug, Default)]
pub struct SimpleA {
    pub id: u32,
}

#[derive(Debug, Default)]
pub struct SimpleB {
    pub a: SimpleA,
    pub extra: u32,
}

impl SimpleB {
    pub fn method_b_only(&self) -> i32 {
        42
    }
}

polymorphic!(SimpleA {});
polymorphic!(SimpleB { a: SimpleA });

impl SimpleBase for SimpleA {
    fn name(&self) -> &'static str {
        "A"
    }
}

impl SimpleBase for SimpleB {
    fn name(&self) -> &'static str {
        "B"
    }
}
