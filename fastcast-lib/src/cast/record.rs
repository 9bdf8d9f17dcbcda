use core::ptr::NonNull;

use super::polymorphic::TypeIdentity;

/// Outcome of a conversion for one concrete type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// Byte displacement from the source address to the target address.
    Offset(isize),
    Failure,
}

impl Adjustment {
    /// Measures the oracle's `result` against the `source` address.
    pub fn between(source: *const u8, result: Option<NonNull<()>>) -> Self {
        match result {
            Some(p) => Self::Offset((p.as_ptr() as isize).wrapping_sub(source as isize)),
            None => Self::Failure,
        }
    }
    /// # Safety
    ///
    /// `source` must be the address the adjustment was measured against, or the address
    /// of another value of the same concrete type.
    #[inline(always)]
    pub unsafe fn apply<T>(self, source: *mut u8) -> Option<NonNull<T>> {
        match self {
            Self::Offset(offset) => NonNull::new(source.wrapping_offset(offset).cast()),
            Self::Failure => None,
        }
    }
}

/// Single-entry memo of the last concrete type cast through one (source, target) pair.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Record(Option<(TypeIdentity, Adjustment)>);

impl Record {
    #[inline(always)]
    pub fn is_cold(&self) -> bool {
        self.0.is_none()
    }
    #[inline(always)]
    pub fn last_seen(&self) -> Option<TypeIdentity> {
        self.0.map(|(identity, _)| identity)
    }
    /// The memoized adjustment, valid only for `identity`.
    #[inline(always)]
    pub fn lookup(&self, identity: TypeIdentity) -> Option<Adjustment> {
        match self.0 {
            Some((last, adjustment)) if last == identity => Some(adjustment),
            _ => None,
        }
    }
    #[inline(always)]
    pub fn store(&mut self, identity: TypeIdentity, adjustment: Adjustment) {
        self.0 = Some((identity, adjustment));
    }
}
