pub mod cache;
mod error;
mod fast_cast;
mod polymorphic;
mod record;
mod shared;
mod upcast;

pub use self::error::BadCast;
pub use self::fast_cast::{cast_ptr, cast_ptr_mut, FastCast};
pub use self::polymorphic::{find_unique, oracle_cast, Polymorphic, TypeIdentity};
pub use self::record::{Adjustment, Record};
pub use self::shared::{cast_shared, Owner, Shared};
pub use self::upcast::Upcast;
