pub use crate::collections::{DynArr, ReserveHint, make_reserve_hint};
pub use crate::dynarr;
