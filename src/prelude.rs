//! Convenient re-exports for common usage.
//!
//! ```
//! use lww_element_dict::prelude::*;
//! ```

pub use crate::Crdt;
pub use crate::DeltaCrdt;
pub use crate::DictOp;
pub use crate::events::OpCrdt;
pub use crate::LWWElementDict;
#[cfg(feature = "std")]
pub use crate::SharedDict;
