//! Strongly typed, zero-cost index wrappers.
//!
//! All ids are `Copy + Ord + Hash` so they can key maps and sort cheaply.
//! The inner integer is `pub` for direct indexing into per-intersection
//! `Vec`s, but callers should prefer `.index()`.

use std::fmt;

/// Generate a typed index wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid index".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Slot of a signal-controlled intersection in the control arena.
    ///
    /// Assigned in registration order; stable for the lifetime of a run.
    pub struct IntersectionId(u32);
}

typed_id! {
    /// Discrete state produced by the state encoder (row of a Q-table).
    pub struct StateIndex(u32);
}

typed_id! {
    /// Discrete action chosen by a Q-learning agent (column of a Q-table).
    pub struct ActionIndex(u16);
}
