//! Typed identifiers.
//!
//! Every id is a `u32` newtype.  Hub, node, edge and order ids are dense
//! (they index a `Vec` directly through [`index`](NodeId::index));
//! `LocationId` is whatever the location feed supplies.  `u32::MAX` is
//! reserved as the "none" sentinel so optional links can live in plain
//! arrays.

use std::fmt;

/// Define a `u32` id newtype.  The literal is the short prefix used by
/// `Display` in logs, e.g. `n12` for node 12.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident, $prefix:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(pub u32);

        impl $name {
            /// The "none" sentinel.
            pub const INVALID: $name = $name(u32::MAX);

            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Id for a `Vec` position.  Positions never exceed `u32` in
            /// this workspace; larger values saturate to `INVALID`.
            #[inline(always)]
            pub fn from_index(i: usize) -> Self {
                $name(u32::try_from(i).unwrap_or(u32::MAX))
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }
        }

        impl Default for $name {
            /// Unset ids read as `INVALID`.
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!($prefix, "{}"), self.0)
                } else {
                    f.write_str(concat!($prefix, "?"))
                }
            }
        }
    };
}

typed_id! {
    /// External identifier of an ingested location.  Not necessarily dense.
    pub struct LocationId, "loc";
}

typed_id! {
    /// First-level hub, dense in formation order.
    pub struct HotspotId, "hs";
}

typed_id! {
    /// Second-level hub, dense after merging.
    pub struct SuperspotId, "ss";
}

typed_id! {
    /// Routing-graph node: a location, hotspot or superspot.
    pub struct NodeId, "n";
}

typed_id! {
    pub struct EdgeId, "e";
}

typed_id! {
    /// Delivery order, dense within one simulation run.
    pub struct OrderId, "o";
}
