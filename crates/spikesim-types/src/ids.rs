//! Type-safe identifier wrappers around plain integers.
//!
//! Spike ids are assigned by the store (monotone rowids), so the inner
//! value is an integer rather than an app-generated UUID. The newtype
//! wrappers exist to prevent accidental mixing of identifiers at
//! compile time -- a [`NeuronId`] is not a [`SpikeId`] even though both
//! are small integers on the wire.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around an integer with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty)
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub $inner);

        impl $name {
            /// Wrap a raw integer value.
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Return the inner integer value.
            pub const fn into_inner(self) -> $inner {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a spike event.
    ///
    /// Assigned by the store on append; strictly increasing in
    /// insertion order and never reused.
    SpikeId(i64)
}

define_id! {
    /// Identifier of an emitting neuron.
    ///
    /// Always in `[1, neuron_count]` for the configured neuron count.
    NeuronId(u32)
}
