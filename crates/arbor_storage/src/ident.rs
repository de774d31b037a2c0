//! Identity tokens for engine objects.
//!
//! Tokens come from one process-wide counter and are never reissued, so a
//! token that outlived its object can never alias a newer one. The raw
//! value `0` is reserved for "null" on the host boundary.

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

fn mint() -> NonZeroU64 {
    let raw = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
    NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN)
}

macro_rules! identity_token {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU64);

        impl $name {
            pub(crate) fn mint() -> Self {
                Self(mint())
            }

            /// Rebuilds a token from its raw value; `0` is null.
            #[must_use]
            pub fn from_raw(raw: u64) -> Option<Self> {
                NonZeroU64::new(raw).map(Self)
            }

            /// Returns the raw token value.
            #[must_use]
            pub fn as_u64(self) -> u64 {
                self.0.get()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

identity_token!(
    /// Identity of a node (folder, array, label, ...) inside an open container.
    NodeRef,
    "node"
);

identity_token!(
    /// Identity of an open container file.
    FileRef,
    "file"
);
