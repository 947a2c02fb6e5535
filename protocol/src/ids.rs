use std::fmt;

use serde::Deserialize;
use serde::Serialize;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            pub fn get(self) -> $inner {
                self.0
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Caller-visible id of one logical search. Allocated once, never reused.
    SearchRequestId(u64)
);

id_type!(
    /// Id the search provider assigns to a single dispatched query. Only
    /// unique while the query is pending.
    BackendCorrelationId(u64)
);

id_type!(
    /// Caller-visible id of one thumbnail request.
    ArtRequestId(u64)
);

id_type!(
    /// Id the image subsystem assigns to one fetch. Shared with every other
    /// consumer of that subsystem.
    LoaderId(u64)
);
