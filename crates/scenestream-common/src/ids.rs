//! Typed integer IDs for scenes and media files.
//!
//! Records are keyed by positive SQLite row ids. Parsing is strict: anything
//! that is not a positive base-10 integer is an [`Error::InvalidInput`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

macro_rules! typed_id {
    ($($(#[doc = $doc:expr])* $name:ident => $label:literal),+ $(,)?) => {
        $(
            $(#[doc = $doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(i64);

            impl $name {
                /// Wrap a raw id, rejecting zero and negative values.
                pub fn new(raw: i64) -> Result<Self, Error> {
                    if raw > 0 {
                        Ok(Self(raw))
                    } else {
                        Err(Error::invalid_input(format!(
                            concat!("invalid ", $label, " id: {}"),
                            raw
                        )))
                    }
                }

                /// Return the raw integer value.
                #[must_use]
                pub fn get(&self) -> i64 {
                    self.0
                }

                /// Whether the id is a usable row id.
                ///
                /// Ids built through [`Self::new`] or parsing are always valid;
                /// values deserialized from untrusted JSON may not be.
                #[must_use]
                pub fn is_valid(&self) -> bool {
                    self.0 > 0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl FromStr for $name {
                type Err = Error;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    let raw: i64 = s.trim().parse().map_err(|_| {
                        Error::invalid_input(format!(concat!("invalid ", $label, " id: {:?}"), s))
                    })?;
                    Self::new(raw)
                }
            }

            impl From<$name> for i64 {
                fn from(id: $name) -> Self {
                    id.0
                }
            }
        )+
    };
}

typed_id! {
    /// Unique identifier for a scene.
    SceneId => "scene",
    /// Unique identifier for a media file.
    MediaFileId => "media file",
}
