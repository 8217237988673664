//! Scenestream-Common: shared identifiers and error handling.
//!
//! - **Typed IDs**: integer newtypes for scenes and media files with strict
//!   parsing (malformed identifiers are rejected, never defaulted)
//! - **Error Handling**: the error kinds every scenestream crate reports
//!
//! # Examples
//!
//! ```
//! use scenestream_common::{Error, SceneId};
//!
//! let id: SceneId = "42".parse().unwrap();
//! assert_eq!(id.get(), 42);
//!
//! let err = "abc".parse::<SceneId>().unwrap_err();
//! assert!(matches!(err, Error::InvalidInput(_)));
//! ```

pub mod error;
pub mod ids;

pub use error::{Error, Result};
pub use ids::*;
