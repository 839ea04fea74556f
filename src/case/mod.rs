//! # Identifier Case Conversion
//!
//! String-level conversions between naming conventions:
//!
//! - [`camel_case`] - `foo_bar` → `fooBar` (or `FooBar` in PascalCase mode)
//! - [`decamelize`] - `fooBar` → `foo_bar`
//!
//! Object-level key conversion built on these lives in [`crate::keys`].

pub mod camel_case;
pub mod decamelize;

pub use camel_case::{camel_case, is_separator, CamelCaseOptions};
pub use decamelize::{decamelize, decamelize_with, DecamelizeOptions};
