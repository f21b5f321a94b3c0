//! ISBN-10 / ISBN-13 validation, conversion and decomposition.
//!
//! Numbers are split into GS1 prefix, registration group, registrant code,
//! publication item and check digit using the ISBN agency's Range Message.
//! The range table is loaded once and shared explicitly:
//!
//! ```ignore
//! use std::sync::Arc;
//! use bibliogenius_isbn::{Isbn, PartsWidth, RangeTable};
//!
//! let table = Arc::new(RangeTable::load("RangeMessage.xml")?);
//! let isbn = Isbn::new("978-1-4027-8059-2", Arc::clone(&table));
//! assert_eq!(isbn.with_dashes(), "978-1-4027-8059-2");
//! assert_eq!(isbn.isbn10(), Some("1402780591"));
//! ```

pub mod config;
pub mod domain;
pub mod isbn;
pub mod modules;
pub mod ranges;

pub use domain::RangeTableError;
pub use isbn::{Isbn, IsbnKind, PartsWidth, PublicationRange};
pub use modules::scanner;
pub use ranges::{RangeRule, RangeTable, RegistrationGroup};
