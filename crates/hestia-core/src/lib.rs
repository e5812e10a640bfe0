//! # Hestia Core
//!
//! Core types for the Hestia item service.
//!
//! This crate owns all item state and the error vocabulary shared by the
//! other Hestia crates:
//!
//! - [`ItemRepository`] - Ordered in-memory store of items
//! - [`IdGenerator`] / [`ItemId`] - Strictly increasing item identifiers
//! - [`Item`] / [`ItemDraft`] - Stored records and candidate field sets
//! - [`HestiaError`] - Errors crossing the HTTP handler boundary
//! - [`RequestContext`] - Per-request state handed to handlers
//!
//! # Example
//!
//! ```
//! use hestia_core::{ItemDraft, ItemRepository};
//!
//! let repo = ItemRepository::new();
//! let item = repo.create(ItemDraft::new("Lamp", None, 19.5));
//! assert_eq!(item.id.get(), 1);
//! assert_eq!(repo.list(), vec![item]);
//! ```

#![doc(html_root_url = "https://docs.rs/hestia-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod id;
mod item;
mod repository;

pub use context::{RequestContext, RequestId};
pub use error::{ErrorBody, ErrorCategory, ErrorDetail, FieldError, FieldErrors, HestiaError, HestiaResult};
pub use id::{IdGenerator, ItemId};
pub use item::{Item, ItemDraft};
pub use repository::{ItemRepository, RepositoryError, RepositoryResult};
