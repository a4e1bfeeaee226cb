// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Paginated listings of key versions.
//!
//! Listings are deliberately weaker than point reads: each page is read
//! consistently, but writes committed between two page fetches may or may not
//! show up on later pages. The first page reports the store's global version,
//! read before any key, as a lower bound for everything the listing returns.
//!
//! Pages are ordered by key bytes and resumed through an opaque
//! [`ListingCursor`] token. A listing is finished exactly when a page comes
//! back without a token.

mod cursor;
mod error;
mod pager;

pub use cursor::ListingCursor;
pub use error::ListingError;
pub use pager::{KeyVersionPage, Paginator};
