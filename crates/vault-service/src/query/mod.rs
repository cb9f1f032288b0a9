//! Tree/query projection: scoped listings, global search, and sorting.
//!
//! Everything here is pure and works on whatever folder and file sets the
//! caller holds, whether read from the catalog or from a realtime
//! projection.

pub mod listing;
pub mod search;
pub mod sort;

pub use listing::{Entry, Listing, ListingMode, build_listing};
pub use search::{is_search_query, search};
pub use sort::{sort_files, sort_folders};
