//! Shared types for DRY compliance.

mod pagination;
mod response;

pub use pagination::{Page, Paginated, PaginationMeta, PaginationParams};
pub use response::{ApiResponse, Created, NoContent};
