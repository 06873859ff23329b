//! API middleware.

mod auth;
mod request_id;

pub use auth::{
    auth_middleware, authenticated, require_admin, require_role, require_self_or_admin, CurrentUser,
};
pub use request_id::RequestUuid;
