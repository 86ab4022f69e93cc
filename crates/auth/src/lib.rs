//! `almox-auth` — authentication boundary and static role policy.
//!
//! Identity is delegated to an external provider; this crate only maps the
//! authenticated user's role onto a closed set of permissions and checks them.
//! It is decoupled from storage and UI.

pub mod authorize;
pub mod identity;
pub mod permissions;
pub mod roles;
pub mod user;

pub use authorize::{AuthzError, authorize};
pub use identity::{AuthError, IdentityProvider, InMemoryIdentityProvider};
pub use permissions::Permission;
pub use roles::{Role, permissions_for};
pub use user::AuthUser;
