//! Role names understood by the permission store.
//!
//! Role names are lowercase. [`OWNER`] is never assigned to a viewer; it is
//! added for the duration of one permission check when the viewer owns the
//! candidate record.

pub const ADMIN: &str = "admin";
pub const MEMBER: &str = "member";
pub const OWNER: &str = "owner";
pub const GUEST: &str = "guest";
