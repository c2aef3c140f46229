//! Role and status predicates plus post-login routing.
//!
//! Everything here is pure: inputs are optional so that a missing or
//! unparseable role/status from a token or query string is handled the
//! same way as an absent one.

use crate::types::{Role, UserStatus};

pub const LOGIN_PATH: &str = "/login";
pub const PENDING_APPROVAL_PATH: &str = "/pending-approval";
pub const SUSPENDED_PATH: &str = "/suspended";
pub const LANDLORD_DASHBOARD_PATH: &str = "/landlord/dashboard";
pub const BOARDER_DASHBOARD_PATH: &str = "/boarder/dashboard";
pub const ADMIN_DASHBOARD_PATH: &str = "/admin/dashboard";

pub fn is_landlord(role: Option<Role>) -> bool {
    role == Some(Role::Landlord)
}

pub fn is_boarder(role: Option<Role>) -> bool {
    role == Some(Role::Boarder)
}

pub fn is_admin(role: Option<Role>) -> bool {
    role == Some(Role::Admin)
}

pub fn is_approved(status: Option<UserStatus>) -> bool {
    status == Some(UserStatus::Approved)
}

pub fn is_pending(status: Option<UserStatus>) -> bool {
    status == Some(UserStatus::Pending)
}

pub fn is_suspended(status: Option<UserStatus>) -> bool {
    status == Some(UserStatus::Suspended)
}

pub fn can_access_landlord_dashboard(role: Option<Role>, status: Option<UserStatus>) -> bool {
    is_landlord(role) && is_approved(status)
}

pub fn can_access_boarder_portal(role: Option<Role>, status: Option<UserStatus>) -> bool {
    is_boarder(role) && !is_suspended(status)
}

/// Where a caller should land after login or when hitting a page they
/// cannot use yet.
pub fn redirect_url(role: Option<Role>, status: Option<UserStatus>) -> &'static str {
    let dashboard = match role {
        None => return LOGIN_PATH,
        Some(Role::Admin) => return ADMIN_DASHBOARD_PATH,
        Some(Role::Landlord) => LANDLORD_DASHBOARD_PATH,
        Some(Role::Boarder) => BOARDER_DASHBOARD_PATH,
    };

    match status {
        Some(UserStatus::Pending) => PENDING_APPROVAL_PATH,
        Some(UserStatus::Suspended) => SUSPENDED_PATH,
        _ => dashboard,
    }
}
