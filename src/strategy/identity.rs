//! # Request Identity
//!
//! The acting user of a request and originating identity stamping.

use super::LifecycleObject;
use crate::crd::UserInfo;

/// Per-request context handed to the strategy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Authenticated user, absent for anonymous or internal requests
    pub user: Option<UserInfo>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user: UserInfo) -> Self {
        Self { user: Some(user) }
    }

    /// The current user, if any
    pub fn current_user(&self) -> Option<&UserInfo> {
        self.user.as_ref()
    }
}

/// Overwrite `spec.userInfo` with the acting user
///
/// Any caller-supplied value is dropped first, so an anonymous request leaves
/// the field empty.
pub(crate) fn stamp_user_info<K: LifecycleObject>(obj: &mut K, ctx: &RequestContext) {
    obj.set_user_info(ctx.current_user().cloned());
}
