use std::collections::HashMap;

use async_trait::async_trait;

use super::PlatformError;
use crate::permission::{Permission, PermissionGrant};

/// Port for checking and requesting runtime permissions.
///
/// 权限检查与申请端口。
///
/// # Behavior / 行为
/// - `check()` reports the current grant status without prompting the user.
/// - `request()` prompts the user and resolves once every permission has an answer.
///   A permission absent from the returned map counts as denied.
#[async_trait]
pub trait PermissionGatewayPort: Send + Sync {
    fn check(&self, permission: Permission) -> Result<PermissionGrant, PlatformError>;

    async fn request(
        &self,
        permissions: Vec<Permission>,
    ) -> Result<HashMap<Permission, PermissionGrant>, PlatformError>;
}
