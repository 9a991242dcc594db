use async_trait::async_trait;
use service::permission::{Authentication, PermissionService};
use service::ServiceError;
use uuid::Uuid;

/// Permission check for a user-owned data model: a principal may only touch
/// their own data, backend-internal calls pass with `Authentication::Full`.
pub struct OwnerPermissionServiceImpl;

#[async_trait]
impl PermissionService for OwnerPermissionServiceImpl {
    type Context = Uuid;

    async fn verify_user_access(
        &self,
        user_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError> {
        match context {
            Authentication::Full => Ok(()),
            Authentication::Context(principal) if principal == user_id => Ok(()),
            Authentication::Context(_) => Err(ServiceError::Forbidden),
        }
    }
}
