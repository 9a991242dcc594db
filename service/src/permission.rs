use std::fmt::Debug;

use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::ServiceError;

/// Either a backend-internal call with full access or a call on behalf of
/// an authenticated principal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Authentication<Context: Clone + PartialEq + Eq + Send + Sync + Debug + 'static> {
    Full,
    Context(Context),
}
impl<Context: Clone + Debug + PartialEq + Eq + Send + Sync + 'static> From<Context>
    for Authentication<Context>
{
    fn from(context: Context) -> Self {
        Self::Context(context)
    }
}

#[automock(type Context=();)]
#[async_trait]
pub trait PermissionService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static;

    /// Passes for `Authentication::Full` and for a context identifying the
    /// given user, fails with `Forbidden` otherwise.
    async fn verify_user_access(
        &self,
        user_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError>;
}
