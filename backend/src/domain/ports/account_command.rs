//! Driving port for account administration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Account, Error, Principal, Role};

/// Raw account creation payload; validated by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewAccountRequest {
    #[schema(example = "student8")]
    pub username: String,
    #[schema(example = "studentpass")]
    pub password: String,
    pub role: Role,
}

/// Account administration use-cases.
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account and its role profile. Admins only.
    async fn create_account(
        &self,
        principal: Principal,
        request: NewAccountRequest,
    ) -> Result<Account, Error>;
}
