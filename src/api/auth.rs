//! Caller identity for the HTTP API.
//!
//! The engine keeps no sessions. Each request names its caller in the
//! `x-user-id` and `x-user-role` headers, and handlers receive the result as
//! an [`AuthContext`] extractor.

use std::fmt;
use std::str::FromStr;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};

use super::response::ApiErrorResponse;

/// Header carrying the caller's user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the caller's role.
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// The role a caller acts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Institute staff with review and payroll rights.
    Admin,
    /// A member of staff.
    Employee,
    /// An enrolled student or intern.
    Student,
    /// An external client.
    Client,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "EMPLOYEE" => Ok(Role::Employee),
            "STUDENT" => Ok(Role::Student),
            "CLIENT" => Ok(Role::Client),
            _ => Err(format!("unknown role '{}'", s)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "ADMIN",
            Role::Employee => "EMPLOYEE",
            Role::Student => "STUDENT",
            Role::Client => "CLIENT",
        };
        f.write_str(name)
    }
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// The caller's user id.
    pub user_id: String,
    /// The caller's role.
    pub role: Role,
}

impl AuthContext {
    /// Returns true if the caller is an admin.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fails with 403 unless the caller is an admin.
    pub fn require_admin(&self) -> Result<(), ApiErrorResponse> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiErrorResponse::forbidden("Admin only"))
        }
    }

    /// Fails with 403 unless the caller holds one of `roles`.
    pub fn require_role(&self, roles: &[Role]) -> Result<(), ApiErrorResponse> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(ApiErrorResponse::forbidden(format!(
                "Role {} may not perform this action",
                self.role
            )))
        }
    }

    /// Fails with 403 unless the caller is `user_id` or an admin.
    pub fn require_self_or_admin(&self, user_id: &str) -> Result<(), ApiErrorResponse> {
        if self.is_admin() || self.user_id == user_id {
            Ok(())
        } else {
            Err(ApiErrorResponse::forbidden(format!(
                "Records of '{}' are not accessible to '{}'",
                user_id, self.user_id
            )))
        }
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header_value(parts, USER_ID_HEADER)
            .ok_or_else(|| ApiErrorResponse::unauthorized("Missing x-user-id header"))?;
        let role = header_value(parts, USER_ROLE_HEADER)
            .ok_or_else(|| ApiErrorResponse::unauthorized("Missing x-user-role header"))?
            .parse::<Role>()
            .map_err(ApiErrorResponse::unauthorized)?;

        Ok(AuthContext {
            user_id: user_id.to_string(),
            role,
        })
    }
}
