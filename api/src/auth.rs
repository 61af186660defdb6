use poem::http::StatusCode;
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumString};

/// Header carrying the caller id, set by the upstream identity provider
pub const USER_ID_HEADER: &str = "X-User-Id";
/// Header carrying the caller role, set by the upstream identity provider
pub const USER_ROLE_HEADER: &str = "X-User-Role";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    #[default]
    Seeker,
    Owner,
    Admin,
}

/// Caller identity as asserted by the gateway in front of this service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: String,
    pub role: Role,
}

/// Authentication error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    MissingHeader(String),
    InvalidRole(String),
    Forbidden(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthError::MissingHeader(h) => write!(f, "Missing required header: {}", h),
            AuthError::InvalidRole(role) => {
                write!(f, "Unknown {} value: {}", USER_ROLE_HEADER, role)
            }
            AuthError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader(_) | AuthError::InvalidRole(_) => "UNAUTHORIZED",
            AuthError::Forbidden(_) => "FORBIDDEN",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingHeader(_) | AuthError::InvalidRole(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl CallerIdentity {
    /// Builds the identity from gateway headers. A missing role means seeker.
    pub fn from_headers(user_id: Option<&str>, role: Option<&str>) -> Result<Self, AuthError> {
        let user_id = user_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AuthError::MissingHeader(USER_ID_HEADER.to_string()))?;

        let role = match role.map(str::trim).filter(|r| !r.is_empty()) {
            Some(r) => Role::from_str(r).map_err(|_| AuthError::InvalidRole(r.to_string()))?,
            None => Role::default(),
        };

        Ok(Self {
            user_id: user_id.to_string(),
            role,
        })
    }

    /// Owner whose listings the caller may search.
    /// Admins may name any owner; everyone else only themselves.
    pub fn owner_scope(&self, requested_owner: Option<&str>) -> Result<String, AuthError> {
        match requested_owner.map(str::trim).filter(|o| !o.is_empty()) {
            None => Ok(self.user_id.clone()),
            Some(owner) if owner == self.user_id || self.role == Role::Admin => {
                Ok(owner.to_string())
            }
            Some(owner) => Err(AuthError::Forbidden(format!(
                "{} {} cannot view listings of {}",
                self.role, self.user_id, owner
            ))),
        }
    }
}
