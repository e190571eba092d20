//! Authentication extractors.

use std::future::{Ready, ready};
use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload};
use uuid::Uuid;

use quill_core::ports::{AuthError, TokenClaims, TokenService};
use quill_shared::ErrorResponse;

/// Where anonymous visitors of protected pages are sent.
const LOGIN_PATH: &str = "/api/auth/login";

/// Authenticated user identity extractor.
///
/// Requests without credentials are redirected to the login page with the
/// requested path in `next`; a bad or expired token is a 401.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
}

impl Identity {
    /// Check if the user has a specific role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            roles: claims.roles,
        }
    }
}

/// Why a request could not be authenticated.
#[derive(Debug)]
pub enum AuthenticationError {
    /// No credentials at all; answered with a redirect to the login page.
    LoginRequired { next: String },
    Rejected(AuthError),
}

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthenticationError::LoginRequired { next } => write!(f, "Login required for {next}"),
            AuthenticationError::Rejected(err) => write!(f, "{}", err),
        }
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthenticationError::LoginRequired { .. } => StatusCode::FOUND,
            AuthenticationError::Rejected(AuthError::InsufficientPermissions) => {
                StatusCode::FORBIDDEN
            }
            AuthenticationError::Rejected(
                AuthError::TokenExpired | AuthError::InvalidToken(_) | AuthError::MissingAuth,
            ) => StatusCode::UNAUTHORIZED,
            AuthenticationError::Rejected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let err = match self {
            AuthenticationError::LoginRequired { next } => {
                return HttpResponse::Found()
                    .insert_header((header::LOCATION, login_redirect(next)))
                    .finish();
            }
            AuthenticationError::Rejected(err) => err,
        };

        let error = match err {
            AuthError::TokenExpired => ErrorResponse::new(401, "Token Expired")
                .with_detail("Your authentication token has expired. Please login again."),
            AuthError::InvalidToken(msg) => {
                ErrorResponse::new(401, "Invalid Token").with_detail(msg.clone())
            }
            AuthError::MissingAuth => ErrorResponse::new(401, "Authentication Required")
                .with_detail("Please provide a valid Bearer token in the Authorization header."),
            AuthError::InsufficientPermissions => ErrorResponse::forbidden(),
            _ => ErrorResponse::internal_error(),
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

/// Login URL that returns the visitor to `next` afterwards.
///
/// `next` is percent-encoded with `/` left readable.
fn login_redirect(next: &str) -> String {
    let next = urlencoding::encode(next).replace("%2F", "/");
    format!("{LOGIN_PATH}?next={next}")
}

fn authenticate(req: &HttpRequest) -> Result<Identity, AuthenticationError> {
    let token_service = match req.app_data::<actix_web::web::Data<Arc<dyn TokenService>>>() {
        Some(service) => service,
        None => {
            tracing::error!("TokenService not found in app data");
            return Err(AuthenticationError::Rejected(AuthError::InvalidToken(
                "Server configuration error".to_string(),
            )));
        }
    };

    let Some(auth_header) = req.headers().get(header::AUTHORIZATION) else {
        let next = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| req.path());
        return Err(AuthenticationError::LoginRequired {
            next: next.to_string(),
        });
    };

    let auth_str = auth_header.to_str().map_err(|_| {
        AuthenticationError::Rejected(AuthError::InvalidToken(
            "Invalid authorization header".to_string(),
        ))
    })?;

    let token = auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        AuthenticationError::Rejected(AuthError::InvalidToken(
            "Expected Bearer token".to_string(),
        ))
    })?;

    token_service
        .validate_token(token)
        .map(Identity::from)
        .map_err(AuthenticationError::Rejected)
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

/// Optional identity extractor - anonymous when no valid token is present.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|identity| identity.user_id)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalIdentity(authenticate(req).ok())))
    }
}

/// Identity that also holds the `admin` role.
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub Identity);

impl FromRequest for AdminIdentity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).and_then(|identity| {
            if identity.has_role("admin") {
                Ok(AdminIdentity(identity))
            } else {
                Err(AuthenticationError::Rejected(
                    AuthError::InsufficientPermissions,
                ))
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_keeps_query_encoded() {
        assert_eq!(login_redirect("/api/follow"), "/api/auth/login?next=/api/follow");
        assert_eq!(
            login_redirect("/api/follow?page=2&x=y"),
            "/api/auth/login?next=/api/follow%3Fpage%3D2%26x%3Dy"
        );
    }
}
