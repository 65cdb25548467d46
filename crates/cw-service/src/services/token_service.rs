//! Token issuance flows: login, refresh exchange, signup.
//!
//! Login verifies credentials and issues an access + refresh pair. The
//! refresh exchange accepts a refresh token (and only a refresh token),
//! re-reads the user from the directory, and mints a fresh pair — the
//! caller's recovery path for an expired access token. Nothing here
//! retries; a failed exchange means the caller must authenticate again.

use crate::auth::TokenCodec;
use crate::errors::ApiError;
use crate::models::{NewUser, Role, TokenPair, UserRecord};
use crate::observability::metrics::record_token_issuance;
use crate::repositories::UserDirectory;

/// Verify credentials and issue a token pair.
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    codec: &TokenCodec,
    directory: &dyn UserDirectory,
    email: &str,
    password: &str,
) -> Result<TokenPair, ApiError> {
    let user = directory
        .find_by_email(email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let password_ok = bcrypt::verify(password, &user.password_hash).map_err(|e| {
        tracing::error!(target: "cw.services.token", error = %e, "password verification failed");
        ApiError::Database(format!("password verification failed: {e}"))
    })?;

    if !password_ok {
        record_token_issuance("access", "error");
        return Err(ApiError::InvalidCredentials);
    }

    issue_pair(codec, &user)
}

/// Exchange a refresh token for a fresh token pair.
///
/// The presented token must verify, must not be expired beyond the skew
/// tolerance, and must NOT carry a roles claim — an access token presented
/// here is the wrong kind. The subject is the numeric user id; the user is
/// re-read from the directory so the new access token carries the CURRENT
/// role.
pub async fn refresh(
    codec: &TokenCodec,
    directory: &dyn UserDirectory,
    refresh_token: &str,
) -> Result<TokenPair, ApiError> {
    let verified = codec.verify(refresh_token).map_err(|e| {
        tracing::warn!(target: "cw.services.token", reason = %e, "refresh token rejected");
        ApiError::from(e)
    })?;

    if verified.is_access_token() {
        tracing::warn!(
            target: "cw.services.token",
            "access token presented to the refresh exchange"
        );
        return Err(ApiError::WrongTokenKind);
    }

    let user_id: i64 = verified
        .subject()
        .parse()
        .map_err(|_| ApiError::MalformedToken)?;

    let user = directory
        .find_by_id(user_id)
        .await?
        .ok_or(ApiError::UnknownSubject)?;

    issue_pair(codec, &user)
}

/// Register a new account with the USER role.
pub async fn signup(
    directory: &dyn UserDirectory,
    email: &str,
    password: &str,
    display_name: &str,
) -> Result<UserRecord, ApiError> {
    if directory.email_exists(email).await? {
        return Err(ApiError::DuplicateEmail);
    }

    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| {
        tracing::error!(target: "cw.services.token", error = %e, "password hashing failed");
        ApiError::Database(format!("password hashing failed: {e}"))
    })?;

    directory
        .create(NewUser {
            email: email.to_string(),
            password_hash,
            display_name: display_name.to_string(),
            role: Role::User,
        })
        .await
}

fn issue_pair(codec: &TokenCodec, user: &UserRecord) -> Result<TokenPair, ApiError> {
    let access_token = codec.issue_access_token(&user.email, &[user.role])?;
    let refresh_token = codec.issue_refresh_token(user.user_id)?;
    record_token_issuance("access", "success");
    record_token_issuance("refresh", "success");

    Ok(TokenPair {
        access_token,
        refresh_token,
        token_type: "Bearer",
        expires_in: codec.access_ttl_seconds(),
    })
}
