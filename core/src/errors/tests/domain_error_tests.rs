//! Unit tests for domain error types

use crate::errors::{
    ClaimsError, DomainError, ErrorResponse, Outcome, RefreshFailure, TokenError,
};

#[test]
fn test_refresh_failure_outcomes() {
    assert_eq!(RefreshFailure::InvalidAccessToken.outcome(), Outcome::ClientError);
    assert_eq!(RefreshFailure::UnknownRefreshToken.outcome(), Outcome::ClientError);
    assert_eq!(RefreshFailure::ReusedRefreshToken.outcome(), Outcome::AuthorizationError);
    assert_eq!(RefreshFailure::ExpiredRefreshToken.outcome(), Outcome::AuthorizationError);
}

#[test]
fn test_outcome_status_codes() {
    assert_eq!(Outcome::Success.status_code(), 200);
    assert_eq!(Outcome::ClientError.status_code(), 400);
    assert_eq!(Outcome::AuthorizationError.status_code(), 401);
    assert_eq!(Outcome::InternalError.status_code(), 500);
}

#[test]
fn test_outcome_of_result() {
    let ok: Result<(), DomainError> = Ok(());
    assert_eq!(Outcome::of(&ok), Outcome::Success);

    let reused: Result<(), DomainError> = Err(RefreshFailure::ReusedRefreshToken.into());
    assert_eq!(Outcome::of(&reused).status_code(), 401);

    let unknown: Result<(), DomainError> = Err(RefreshFailure::UnknownRefreshToken.into());
    assert_eq!(Outcome::of(&unknown).status_code(), 400);
}

#[test]
fn test_token_error_invalid_classification() {
    assert!(TokenError::InvalidSignature.is_invalid());
    assert!(TokenError::Expired.is_invalid());
    assert!(TokenError::InvalidAlgorithm.is_invalid());
    assert!(!TokenError::EmptySubject.is_invalid());
    assert!(!TokenError::GenerationFailed { message: "x".into() }.is_invalid());

    let err: DomainError = TokenError::Expired.into();
    assert_eq!(err.outcome(), Outcome::AuthorizationError);

    let err: DomainError = TokenError::ReservedClaim { claim: "exp".into() }.into();
    assert_eq!(err.outcome(), Outcome::InternalError);
}

#[test]
fn test_integrity_violation_is_fatal() {
    let err = DomainError::IntegrityViolation {
        message: "missing subject".into(),
    };
    assert!(err.is_fatal());
    assert_eq!(err.outcome(), Outcome::InternalError);
    assert!(!DomainError::from(RefreshFailure::ReusedRefreshToken).is_fatal());
}

#[test]
fn test_user_not_found_is_client_error() {
    let err: DomainError = ClaimsError::UserNotFound { user_id: "u1".into() }.into();
    assert_eq!(err.outcome(), Outcome::ClientError);
    assert_eq!(err.code(), "USER_NOT_FOUND");
    assert!(err.to_string().contains("u1"));
}

#[test]
fn test_error_response_hides_internal_detail() {
    let err = DomainError::IntegrityViolation {
        message: "token abc lacks sub".into(),
    };
    let response = ErrorResponse::from(&err);
    assert_eq!(response.error, "INTEGRITY_VIOLATION");
    assert!(!response.message.contains("abc"));

    let err: DomainError = RefreshFailure::ExpiredRefreshToken.into();
    let response = ErrorResponse::from(&err);
    assert_eq!(response.error, "REFRESH_TOKEN_EXPIRED");
    assert_eq!(response.message, "Refresh token expired");
}
