//! gRPC service implementation for `tollgate.v1.AuthService`
//!
//! Each handler validates its request, calls the auth core, maps the error
//! for that operation, and records:
//! - `grpc_request_duration_seconds` by method and result
//! - an outcome counter per operation

use std::sync::Arc;
use std::time::Instant;

use tollgate_auth_core::{AuthError, AuthService as AuthCore};
use tollgate_db::{SessionRepository, UserRepository};
use tollgate_proto::auth_service::auth_service_server::AuthService;
use tollgate_proto::{
    ChangePasswordRequest, ChangePasswordResponse, IsRefreshTokenValidRequest,
    IsRefreshTokenValidResponse, LoginRequest, LoginResponse, LogoutRequest, LogoutResponse,
    RegisterRequest, RegisterResponse,
};
use tollgate_types::UserId;
use tonic::{Request, Response, Status};

use crate::error::{to_status, Operation};
use crate::validation;

/// gRPC service implementation
pub struct GrpcAuthService<U: UserRepository, S: SessionRepository> {
    auth: Arc<AuthCore<U, S>>,
}

impl<U: UserRepository, S: SessionRepository> GrpcAuthService<U, S> {
    pub fn new(auth: Arc<AuthCore<U, S>>) -> Self {
        Self { auth }
    }
}

/// Record gRPC request duration with result label
#[inline]
fn record_grpc_duration(op: Operation, start: Instant, success: bool) {
    let result = if success { "ok" } else { "err" };
    metrics::histogram!(
        "grpc_request_duration_seconds",
        "method" => op.as_str(),
        "result" => result
    )
    .record(start.elapsed().as_secs_f64());
}

/// Validation, core call and error mapping for one request
async fn handle<T, F>(
    op: Operation,
    validated: Result<(), validation::ValidationError>,
    call: F,
) -> Result<Response<T>, Status>
where
    F: std::future::Future<Output = Result<T, AuthError>>,
{
    let start = Instant::now();

    let result = match validated {
        Ok(()) => call.await.map_err(|e| to_status(op, e)),
        Err(e) => {
            tracing::debug!(operation = op.as_str(), error = %e, "Request rejected");
            Err(e.into())
        }
    };

    record_grpc_duration(op, start, result.is_ok());
    result.map(Response::new)
}

#[tonic::async_trait]
impl<U, S> AuthService for GrpcAuthService<U, S>
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
{
    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        let req = request.into_inner();

        handle(
            Operation::Register,
            validation::validate_register(&req.email, &req.password),
            async {
                self.auth.register(&req.email, &req.password).await?;
                metrics::counter!("auth_registrations_total").increment(1);
                Ok::<_, AuthError>(RegisterResponse {})
            },
        )
        .await
    }

    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> Result<Response<LoginResponse>, Status> {
        let req = request.into_inner();

        let response = handle(
            Operation::Login,
            validation::validate_login(&req.email, &req.password),
            async {
                let (user_id, refresh_token) = self.auth.login(&req.email, &req.password).await?;
                Ok::<_, AuthError>(LoginResponse {
                    user_id: user_id.get(),
                    refresh_token,
                })
            },
        )
        .await;

        let result = if response.is_ok() { "success" } else { "failure" };
        metrics::counter!("auth_logins_total", "result" => result).increment(1);
        response
    }

    async fn logout(
        &self,
        request: Request<LogoutRequest>,
    ) -> Result<Response<LogoutResponse>, Status> {
        let req = request.into_inner();

        handle(
            Operation::Logout,
            validation::validate_logout(&req.refresh_token),
            async {
                self.auth.logout(&req.refresh_token).await?;
                metrics::counter!("auth_sessions_revoked_total", "reason" => "logout").increment(1);
                Ok::<_, AuthError>(LogoutResponse {})
            },
        )
        .await
    }

    async fn is_refresh_token_valid(
        &self,
        request: Request<IsRefreshTokenValidRequest>,
    ) -> Result<Response<IsRefreshTokenValidResponse>, Status> {
        let req = request.into_inner();

        handle(
            Operation::IsRefreshTokenValid,
            validation::validate_refresh_check(req.user_id, &req.refresh_token),
            async {
                let check = self
                    .auth
                    .is_refresh_token_valid(UserId(req.user_id), &req.refresh_token)
                    .await?;

                let result = match (check.valid, &check.new_token) {
                    (false, _) => "invalid",
                    (true, None) => "valid",
                    (true, Some(_)) => "rotated",
                };
                metrics::counter!("auth_token_checks_total", "result" => result).increment(1);

                // A new token is only ever returned alongside a valid result
                let new_refresh_token = if check.valid {
                    check.new_token.unwrap_or_default()
                } else {
                    String::new()
                };

                Ok::<_, AuthError>(IsRefreshTokenValidResponse {
                    is_valid: check.valid,
                    new_refresh_token,
                })
            },
        )
        .await
    }

    async fn change_password(
        &self,
        request: Request<ChangePasswordRequest>,
    ) -> Result<Response<ChangePasswordResponse>, Status> {
        let req = request.into_inner();

        handle(
            Operation::ChangePassword,
            validation::validate_change_password(
                &req.email,
                &req.old_password,
                &req.new_password,
                &req.refresh_token,
            ),
            async {
                self.auth
                    .change_password(
                        &req.email,
                        &req.old_password,
                        &req.new_password,
                        &req.refresh_token,
                    )
                    .await?;
                metrics::counter!("auth_password_changes_total").increment(1);
                Ok::<_, AuthError>(ChangePasswordResponse {})
            },
        )
        .await
    }
}
