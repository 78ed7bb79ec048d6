//! 认证服务：校验管理员密码并签发访问令牌

use crate::{
    auth::{CredentialVerifier, TokenIssuer, ADMIN_SUBJECT},
    error::AppError,
    models::auth::{LoginRequest, LoginResponse},
};
use chrono::Utc;
use std::sync::Arc;

pub struct AuthService {
    verifier: Arc<CredentialVerifier>,
    token_issuer: Arc<TokenIssuer>,
}

impl AuthService {
    pub fn new(verifier: Arc<CredentialVerifier>, token_issuer: Arc<TokenIssuer>) -> Self {
        Self {
            verifier,
            token_issuer,
        }
    }

    /// 管理员登录
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        let candidate = req.candidate().map(str::to_owned);

        // KDF 计算是 CPU 密集型，放到阻塞线程池执行
        let verifier = self.verifier.clone();
        let matched =
            tokio::task::spawn_blocking(move || verifier.verify(candidate.as_deref())).await?;

        if !matched {
            tracing::warn!(scheme = self.verifier.scheme_name(), "Login failed: invalid access code");
            return Err(AppError::Unauthorized);
        }

        let token = self.token_issuer.issue(ADMIN_SUBJECT, Utc::now())?;

        tracing::info!(subject = ADMIN_SUBJECT, "Login succeeded, token issued");

        Ok(LoginResponse { token })
    }
}
