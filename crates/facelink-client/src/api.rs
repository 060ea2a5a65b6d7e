//! HTTP client for the face-recognition service.
//!
//! Each operation is a single JSON request with no retry. Responses are
//! folded into `Result<T, ApiError>` by [`map_response`]; presentation
//! strings are left to the caller.

use crate::config::ClientConfig;
use crate::service::FaceService;
use crate::session::Session;
use async_trait::async_trait;
use facelink_core::codec;
use facelink_core::types::{
    ApiResponse, CompareRequest, FaceDataRequest, LoginRequest, LoginResponse, RegisterRequest,
};
use facelink_core::{ApiError, MatchResult, UserRecord};
use image::DynamicImage;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Client bound to one service endpoint and one session.
pub struct FaceClient {
    base_url: Url,
    http: reqwest::Client,
    session: Arc<Session>,
}

impl FaceClient {
    /// Build a client for `config.base_url` sharing `session`.
    pub fn new(config: &ClientConfig, session: Arc<Session>) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ApiError::InvalidInput(format!("invalid base URL {}: {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidInput(format!(
                "base URL cannot carry a path: {}",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(ApiError::transport)?;

        tracing::debug!(base_url = %base_url, "face client created");
        Ok(Self {
            base_url,
            http,
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Log in and return the issued token without storing it.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "Please enter both username and password".into(),
            ));
        }

        tracing::info!(username, "authenticating");
        let request = self
            .http
            .post(self.endpoint(&["api", "auth", "login"]))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            });

        let (status, body) = self.execute(request).await?;
        let response: LoginResponse = map_response(status, &body)?;
        match response.token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => {
                tracing::warn!(status = status.as_u16(), "login response carried no token");
                Err(ApiError::Server {
                    code: status.as_u16(),
                    body,
                })
            }
        }
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `Authorization` header value, or `NotAuthenticated` if no token is held.
    fn bearer(&self) -> Result<String, ApiError> {
        match self.session.token() {
            Some(token) if !token.is_empty() => Ok(format!("Bearer {token}")),
            _ => Err(ApiError::NotAuthenticated),
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<(StatusCode, String), ApiError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "request failed");
            ApiError::transport(e)
        })?;
        let status = response.status();
        let url = response.url().clone();
        let body = response.text().await.map_err(ApiError::transport)?;
        tracing::debug!(%url, status = status.as_u16(), bytes = body.len(), "API call completed");
        Ok((status, body))
    }

    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let (status, body) = self.execute(request).await?;
        map_response(status, &body)
    }
}

/// Map a raw HTTP status and body to a typed payload or an [`ApiError`].
pub fn map_response<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
    if !status.is_success() {
        tracing::error!(status = status.as_u16(), body, "API error");
        return Err(ApiError::from_status(status.as_u16(), body));
    }
    serde_json::from_str(body)
        .map_err(|e| ApiError::transport(format!("invalid response body: {e}")))
}

/// JPEG-encode off the async executor; maximum quality is slow on large frames.
async fn encode(image: &DynamicImage) -> Result<String, ApiError> {
    let image = image.clone();
    tokio::task::spawn_blocking(move || codec::encode_data_uri(&image))
        .await
        .map_err(|e| ApiError::transport(format!("image encoder task failed: {e}")))?
        .map_err(ApiError::from)
}

#[async_trait]
impl FaceService for FaceClient {
    async fn authenticate(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let token = self.login(username, password).await?;
        self.session.set_token(token);
        tracing::info!(username, "authenticated");
        Ok(())
    }

    async fn register_user(&self, image: &DynamicImage, user_id: &str) -> Result<(), ApiError> {
        let auth = self.bearer()?;
        let face_data = encode(image).await?;
        tracing::info!(user_id, "registering user");

        let request = self
            .http
            .post(self.endpoint(&["api", "users"]))
            .header(reqwest::header::AUTHORIZATION, auth)
            .json(&RegisterRequest {
                user_id: user_id.to_string(),
                face_data,
            });
        let _: ApiResponse = self.call(request).await?;
        Ok(())
    }

    async fn verify_user(
        &self,
        image: &DynamicImage,
        user_id: &str,
    ) -> Result<MatchResult, ApiError> {
        let auth = self.bearer()?;
        let face_data = encode(image).await?;
        tracing::info!(user_id, "verifying user");

        let request = self
            .http
            .post(self.endpoint(&["api", "users", user_id, "verify"]))
            .header(reqwest::header::AUTHORIZATION, auth)
            .json(&FaceDataRequest { face_data });
        let response: ApiResponse = self.call(request).await?;
        let result = MatchResult::from(response);
        tracing::info!(
            user_id,
            verified = result.verified,
            confidence = result.confidence,
            "verification completed"
        );
        Ok(result)
    }

    async fn update_user(&self, image: &DynamicImage, user_id: &str) -> Result<(), ApiError> {
        let auth = self.bearer()?;
        let face_data = encode(image).await?;
        tracing::info!(user_id, "updating user");

        let request = self
            .http
            .put(self.endpoint(&["api", "users", user_id]))
            .header(reqwest::header::AUTHORIZATION, auth)
            .json(&FaceDataRequest { face_data });
        let _: ApiResponse = self.call(request).await?;
        Ok(())
    }

    async fn compare_faces(
        &self,
        first: &DynamicImage,
        second: &DynamicImage,
    ) -> Result<MatchResult, ApiError> {
        let auth = self.bearer()?;
        let face_data1 = encode(first).await?;
        let face_data2 = encode(second).await?;
        tracing::info!("comparing faces");

        let request = self
            .http
            .post(self.endpoint(&["api", "faces", "compare"]))
            .header(reqwest::header::AUTHORIZATION, auth)
            .json(&CompareRequest {
                face_data1,
                face_data2,
            });
        let response: ApiResponse = self.call(request).await?;
        let result = MatchResult::from(response);
        tracing::info!(
            verified = result.verified,
            confidence = result.confidence,
            "comparison completed"
        );
        Ok(result)
    }

    async fn get_user_image(&self, user_id: &str) -> Result<String, ApiError> {
        let auth = self.bearer()?;
        let request = self
            .http
            .get(self.endpoint(&["api", "users", user_id, "image"]))
            .header(reqwest::header::AUTHORIZATION, auth);
        let response: ApiResponse = self.call(request).await?;
        response
            .face_data
            .filter(|data| !data.is_empty())
            .ok_or_else(|| ApiError::transport("response carried no face data"))
    }

    async fn get_users(&self) -> Result<Vec<UserRecord>, ApiError> {
        let auth = self.bearer()?;
        let request = self
            .http
            .get(self.endpoint(&["api", "users"]))
            .header(reqwest::header::AUTHORIZATION, auth);
        let response: Vec<ApiResponse> = self.call(request).await?;
        tracing::debug!(count = response.len(), "users listed");
        Ok(response.into_iter().map(UserRecord::from).collect())
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), ApiError> {
        let auth = self.bearer()?;
        tracing::info!(user_id, "deleting user");
        let request = self
            .http
            .delete(self.endpoint(&["api", "users", user_id]))
            .header(reqwest::header::AUTHORIZATION, auth);
        let _: ApiResponse = self.call(request).await?;
        Ok(())
    }
}
