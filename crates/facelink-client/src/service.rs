use async_trait::async_trait;
use facelink_core::{ApiError, MatchResult, UserRecord};
use image::DynamicImage;

/// Operations offered by the face-recognition service.
///
/// Every operation other than [`authenticate`](Self::authenticate) needs a
/// session token and fails with [`ApiError::NotAuthenticated`] before any
/// request is sent when none is held.
#[async_trait]
pub trait FaceService: Send + Sync {
    /// Log in and keep the returned token for later calls.
    async fn authenticate(&self, username: &str, password: &str) -> Result<(), ApiError>;

    /// Enroll a user's reference face.
    async fn register_user(&self, image: &DynamicImage, user_id: &str) -> Result<(), ApiError>;

    /// Compare a face against a user's enrolled face.
    async fn verify_user(&self, image: &DynamicImage, user_id: &str)
        -> Result<MatchResult, ApiError>;

    /// Replace a user's enrolled face.
    async fn update_user(&self, image: &DynamicImage, user_id: &str) -> Result<(), ApiError>;

    /// Compare two faces with each other.
    async fn compare_faces(
        &self,
        first: &DynamicImage,
        second: &DynamicImage,
    ) -> Result<MatchResult, ApiError>;

    /// Fetch a user's enrolled face as a data URI.
    async fn get_user_image(&self, user_id: &str) -> Result<String, ApiError>;

    async fn get_users(&self) -> Result<Vec<UserRecord>, ApiError>;

    async fn delete_user(&self, user_id: &str) -> Result<(), ApiError>;
}
