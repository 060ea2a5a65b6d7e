//! Screen logic: validate input, run the action, render the outcome.
//!
//! Each screen owns a scope in the [`ActionRunner`] so that a discarded
//! screen can cancel whatever it started.

use facelink_client::{ActionKey, ActionRunner, CredentialStore, Credentials, FaceService};
use facelink_core::codec;
use facelink_core::dates::format_created_at;
use facelink_core::{Action, Outcome, Presentation, UserRecord};
use image::DynamicImage;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

pub const SCOPE_HOME: &str = "home";
pub const SCOPE_USERS: &str = "users";
pub const SCOPE_COMPARE: &str = "compare";
pub const SCOPE_SETTINGS: &str = "settings";

/// Everything a screen needs to drive the service.
pub struct App<S> {
    pub service: Arc<S>,
    pub runner: ActionRunner,
    pub store: CredentialStore,
}

impl<S: FaceService + 'static> App<S> {
    pub fn new(service: Arc<S>, store: CredentialStore) -> Self {
        Self {
            service,
            runner: ActionRunner::new(),
            store,
        }
    }

    async fn run<F>(&self, key: ActionKey, action: F) -> Option<Outcome>
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        self.runner.submit(key, action).outcome().await
    }

    /// Launch-time login with saved credentials, run under the caller's `scope`.
    pub async fn auto_login(&self, scope: &str) -> Result<(), Presentation> {
        let creds = self.store.load();
        if !creds.is_complete() {
            return Err(Presentation::error(
                "Not configured",
                "No saved credentials; run `facelink login` first",
            ));
        }

        let service = Arc::clone(&self.service);
        let key = ActionKey::new(scope, Action::Login);
        let outcome = self
            .run(key, async move {
                let result = service.authenticate(&creds.username, &creds.password).await;
                Outcome::from_unit(Action::Login, None, result)
            })
            .await
            .ok_or_else(cancelled)?;

        if outcome.success {
            Ok(())
        } else {
            tracing::warn!(error = ?outcome.error, "auto-login failed");
            Err(Presentation::error(
                "Authentication Failed",
                "Saved credentials were rejected; run `facelink login` to update them",
            ))
        }
    }

    /// Settings screen: verify credentials with the server, then save them.
    pub async fn save_credentials(&self, username: &str, password: &str) -> Presentation {
        let username = username.trim().to_string();
        let password = password.trim().to_string();
        if username.is_empty() || password.is_empty() {
            return Presentation::error("Invalid Input", "Please enter both username and password");
        }

        let service = Arc::clone(&self.service);
        let creds = Credentials::new(username, password);
        let attempt = creds.clone();
        let key = ActionKey::new(SCOPE_SETTINGS, Action::Login);
        let Some(outcome) = self
            .run(key, async move {
                let result = service.authenticate(&attempt.username, &attempt.password).await;
                Outcome::from_unit(Action::Login, None, result)
            })
            .await
        else {
            return cancelled();
        };

        if outcome.success {
            if let Err(e) = self.store.save(&creds) {
                return Presentation::error(
                    "Error",
                    format!("Failed to save credentials: {e}"),
                );
            }
        }
        outcome.present(Action::Login)
    }

    /// Settings screen: stored username and version lines.
    pub fn settings_lines(&self) -> Vec<String> {
        let creds = self.store.load();
        let username = if creds.username.is_empty() {
            "(not set)".to_string()
        } else {
            creds.username
        };
        let password = if creds.password.is_empty() { "(not set)" } else { "********" };
        vec![
            format!("Username: {username}"),
            format!("Password: {password}"),
            format!("Version: {}", env!("CARGO_PKG_VERSION")),
            format!("SDK Version: {}", facelink_client::VERSION),
        ]
    }

    pub async fn register(&self, image: Option<DynamicImage>, user_id: &str) -> Presentation {
        self.enroll_action(Action::Register, image, user_id).await
    }

    pub async fn update(&self, image: Option<DynamicImage>, user_id: &str) -> Presentation {
        self.enroll_action(Action::Update, image, user_id).await
    }

    async fn enroll_action(
        &self,
        action: Action,
        image: Option<DynamicImage>,
        user_id: &str,
    ) -> Presentation {
        let (image, user_id) = match validate_home_input(image, user_id) {
            Ok(input) => input,
            Err(p) => return p,
        };

        let service = Arc::clone(&self.service);
        let key = ActionKey::new(SCOPE_HOME, action).with_subject(user_id.clone());
        let outcome = self
            .run(key, async move {
                let result = match action {
                    Action::Update => service.update_user(&image, &user_id).await,
                    _ => service.register_user(&image, &user_id).await,
                };
                Outcome::from_unit(action, Some(&user_id), result)
            })
            .await;
        present_or_cancelled(outcome, action)
    }

    pub async fn verify(&self, image: Option<DynamicImage>, user_id: &str) -> Presentation {
        let (image, user_id) = match validate_home_input(image, user_id) {
            Ok(input) => input,
            Err(p) => return p,
        };

        let service = Arc::clone(&self.service);
        let key = ActionKey::new(SCOPE_HOME, Action::Verify).with_subject(user_id.clone());
        let outcome = self
            .run(key, async move {
                let result = service.verify_user(&image, &user_id).await;
                Outcome::from_match(Action::Verify, Some(&user_id), result)
            })
            .await;
        present_or_cancelled(outcome, Action::Verify)
    }

    /// Face Compare screen.
    pub async fn compare(
        &self,
        first: Option<DynamicImage>,
        second: Option<DynamicImage>,
    ) -> Presentation {
        let (Some(first), Some(second)) = (first, second) else {
            return Presentation::error("Input Error", "Please capture both faces for comparison");
        };

        let service = Arc::clone(&self.service);
        let key = ActionKey::new(SCOPE_COMPARE, Action::Compare);
        let outcome = self
            .run(key, async move {
                let result = service.compare_faces(&first, &second).await;
                Outcome::from_match(Action::Compare, None, result)
            })
            .await;
        present_or_cancelled(outcome, Action::Compare)
    }

    /// Users screen: fetch the list. Rows are empty on failure.
    pub async fn list_users(&self) -> (Presentation, Vec<UserRecord>) {
        let service = Arc::clone(&self.service);
        let key = ActionKey::new(SCOPE_USERS, Action::ListUsers);
        let outcome = self
            .run(key, async move { Outcome::from_users(service.get_users().await) })
            .await;

        match outcome {
            Some(outcome) => {
                let presentation = outcome.present(Action::ListUsers);
                (presentation, outcome.users.unwrap_or_default())
            }
            None => (cancelled(), Vec::new()),
        }
    }

    pub async fn delete(&self, user_id: &str) -> Presentation {
        let user_id = user_id.trim().to_string();
        if user_id.is_empty() {
            return Presentation::error("Input Error", "Please enter a user ID");
        }

        let service = Arc::clone(&self.service);
        let key = ActionKey::new(SCOPE_USERS, Action::Delete).with_subject(user_id.clone());
        let outcome = self
            .run(key, async move {
                let result = service.delete_user(&user_id).await;
                Outcome::from_unit(Action::Delete, Some(&user_id), result)
            })
            .await;
        present_or_cancelled(outcome, Action::Delete)
    }

    /// Fetch a user's enrolled face and write the decoded image to `output`.
    pub async fn fetch_image(&self, user_id: &str, output: &Path) -> Presentation {
        let user_id = user_id.trim().to_string();
        if user_id.is_empty() {
            return Presentation::error("Input Error", "Please enter a user ID");
        }

        let service = Arc::clone(&self.service);
        let key = ActionKey::new(SCOPE_USERS, Action::FetchImage).with_subject(user_id.clone());
        let subject = user_id.clone();
        let Some(outcome) = self
            .run(key, async move {
                Outcome::from_image(&subject, service.get_user_image(&subject).await)
            })
            .await
        else {
            return cancelled();
        };

        let Some(face_data) = outcome.face_data.as_deref().filter(|_| outcome.success) else {
            return outcome.present(Action::FetchImage);
        };

        let bytes = match codec::decode_data_uri(face_data) {
            Ok(bytes) => bytes,
            Err(e) => return Presentation::error("Failed to load image", e.to_string()),
        };
        if let Err(e) = std::fs::write(output, &bytes) {
            return Presentation::error(
                "Error",
                format!("Failed to write {}: {e}", output.display()),
            );
        }

        tracing::info!(user_id = %user_id, path = %output.display(), bytes = bytes.len(), "user image saved");
        Presentation::info(
            "User Image",
            format!("Image for {user_id} saved to {}", output.display()),
        )
    }
}

/// One display line per user: id and formatted creation date.
pub fn render_users(users: &[UserRecord]) -> Vec<String> {
    let width = users.iter().map(|u| u.user_id.len()).max().unwrap_or(0);
    users
        .iter()
        .map(|u| {
            format!(
                "{:<width$}  {}",
                u.user_id,
                format_created_at(u.created_at.as_deref())
            )
        })
        .collect()
}

fn validate_home_input(
    image: Option<DynamicImage>,
    user_id: &str,
) -> Result<(DynamicImage, String), Presentation> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(Presentation::error("Input Error", "Please enter a user ID"));
    }
    let image =
        image.ok_or_else(|| Presentation::error("Input Error", "Please capture an image first"))?;
    Ok((image, user_id.to_string()))
}

fn present_or_cancelled(outcome: Option<Outcome>, action: Action) -> Presentation {
    match outcome {
        Some(outcome) => outcome.present(action),
        None => cancelled(),
    }
}

fn cancelled() -> Presentation {
    Presentation::error("Cancelled", "The operation was cancelled")
}
