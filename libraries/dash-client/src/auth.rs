//! Authentication and profile routes.

use crate::client::DashClient;
use crate::error::{ClientError, Result};
use crate::session::Session;
use crate::types::{ApiEnvelope, FetchOptions, RegisterOutcome, TokenData, UserData};
use dash_core::{Credentials, ProfileUpdate, Registration, User};
use reqwest::Method;
use tracing::{debug, info, warn};

/// Authentication client for the dashboard API.
pub struct AuthClient<'a> {
    client: &'a DashClient,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(client: &'a DashClient) -> Self {
        Self { client }
    }

    /// Login with email and password.
    ///
    /// On success the token from `data.token` is stored in `session`.
    pub async fn login(&self, session: &Session, credentials: &Credentials) -> Result<()> {
        credentials.validate()?;
        debug!(email = %credentials.email, "Attempting login");

        let response: ApiEnvelope<TokenData> = self
            .client
            .fetch(
                "/auth/login",
                FetchOptions::new().method(Method::POST).json(credentials)?,
            )
            .await
            .map_err(|e| {
                if e.is_unauthorized() {
                    warn!(email = %credentials.email, "Login failed: invalid credentials");
                }
                e
            })?;

        let token = response
            .data
            .token
            .filter(|t| !t.is_empty())
            .ok_or(ClientError::MissingToken)?;
        session.set_token(token);

        info!(email = %credentials.email, "Login successful");
        Ok(())
    }

    /// Create an account.
    ///
    /// When the server answers with a token the user is signed in right away;
    /// otherwise they still have to log in.
    pub async fn register(
        &self,
        session: &Session,
        registration: &Registration,
    ) -> Result<RegisterOutcome> {
        registration.validate()?;
        debug!(email = %registration.email, "Registering account");

        let response: ApiEnvelope<TokenData> = self
            .client
            .fetch(
                "/auth/register",
                FetchOptions::new()
                    .method(Method::POST)
                    .json(registration)?,
            )
            .await?;

        match response.data.token.filter(|t| !t.is_empty()) {
            Some(token) => {
                session.set_token(token);
                info!(email = %registration.email, "Registered and signed in");
                Ok(RegisterOutcome::SignedIn)
            }
            None => {
                info!(email = %registration.email, "Registered; login required");
                Ok(RegisterOutcome::LoginRequired)
            }
        }
    }

    /// Get the current user.
    pub async fn me(&self, session: &Session) -> Result<User> {
        let token = session.token().ok_or(ClientError::AuthRequired)?;

        let response: ApiEnvelope<UserData> = self
            .client
            .fetch("/auth/me", FetchOptions::new().token(Some(token)))
            .await?;

        Ok(response.data.user)
    }

    /// Save name and email; returns the user as stored by the server.
    pub async fn update_profile(&self, session: &Session, update: &ProfileUpdate) -> Result<User> {
        let token = session.token().ok_or(ClientError::AuthRequired)?;
        update.validate()?;

        let response: ApiEnvelope<UserData> = self
            .client
            .fetch(
                "/auth/profile",
                FetchOptions::new()
                    .method(Method::PUT)
                    .token(Some(token))
                    .json(update)?,
            )
            .await?;

        debug!(user_id = %response.data.user.id, "Profile updated");
        Ok(response.data.user)
    }

    /// Log out.
    ///
    /// The server call is best effort: whatever it answers, the token is
    /// cleared from the session.
    pub async fn logout(&self, session: &Session) {
        if let Some(token) = session.token() {
            let result = self
                .client
                .fetch_value(
                    "/auth/logout",
                    FetchOptions::new().method(Method::POST).token(Some(token)),
                )
                .await;
            if let Err(e) = result {
                debug!(error = %e, "Server logout failed; clearing token anyway");
            }
        }

        session.clear_token();
        info!("Logged out");
    }
}
