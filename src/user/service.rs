use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{
    models::UserModel,
    password::{hash_password, verify_password},
    repository::UserRepository,
    types::{CreateUserInput, EditUserInput, UserSortField},
    validation::{validate_new_user, validate_username},
};
use crate::config::AppConfig;
use crate::pagination::PageRequest;
use crate::recipe::repository::RecipeRepository;
use crate::session::SessionContext;
use crate::shared::AppError;
use crate::verification::{
    mailer::{EmailMessage, Mailer},
    repository::VerificationRepository,
};

fn invalid(message: &str) -> AppError {
    AppError::Validation(message.to_string())
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

/// Account operations: registration, login checks, profile, follows
pub struct UserService {
    users: Arc<dyn UserRepository + Send + Sync>,
    recipes: Arc<dyn RecipeRepository + Send + Sync>,
    verifications: Arc<dyn VerificationRepository + Send + Sync>,
    mailer: Arc<dyn Mailer>,
    email_domain: String,
    client_url: String,
    require_email_verification: bool,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository + Send + Sync>,
        recipes: Arc<dyn RecipeRepository + Send + Sync>,
        verifications: Arc<dyn VerificationRepository + Send + Sync>,
        mailer: Arc<dyn Mailer>,
        config: &AppConfig,
    ) -> Self {
        Self {
            users,
            recipes,
            verifications,
            mailer,
            email_domain: config.email_domain.clone(),
            client_url: config.client_url.clone(),
            require_email_verification: config.require_email_verification,
        }
    }

    /// Creates an account and sends its verification email.
    ///
    /// When email verification is switched off the account starts out
    /// verified and no email is sent.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(
        &self,
        session: &SessionContext,
        input: CreateUserInput,
    ) -> Result<UserModel, AppError> {
        if session.is_authenticated() {
            return Err(invalid("Already logged in"));
        }
        validate_new_user(&input)?;

        let username_taken = self.users.find_by_username(&input.username).await?.is_some();
        let email_taken = self.users.find_by_email(&input.email).await?.is_some();
        match (username_taken, email_taken) {
            (true, true) => return Err(invalid("Username and email already exists")),
            (false, true) => return Err(invalid("Email already exists")),
            (true, false) => return Err(invalid("Username already exists")),
            (false, false) => {}
        }

        let password_hash = hash_password(&input.password)?;
        let mut user = UserModel::new(input.username, input.email, input.name, password_hash);
        user.email_verified = !self.require_email_verification;
        self.users.create_user(&user).await?;

        if self.require_email_verification {
            // Without the email the account could never be verified
            if let Err(e) = self.send_verification(&user).await {
                warn!(user_id = %user.id, error = %e, "Verification email failed, removing account");
                self.users.delete_user(user.id).await?;
                return Err(e);
            }
        }

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    async fn send_verification(&self, user: &UserModel) -> Result<(), AppError> {
        let token = Uuid::new_v4();
        self.verifications.store_token(token, user.id).await?;
        let message = EmailMessage::verification(
            &self.email_domain,
            &self.client_url,
            &user.email,
            &token.to_string(),
        );
        self.mailer.send(&message).await?;
        debug!(user_id = %user.id, "Verification email sent");
        Ok(())
    }

    /// Checks credentials. Issuing the session cookies is up to the caller.
    #[instrument(skip(self, username_or_email, password))]
    pub async fn authenticate(
        &self,
        session: &SessionContext,
        username_or_email: &str,
        password: &str,
    ) -> Result<UserModel, AppError> {
        if session.is_authenticated() {
            return Err(invalid("Already logged in"));
        }

        let user = if username_or_email.contains('@') {
            self.users.find_by_email(username_or_email).await?
        } else {
            self.users.find_by_username(username_or_email).await?
        };
        let Some(user) = user else {
            return Err(invalid("Email or username is incorrect"));
        };

        if self.require_email_verification && !user.email_verified {
            return Err(invalid("Email is not verified"));
        }
        if !verify_password(&user.password_hash, password) {
            warn!(user_id = %user.id, "Failed login attempt");
            return Err(invalid("Password is incorrect"));
        }

        info!(user_id = %user.id, "User authenticated");
        Ok(user)
    }

    #[instrument(skip(self, input))]
    pub async fn edit_profile(
        &self,
        session: &SessionContext,
        input: EditUserInput,
    ) -> Result<UserModel, AppError> {
        let user_id = session.require_user()?;

        if let Some(username) = &input.username {
            validate_username(username)?;
            if let Some(existing) = self.users.find_by_username(username).await? {
                if existing.id != user_id {
                    return Err(invalid("Username is taken"));
                }
            }
        }

        self.users
            .update_profile(user_id, &input)
            .await?
            .ok_or_else(user_not_found)
    }

    /// Deletes the caller with everything they authored, saved or followed
    #[instrument(skip(self))]
    pub async fn delete_account(&self, session: &SessionContext) -> Result<(), AppError> {
        let user_id = session.require_user()?;

        self.recipes.delete_user_content(user_id).await?;
        if !self.users.delete_user(user_id).await? {
            return Err(user_not_found());
        }

        info!(user_id = %user_id, "User deleted");
        Ok(())
    }

    /// Follows `target_id` and returns the caller's updated profile
    #[instrument(skip(self))]
    pub async fn follow(&self, session: &SessionContext, target_id: Uuid) -> Result<UserModel, AppError> {
        let user_id = session.require_user()?;
        if user_id == target_id {
            return Err(invalid("You cannot follow yourself"));
        }
        self.get_user(target_id).await?;

        self.users.follow(user_id, target_id).await?;
        self.get_user(user_id).await
    }

    #[instrument(skip(self))]
    pub async fn unfollow(&self, session: &SessionContext, target_id: Uuid) -> Result<UserModel, AppError> {
        let user_id = session.require_user()?;
        if user_id == target_id {
            return Err(invalid("You cannot unfollow yourself"));
        }
        self.get_user(target_id).await?;

        self.users.unfollow(user_id, target_id).await?;
        self.get_user(user_id).await
    }

    /// Consumes a verification token and marks its user verified
    #[instrument(skip(self, token))]
    pub async fn verify_email(&self, token: &str) -> Result<Uuid, AppError> {
        let link_invalid = || AppError::NotFound("Verification link is invalid or has expired".to_string());

        let token = Uuid::parse_str(token).map_err(|_| link_invalid())?;
        let user_id = self
            .verifications
            .consume_token(token)
            .await?
            .ok_or_else(link_invalid)?;

        if !self.users.mark_email_verified(user_id).await? {
            return Err(link_invalid());
        }
        Ok(user_id)
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<UserModel, AppError> {
        self.users.get_user(user_id).await?.ok_or_else(user_not_found)
    }

    /// Looks a user up by id, then username, then falls back to the caller
    pub async fn lookup(
        &self,
        session: &SessionContext,
        id: Option<Uuid>,
        username: Option<&str>,
    ) -> Result<UserModel, AppError> {
        if let Some(id) = id {
            return self.get_user(id).await;
        }
        if let Some(username) = username {
            return self
                .users
                .find_by_username(username)
                .await?
                .ok_or_else(user_not_found);
        }
        match session.session_user_id {
            Some(user_id) => self.get_user(user_id).await,
            None => Err(AppError::Unauthorized(
                "Not logged in and no user provided.".to_string(),
            )),
        }
    }

    pub async fn search(
        &self,
        query: Option<&str>,
        page: &PageRequest<UserSortField>,
    ) -> Result<Vec<UserModel>, AppError> {
        self.users.search_users(query, page).await
    }

    pub async fn followers(
        &self,
        user_id: Uuid,
        page: &PageRequest<UserSortField>,
    ) -> Result<Vec<UserModel>, AppError> {
        self.users.list_followers(user_id, page).await
    }

    pub async fn following(
        &self,
        user_id: Uuid,
        page: &PageRequest<UserSortField>,
    ) -> Result<Vec<UserModel>, AppError> {
        self.users.list_following(user_id, page).await
    }

    pub async fn follower_count(&self, user_id: Uuid) -> Result<i64, AppError> {
        self.users.count_followers(user_id).await
    }

    pub async fn following_count(&self, user_id: Uuid) -> Result<i64, AppError> {
        self.users.count_following(user_id).await
    }
}
