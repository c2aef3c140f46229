use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::boarder_service::generate_access_code;
use super::{found, today, ServiceContext};
use crate::auth::{decode_token, hash_password, issue_token, verify_password, AuthMethod, Session};
use crate::config::AppConfig;
use crate::database::models::{Boarder, LandlordProfile, Profile, RegisteredUser, User};
use crate::error::ApiError;
use crate::events::DomainEvent;
use crate::guards;
use crate::types::{Role, UserStatus};
use crate::validation::inputs::{AccessCodeInput, ChangePasswordInput, LoginInput, RegisterInput};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INVALID_ACCESS_CODE: &str = "Invalid access code";
const STALE_SESSION: &str = "Session is no longer valid";

/// A freshly issued session token
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrant {
    pub token: String,
    pub session: Session,
    pub redirect_to: &'static str,
}

/// Who-am-I answer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session: Session,
    pub redirect_to: &'static str,
}

impl From<Session> for SessionView {
    fn from(session: Session) -> Self {
        let redirect_to = guards::redirect_url(Some(session.role), Some(session.status));
        Self { session, redirect_to }
    }
}

#[derive(Clone)]
pub struct AuthService {
    ctx: ServiceContext,
    config: Arc<AppConfig>,
}

impl AuthService {
    pub fn new(ctx: ServiceContext, config: Arc<AppConfig>) -> Self {
        Self { ctx, config }
    }

    /// Create a LANDLORD or BOARDER account together with its profile.
    /// New accounts start PENDING until an admin approves them.
    pub async fn register(&self, input: RegisterInput) -> Result<RegisteredUser, ApiError> {
        if !self.config.api.allow_registration {
            return Err(ApiError::forbidden("Registration is disabled"));
        }
        if input.role == Role::Admin {
            return Err(ApiError::invalid_field("role", "Admin accounts cannot be self-registered"));
        }

        let email = input.email.to_lowercase();
        if self.ctx.store.find_user_by_email(&email).await?.is_some() {
            return Err(ApiError::conflict("An account with this email already exists"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.clone(),
            password_hash: hash_password(&input.password)?,
            role: input.role,
            status: UserStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        let profile = match input.role {
            Role::Boarder => Profile::Boarder(Boarder {
                id: Uuid::new_v4(),
                user_id: Some(user.id),
                first_name: input.first_name,
                last_name: input.last_name,
                email,
                phone: input.phone,
                access_code: generate_access_code(self.ctx.store.as_ref()).await?,
                is_active: true,
                move_in_date: today(),
                move_out_date: None,
                room_id: None,
                created_at: now,
                updated_at: now,
            }),
            _ => Profile::Landlord(LandlordProfile {
                id: Uuid::new_v4(),
                user_id: user.id,
                first_name: input.first_name,
                last_name: input.last_name,
                phone: input.phone,
                business_name: input.business_name,
                created_at: now,
            }),
        };

        let registered = self.ctx.store.create_user_with_profile(user, profile).await?;
        tracing::info!(user_id = %registered.user.id, role = %registered.user.role, "User registered");

        self.ctx
            .publish(DomainEvent::UserRegistered {
                user_id: registered.user.id,
                role: registered.user.role,
                status: registered.user.status,
            })
            .await?;
        Ok(registered)
    }

    /// Suspended and pending users still get a session; the redirect
    /// target tells the client where they belong.
    pub async fn login(&self, input: LoginInput) -> Result<SessionGrant, ApiError> {
        let email = input.email.to_lowercase();
        let user = match self.ctx.store.find_user_by_email(&email).await? {
            Some(user) if verify_password(&input.password, &user.password_hash) => user,
            _ => {
                tracing::warn!(%email, "Failed login attempt");
                return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
            }
        };

        let session = self.password_session(&user).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
        self.grant(session)
    }

    /// Exchange an active boarder's access code for a boarder session.
    pub async fn redeem_access_code(&self, input: AccessCodeInput) -> Result<SessionGrant, ApiError> {
        let code = input.access_code.to_uppercase();
        let boarder = match self.ctx.store.find_boarder_by_access_code(&code).await? {
            Some(boarder) if boarder.is_active => boarder,
            _ => return Err(ApiError::unauthorized(INVALID_ACCESS_CODE)),
        };

        let session = self.access_code_session(&boarder).await?;
        tracing::info!(boarder_id = %boarder.id, "Access code redeemed");
        self.grant(session)
    }

    /// Decode a token and bring its claims up to date with the store.
    pub async fn authenticate(&self, token: &str) -> Result<Session, ApiError> {
        let claims = decode_token(token, &self.config.security)?;
        self.refresh(claims.into()).await
    }

    /// Replace role and status from stored state, so approvals and
    /// suspensions apply to sessions that already exist.
    pub async fn refresh(&self, session: Session) -> Result<Session, ApiError> {
        match session.method {
            AuthMethod::Password => match self.ctx.store.get_user(session.subject).await? {
                Some(user) => self.password_session(&user).await,
                None => Err(ApiError::unauthorized(STALE_SESSION)),
            },
            AuthMethod::AccessCode => match self.ctx.store.get_boarder(session.subject).await? {
                Some(boarder) if boarder.is_active => self.access_code_session(&boarder).await,
                _ => Err(ApiError::unauthorized(STALE_SESSION)),
            },
        }
    }

    pub async fn change_password(&self, session: &Session, input: ChangePasswordInput) -> Result<(), ApiError> {
        if session.method != AuthMethod::Password {
            return Err(ApiError::forbidden("Access-code sessions have no password to change"));
        }
        let mut user = found(self.ctx.store.get_user(session.subject).await?, "User", session.subject)?;
        if !verify_password(&input.current_password, &user.password_hash) {
            return Err(ApiError::invalid_field("currentPassword", "Current password is incorrect"));
        }

        user.password_hash = hash_password(&input.new_password)?;
        user.updated_at = Utc::now();
        self.ctx.store.update_user(&user).await?;
        tracing::info!(user_id = %user.id, "Password changed");

        self.ctx.publish(DomainEvent::PasswordChanged { user_id: user.id }).await
    }

    async fn password_session(&self, user: &User) -> Result<Session, ApiError> {
        let boarder_id = match user.role {
            Role::Boarder => self.ctx.store.find_boarder_by_user(user.id).await?.map(|b| b.id),
            _ => None,
        };
        Ok(Session {
            subject: user.id,
            email: user.email.clone(),
            role: user.role,
            status: user.status,
            boarder_id,
            method: AuthMethod::Password,
        })
    }

    /// Boarders added by a landlord have no account and count as approved;
    /// linked boarders carry their account's status.
    async fn access_code_session(&self, boarder: &Boarder) -> Result<Session, ApiError> {
        let status = match boarder.user_id {
            Some(user_id) => self
                .ctx
                .store
                .get_user(user_id)
                .await?
                .map_or(UserStatus::Approved, |user| user.status),
            None => UserStatus::Approved,
        };
        Ok(Session {
            subject: boarder.id,
            email: boarder.email.clone(),
            role: Role::Boarder,
            status,
            boarder_id: Some(boarder.id),
            method: AuthMethod::AccessCode,
        })
    }

    fn grant(&self, session: Session) -> Result<SessionGrant, ApiError> {
        let token = issue_token(&session, &self.config.security)?;
        let SessionView { session, redirect_to } = session.into();
        Ok(SessionGrant {
            token,
            session,
            redirect_to,
        })
    }
}
