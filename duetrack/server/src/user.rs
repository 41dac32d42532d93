use crate::entities::*;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use duetrack_core::UserId;
use sea_orm::*;

/// Length of the `users.username` column.
pub const MAX_USERNAME_LEN: usize = 80;

/// A registered user, without credentials.
#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub struct User {
    id: UserId,
    username: String,
}

impl User {
    pub fn new(id: UserId, username: String) -> Self {
        Self { id, username }
    }

    /// Returns the ID of the user.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the username.
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl From<user::Model> for User {
    fn from(model: user::Model) -> Self {
        User::new(model.id, model.username)
    }
}

/// Error type for UserService operations.
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("Username '{0}' is already taken")]
    DuplicateUsername(String),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("User with ID {0} not found")]
    UserNotFound(UserId),
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl From<argon2::password_hash::Error> for UserServiceError {
    fn from(err: argon2::password_hash::Error) -> Self {
        UserServiceError::PasswordHash(err.to_string())
    }
}

pub struct UserService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl UserService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> UserService<'_> {
        UserService { db }
    }

    /// Registers a new user with a salted argon2 password hash.
    ///
    /// # Arguments
    ///
    /// * `username` - The desired username. Surrounding whitespace is ignored.
    /// * `password` - The plain-text password.
    ///
    /// # Returns
    ///
    /// The created `User`, or `DuplicateUsername` if the name is taken.
    #[tracing::instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<User, UserServiceError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(UserServiceError::InvalidInput(
                "username must not be empty".to_string(),
            ));
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(UserServiceError::InvalidInput(format!(
                "username must be at most {} characters",
                MAX_USERNAME_LEN
            )));
        }
        if password.is_empty() {
            return Err(UserServiceError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }
        if self.find_by_username(username).await?.is_some() {
            return Err(UserServiceError::DuplicateUsername(username.to_string()));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)?
            .to_string();

        let active_model = user::ActiveModel {
            username: ActiveValue::Set(username.to_string()),
            password_hash: ActiveValue::Set(password_hash),
            ..Default::default()
        };
        let created_model = active_model
            .insert(self.db)
            .await
            .map_err(|err| insert_error(err, username))?;
        tracing::info!("Registered user {}", created_model.id);
        Ok(User::from(created_model))
    }

    /// Checks a username and password pair.
    ///
    /// Unknown users and wrong passwords are both reported as `InvalidCredentials`.
    #[tracing::instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, UserServiceError> {
        let model = self
            .find_by_username(username.trim())
            .await?
            .ok_or(UserServiceError::InvalidCredentials)?;

        let parsed_hash = PasswordHash::new(&model.password_hash)?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(User::from(model)),
            Err(argon2::password_hash::Error::Password) => {
                Err(UserServiceError::InvalidCredentials)
            }
            Err(err) => Err(UserServiceError::from(err)),
        }
    }

    /// Retrieves a user by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_user_by_id(&self, id: UserId) -> Result<User, UserServiceError> {
        let model = user::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(UserServiceError::UserNotFound(id))?;
        Ok(User::from(model))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<user::Model>, DbErr> {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db)
            .await
    }
}

/// A unique violation here means a concurrent registration took the name
/// between the lookup and the insert.
fn insert_error(err: DbErr, username: &str) -> UserServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::info!("Lost registration race for '{}'", username);
            UserServiceError::DuplicateUsername(username.to_string())
        }
        _ => UserServiceError::Database(err),
    }
}
