//! Identity provider and the admin gate.
//!
//! Accounts are email/password pairs. Passwords are stored as a salted BLAKE3
//! key derivation stretched over [`PASSWORD_ROUNDS`] keyed rounds, prefixed
//! with the round count; sessions are opaque random tokens. The admin gate lets a
//! session through only when its profile carries the admin flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::status::Status;
use crate::storage::{Storage, UserRecord};

const PASSWORD_CONTEXT: &str = "atelier 2024-06-01 password hash v1";

/// Keyed BLAKE3 rounds applied to every new password hash.
pub const PASSWORD_ROUNDS: u32 = 20_000;

/// Stored round counts above this are treated as corrupt.
const MAX_PASSWORD_ROUNDS: u32 = 10_000_000;

/// A signed-up account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Account id.
    pub id: String,
    /// Sign-in email.
    pub email: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Per-account settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Same as the user id.
    pub id: String,
    /// Whether the account may use the admin tools.
    pub is_admin: bool,
}

/// An open session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token.
    pub token: String,
    /// Account the session belongs to.
    pub user_id: String,
    /// When the session was opened.
    pub created_at: DateTime<Utc>,
}

/// Trimmed, non-empty email and password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Trim both inputs and require them to be present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredentials`] if either is blank.
    pub fn new(email: &str, password: &str) -> Result<Self> {
        let email = email.trim();
        let password = password.trim();
        if email.is_empty() || password.is_empty() {
            return Err(Error::MissingCredentials);
        }
        Ok(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }

    /// The email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Identity operations over the account tables.
#[derive(Debug, Clone, Copy)]
pub struct Auth<'a> {
    storage: &'a Storage,
}

impl<'a> Auth<'a> {
    /// Operate on `storage`.
    #[must_use]
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create an account with a non-admin profile and open a session for it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserExists`] when the email is taken, or a storage error.
    pub fn sign_up(&self, credentials: &Credentials) -> Result<Session> {
        let salt = Uuid::new_v4().simple().to_string();
        let record = UserRecord {
            user: User {
                id: Uuid::new_v4().to_string(),
                email: credentials.email.clone(),
                created_at: Utc::now(),
            },
            password_hash: hash_password(&salt, &credentials.password),
            salt,
        };
        self.storage.insert_user(&record)?;
        info!(user_id = %record.user.id, "signed up");
        self.open_session(&record.user)
    }

    /// Check a password and open a session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredentials`] when the email is unknown or the
    /// password does not match.
    pub fn sign_in(&self, credentials: &Credentials) -> Result<Session> {
        let Some(record) = self.storage.find_user_by_email(&credentials.email)? else {
            debug!("sign-in for unknown email");
            return Err(Error::InvalidCredentials);
        };
        if !verify_password(&record.salt, &credentials.password, &record.password_hash) {
            warn!(user_id = %record.user.id, "wrong password");
            return Err(Error::InvalidCredentials);
        }
        self.open_session(&record.user)
    }

    /// End a session. Returns whether it was open.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn sign_out(&self, token: &str) -> Result<bool> {
        self.storage.delete_session(token)
    }

    /// The user behind a session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn current_user(&self, token: &str) -> Result<Option<User>> {
        self.storage.session_user(token)
    }

    /// The profile of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn profile(&self, user: &User) -> Result<Option<Profile>> {
        self.storage.get_profile(&user.id)
    }

    /// Give the account with `email` admin rights.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no account uses the email.
    pub fn grant_admin(&self, email: &str) -> Result<User> {
        let email = email.trim();
        let Some(record) = self.storage.find_user_by_email(email)? else {
            return Err(Error::NotFound {
                what: "user",
                id: email.to_string(),
            });
        };
        self.storage.set_admin(&record.user.id, true)?;
        info!(user_id = %record.user.id, "granted admin");
        Ok(record.user)
    }

    fn open_session(&self, user: &User) -> Result<Session> {
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            user_id: user.id.clone(),
            created_at: Utc::now(),
        };
        self.storage.insert_session(&session)?;
        debug!(user_id = %user.id, "opened session");
        Ok(session)
    }
}

/// Outcome of the admin gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Show only the sign-in view, with an optional message.
    SignIn {
        /// Message to show above the form.
        status: Option<Status>,
    },
    /// Show the admin tools.
    Admin {
        /// The signed-in administrator.
        user: User,
    },
}

/// Decide what a session may see of the admin panel.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn admin_gate(storage: &Storage, token: Option<&str>) -> Result<Access> {
    let auth = Auth::new(storage);
    let Some(user) = token.map(|t| auth.current_user(t)).transpose()?.flatten() else {
        return Ok(Access::SignIn { status: None });
    };

    let is_admin = auth.profile(&user)?.is_some_and(|p| p.is_admin);
    if is_admin {
        Ok(Access::Admin { user })
    } else {
        debug!(user_id = %user.id, "admin access denied");
        Ok(Access::SignIn {
            status: Some(Status::from_error(&Error::Forbidden)),
        })
    }
}

/// The signed-in user.
///
/// # Errors
///
/// Returns [`Error::NotSignedIn`] without a valid session.
pub fn require_user(storage: &Storage, token: Option<&str>) -> Result<User> {
    let Some(token) = token else {
        return Err(Error::NotSignedIn);
    };
    Auth::new(storage)
        .current_user(token)?
        .ok_or(Error::NotSignedIn)
}

/// The signed-in administrator.
///
/// # Errors
///
/// Returns [`Error::NotSignedIn`] without a valid session and
/// [`Error::Forbidden`] for a non-admin one.
pub fn require_admin(storage: &Storage, token: Option<&str>) -> Result<User> {
    match admin_gate(storage, token)? {
        Access::Admin { user } => Ok(user),
        Access::SignIn { status: Some(_) } => Err(Error::Forbidden),
        Access::SignIn { status: None } => Err(Error::NotSignedIn),
    }
}

fn hash_password(salt: &str, password: &str) -> String {
    let hash = stretch(salt, password, PASSWORD_ROUNDS);
    format!("{PASSWORD_ROUNDS}${}", hash.to_hex())
}

/// Check `password` against a stored `rounds$hex` hash. A bare hex hash is
/// a single round.
fn verify_password(salt: &str, password: &str, stored: &str) -> bool {
    let (rounds, hex) = match stored.split_once('$') {
        Some((rounds, hex)) => match rounds.parse::<u32>() {
            Ok(rounds) if (1..=MAX_PASSWORD_ROUNDS).contains(&rounds) => (rounds, hex),
            _ => return false,
        },
        None => (1, stored),
    };
    let Ok(expected) = blake3::Hash::from_hex(hex) else {
        return false;
    };
    stretch(salt, password, rounds) == expected
}

fn stretch(salt: &str, password: &str, rounds: u32) -> blake3::Hash {
    let mut material = Vec::with_capacity(salt.len() + password.len());
    material.extend_from_slice(salt.as_bytes());
    material.extend_from_slice(password.as_bytes());
    let key = blake3::derive_key(PASSWORD_CONTEXT, &material);

    let mut hash = blake3::Hash::from(key);
    for _ in 1..rounds {
        hash = blake3::keyed_hash(&key, hash.as_bytes());
    }
    hash
}
