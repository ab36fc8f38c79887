//! `users`, `profiles` and `sessions` tables.

use rusqlite::{params, ErrorCode, OptionalExtension};
use tracing::debug;

use super::{format_timestamp, parse_timestamp, Storage};
use crate::auth::{Profile, Session, User};
use crate::error::{Error, Result};

/// A user row together with its credential material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Public part of the account.
    pub user: User,
    /// Hex-encoded password hash.
    pub password_hash: String,
    /// Per-user salt mixed into the hash.
    pub salt: String,
}

impl Storage {
    /// Create an account and its (non-admin) profile.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserExists`] if the email is taken, or a database error.
    pub fn insert_user(&self, record: &UserRecord) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let inserted = tx.execute(
            r"
            INSERT INTO users (id, email, password_hash, salt, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                record.user.id,
                record.user.email,
                record.password_hash,
                record.salt,
                format_timestamp(record.user.created_at),
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                return Err(Error::UserExists);
            }
            Err(e) => return Err(e.into()),
        }

        tx.execute(
            "INSERT INTO profiles (id, is_admin) VALUES (?1, 0)",
            [&record.user.id],
        )?;
        tx.commit()?;

        debug!(user_id = %record.user.id, "created user");
        Ok(())
    }

    /// Look up an account by email, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let record = self
            .conn
            .query_row(
                r"
                SELECT id, email, created_at, password_hash, salt
                FROM users WHERE email = ?1
                ",
                [email],
                |row| {
                    Ok(UserRecord {
                        user: Self::row_to_user(row)?,
                        password_hash: row.get(3)?,
                        salt: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Get the profile of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let profile = self
            .conn
            .query_row(
                "SELECT id, is_admin FROM profiles WHERE id = ?1",
                [user_id],
                |row| {
                    Ok(Profile {
                        id: row.get(0)?,
                        is_admin: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(profile)
    }

    /// Set or clear the admin flag. Returns whether the profile exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_admin(&self, user_id: &str, is_admin: bool) -> Result<bool> {
        let affected = self.conn.execute(
            "UPDATE profiles SET is_admin = ?2 WHERE id = ?1",
            params![user_id, is_admin],
        )?;
        Ok(affected > 0)
    }

    /// Record a new session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_session(&self, session: &Session) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sessions (token, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![
                session.token,
                session.user_id,
                format_timestamp(session.created_at)
            ],
        )?;
        Ok(())
    }

    /// Get the user a session token belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn session_user(&self, token: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                r"
                SELECT u.id, u.email, u.created_at
                FROM sessions s JOIN users u ON u.id = s.user_id
                WHERE s.token = ?1
                ",
                [token],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// End a session. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_session(&self, token: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM sessions WHERE token = ?1", [token])?;
        Ok(affected > 0)
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let created_at: String = row.get(2)?;
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            created_at: parse_timestamp(&created_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn record(id: &str, email: &str) -> UserRecord {
        UserRecord {
            user: User {
                id: id.to_string(),
                email: email.to_string(),
                created_at: Utc::now(),
            },
            password_hash: "hash".to_string(),
            salt: "salt".to_string(),
        }
    }

    #[test]
    fn test_insert_and_find_user() {
        let storage = Storage::open_in_memory().unwrap();
        storage.insert_user(&record("u1", "ana@studio.test")).unwrap();

        let found = storage.find_user_by_email("ANA@studio.test").unwrap().unwrap();
        assert_eq!(found.user.id, "u1");
        assert_eq!(found.salt, "salt");

        let profile = storage.get_profile("u1").unwrap().unwrap();
        assert!(!profile.is_admin);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let storage = Storage::open_in_memory().unwrap();
        storage.insert_user(&record("u1", "ana@studio.test")).unwrap();
        let err = storage
            .insert_user(&record("u2", "Ana@Studio.test"))
            .unwrap_err();
        assert!(matches!(err, Error::UserExists));
        assert!(storage.get_profile("u2").unwrap().is_none());
    }

    #[test]
    fn test_set_admin() {
        let storage = Storage::open_in_memory().unwrap();
        storage.insert_user(&record("u1", "ana@studio.test")).unwrap();
        assert!(storage.set_admin("u1", true).unwrap());
        assert!(storage.get_profile("u1").unwrap().unwrap().is_admin);
        assert!(!storage.set_admin("missing", true).unwrap());
    }

    #[test]
    fn test_sessions() {
        let storage = Storage::open_in_memory().unwrap();
        storage.insert_user(&record("u1", "ana@studio.test")).unwrap();
        storage
            .insert_session(&Session {
                token: "tok".to_string(),
                user_id: "u1".to_string(),
                created_at: Utc::now(),
            })
            .unwrap();

        assert_eq!(storage.session_user("tok").unwrap().unwrap().id, "u1");
        assert!(storage.session_user("other").unwrap().is_none());
        assert!(storage.delete_session("tok").unwrap());
        assert!(storage.session_user("tok").unwrap().is_none());
    }
}
