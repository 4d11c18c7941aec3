//! User directory, login and the session state machine.
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::{Error, Result};
use crate::models::{Role, User, UserProfile};
use crate::store::{self, keys, Store};

pub mod hasher;

pub use hasher::{Argon2Hasher, PasswordHasher};

/// Email of the identity fabricated by [`admin_quick_login`]
pub const ADMIN_EMAIL: &str = "admin@holysmokes.com";

const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/avataaars/svg?seed=";

/// Body of a signup request
#[derive(Debug, Clone)]
pub struct Signup {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Who is using the storefront right now
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(UserProfile),
}

impl Session {
    /// Session left in the store by a previous run
    pub fn restore(store: &dyn Store) -> Result<Self> {
        Ok(match store::load::<UserProfile>(store, keys::SESSION)? {
            Some(profile) => {
                debug!("Restored session for {}", profile.email);
                Session::Authenticated(profile)
            }
            None => Session::Anonymous,
        })
    }

    /// Persist `profile` as the current user and switch to it
    pub fn begin(&mut self, store: &mut dyn Store, profile: UserProfile) -> Result<()> {
        store::save(store, keys::SESSION, &profile)?;
        info!("{} logged in as {:?}", profile.email, profile.role);
        *self = Session::Authenticated(profile);
        Ok(())
    }

    pub fn logout(&mut self, store: &mut dyn Store) -> Result<()> {
        store.remove(keys::SESSION)?;
        if let Session::Authenticated(profile) = self {
            info!("{} logged out", profile.email);
        }
        *self = Session::Anonymous;
        Ok(())
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated(profile) => Some(profile),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user().map_or(false, UserProfile::is_admin)
    }
}

/// Rewrite a session record left by a build that stored the whole user
///
/// Old records carry the plaintext password next to the profile. Only the
/// profile is written back.
pub fn upgrade_session(store: &mut dyn Store) -> Result<()> {
    let loaded = store::load_record(store, keys::SESSION, |value: Value| {
        Ok(serde_json::from_value::<UserProfile>(value)?)
    })?;
    if let Some(store::Loaded {
        value: profile,
        migrated: true,
    }) = loaded
    {
        warn!("Rewriting unversioned session record of {}", profile.email);
        store::save(store, keys::SESSION, &profile)?;
    }
    Ok(())
}

/// Check that `email` looks like `local@domain.tld`
pub fn validate_email(email: &str) -> Result<&str> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    let re = EMAIL
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
        .ok_or_else(|| Error::InvalidInput("email pattern failed to compile".to_string()))?;

    if re.is_match(email) {
        Ok(email)
    } else {
        Err(Error::InvalidInput(format!("'{}' is not a valid email", email)))
    }
}

/// All registered users
pub fn users(store: &dyn Store, hasher: &dyn PasswordHasher) -> Result<Vec<User>> {
    Ok(load_directory(store, hasher)?.value)
}

/// Rewrite a directory that still holds plaintext passwords
pub fn upgrade_directory(store: &mut dyn Store, hasher: &dyn PasswordHasher) -> Result<()> {
    let directory = load_directory(store, hasher)?;
    if directory.migrated {
        warn!(
            "Hashing plaintext passwords of {} stored users",
            directory.value.len()
        );
        store::save(store, keys::USERS, &directory.value)?;
    }
    Ok(())
}

/// Find the user with `email` whose password matches
pub fn login(
    store: &dyn Store,
    hasher: &dyn PasswordHasher,
    email: &str,
    password: &str,
) -> Result<User> {
    let users = users(store, hasher)?;
    let user = users
        .into_iter()
        .find(|user| user.email == email)
        .ok_or(Error::InvalidCredentials)?;

    if hasher.verify(password, &user.password_hash)? {
        Ok(user)
    } else {
        debug!("Wrong password for {email}");
        Err(Error::InvalidCredentials)
    }
}

/// Register a new user with the `user` role
///
/// The directory is left untouched when any check fails.
pub fn signup(store: &mut dyn Store, hasher: &dyn PasswordHasher, form: Signup) -> Result<User> {
    if form.password != form.confirm_password {
        return Err(Error::PasswordMismatch);
    }
    if form.name.trim().is_empty() {
        return Err(Error::InvalidInput("name must not be empty".to_string()));
    }
    validate_email(&form.email)?;

    let mut users = users(store, hasher)?;
    if users.iter().any(|user| user.email == form.email) {
        return Err(Error::EmailTaken);
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        name: form.name,
        avatar: Some(format!("{}{}", AVATAR_BASE_URL, form.email)),
        email: form.email,
        password_hash: hasher.hash(&form.password)?,
        role: Role::User,
    };
    users.push(user.clone());
    store::save(store, keys::USERS, &users)?;

    info!("New account for {}", user.email);
    Ok(user)
}

/// Admin identity that skips the directory entirely
///
/// This is a demo shortcut. Callers must gate it behind configuration.
pub fn admin_quick_login() -> UserProfile {
    UserProfile {
        id: Uuid::new_v4().to_string(),
        name: "Admin".to_string(),
        email: ADMIN_EMAIL.to_string(),
        role: Role::Admin,
        avatar: None,
    }
}

/// Directory entry as written before passwords were hashed
#[derive(Deserialize)]
struct LegacyUser {
    id: String,
    name: String,
    email: String,
    password: String,
    #[serde(default)]
    role: Role,
    #[serde(default)]
    avatar: Option<String>,
}

fn load_directory(
    store: &dyn Store,
    hasher: &dyn PasswordHasher,
) -> Result<store::Loaded<Vec<User>>> {
    let loaded = store::load_record(store, keys::USERS, |value: Value| {
        let legacy: Vec<LegacyUser> = serde_json::from_value(value)?;
        legacy
            .into_iter()
            .map(|user| {
                Ok(User {
                    password_hash: hasher.hash(&user.password)?,
                    id: user.id,
                    name: user.name,
                    email: user.email,
                    role: user.role,
                    avatar: user.avatar,
                })
            })
            .collect::<Result<Vec<_>>>()
    })?;

    Ok(loaded.unwrap_or(store::Loaded {
        value: Vec::new(),
        migrated: false,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mock::MemoryStore;

    fn form(email: &str, password: &str, confirm: &str) -> Signup {
        Signup {
            name: "Sam".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    fn setup() -> (MemoryStore, Argon2Hasher) {
        (MemoryStore::new().unwrap(), Argon2Hasher::insecure_fast())
    }

    #[test]
    fn test_signup_then_login() {
        let (mut store, hasher) = setup();
        let user = signup(&mut store, &hasher, form("sam@example.com", "pw1", "pw1")).unwrap();
        assert_eq!(user.role, Role::User);
        assert_ne!(user.password_hash, "pw1");
        assert_eq!(
            user.avatar.as_deref(),
            Some("https://api.dicebear.com/7.x/avataaars/svg?seed=sam@example.com")
        );

        let logged = login(&store, &hasher, "sam@example.com", "pw1").unwrap();
        assert_eq!(logged.id, user.id);
    }

    #[test]
    fn test_login_wrong_password() {
        let (mut store, hasher) = setup();
        signup(&mut store, &hasher, form("sam@example.com", "pw1", "pw1")).unwrap();

        assert!(matches!(
            login(&store, &hasher, "sam@example.com", "pw2"),
            Err(Error::InvalidCredentials)
        ));
        assert!(matches!(
            login(&store, &hasher, "nobody@example.com", "pw1"),
            Err(Error::InvalidCredentials)
        ));
    }

    #[test]
    fn test_signup_password_mismatch() {
        let (mut store, hasher) = setup();
        signup(&mut store, &hasher, form("a@example.com", "pw", "pw")).unwrap();
        let before = store.get(keys::USERS).unwrap();

        assert!(matches!(
            signup(&mut store, &hasher, form("b@example.com", "pw", "wp")),
            Err(Error::PasswordMismatch)
        ));
        assert_eq!(store.get(keys::USERS).unwrap(), before);
    }

    #[test]
    fn test_signup_email_taken() {
        let (mut store, hasher) = setup();
        signup(&mut store, &hasher, form("a@example.com", "pw", "pw")).unwrap();
        let before = store.get(keys::USERS).unwrap();

        assert!(matches!(
            signup(&mut store, &hasher, form("a@example.com", "other", "other")),
            Err(Error::EmailTaken)
        ));
        assert_eq!(store.get(keys::USERS).unwrap(), before);
        assert_eq!(users(&store, &hasher).unwrap().len(), 1);
    }

    #[test]
    fn test_signup_rejects_bad_input() {
        let (mut store, hasher) = setup();
        assert!(matches!(
            signup(&mut store, &hasher, form("not-an-email", "pw", "pw")),
            Err(Error::InvalidInput(_))
        ));

        let mut nameless = form("a@example.com", "pw", "pw");
        nameless.name = "  ".to_string();
        assert!(matches!(
            signup(&mut store, &hasher, nameless),
            Err(Error::InvalidInput(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("admin@holysmokes.com").is_ok());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("a b@c.d").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_plaintext_directory_is_migrated() {
        let (mut store, hasher) = setup();
        store
            .set(
                keys::USERS,
                r#"[{"id":"1700000000000","name":"Old","email":"old@example.com","password":"secret","role":"user"}]"#,
            )
            .unwrap();

        let user = login(&store, &hasher, "old@example.com", "secret").unwrap();
        assert_eq!(user.name, "Old");

        upgrade_directory(&mut store, &hasher).unwrap();
        let raw = store.get(keys::USERS).unwrap().unwrap();
        assert!(!raw.contains("secret"));
        assert!(raw.contains("password_hash"));
        assert!(login(&store, &hasher, "old@example.com", "secret").is_ok());
    }

    #[test]
    fn test_legacy_session_drops_password() {
        let (mut store, _) = setup();
        store
            .set(
                keys::SESSION,
                r#"{"id":"1","name":"Old","email":"old@example.com","password":"hunter2","role":"user"}"#,
            )
            .unwrap();

        upgrade_session(&mut store).unwrap();
        let raw = store.get(keys::SESSION).unwrap().unwrap();
        assert!(!raw.contains("hunter2"));

        let session = Session::restore(&store).unwrap();
        assert_eq!(session.user().unwrap().email, "old@example.com");
        assert!(!session.is_admin());

        upgrade_session(&mut store).unwrap();
        assert_eq!(store.get(keys::SESSION).unwrap().unwrap(), raw);
    }

    #[test]
    fn test_session_lifecycle() {
        let (mut store, _) = setup();
        let mut session = Session::restore(&store).unwrap();
        assert_eq!(session, Session::Anonymous);
        assert!(!session.is_admin());

        session.begin(&mut store, admin_quick_login()).unwrap();
        assert!(session.is_admin());
        assert_eq!(session.user().unwrap().email, ADMIN_EMAIL);

        let restored = Session::restore(&store).unwrap();
        assert_eq!(restored, session);

        session.logout(&mut store).unwrap();
        assert_eq!(session, Session::Anonymous);
        assert_eq!(Session::restore(&store).unwrap(), Session::Anonymous);
    }
}
