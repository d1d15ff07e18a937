//! Session cookie settings read from the environment.
//!
//! Debug builds fall back to permissive defaults with a warning; release
//! builds refuse to start unless every toggle is present and valid.

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroize;

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
// `Key::derive_from` panics below this length.
const KEY_DERIVE_MIN_LEN: usize = 32;
const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Whether configuration is validated leniently or strictly.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Defaults with warnings.
    Debug,
    /// Every toggle required.
    Release,
}

impl BuildMode {
    /// Mode matching `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// Validated cookie-session settings.
pub struct SessionSettings {
    /// Signing key for the session cookie.
    pub key: Key,
    /// Whether the cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
    /// `SameSite` policy for the cookie.
    pub same_site: SameSite,
}

/// Invalid or missing session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A required variable is unset.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable holds an unparseable value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// The key file could not be read.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The key file is shorter than the release minimum.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` without `Secure`.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Ephemeral keys requested in a release build.
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Read and validate the session toggles.
///
/// # Examples
/// ```
/// use cadence::inbound::http::session_config::{BuildMode, session_settings_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|_| None);
///
/// let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
/// assert!(settings.cookie_secure);
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = read_toggle(env, mode, COOKIE_SECURE_ENV, true)?;
    let same_site = same_site_from_env(env, mode, cookie_secure)?;
    let allow_ephemeral = read_toggle(env, mode, ALLOW_EPHEMERAL_ENV, false)?;
    if allow_ephemeral && mode == BuildMode::Release {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let key = session_key(env, mode, allow_ephemeral)?;
    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

fn read_toggle<E: Env>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    debug_default: bool,
) -> Result<bool, SessionConfigError> {
    let Some(value) = env.string(name) else {
        return lenient(mode, SessionConfigError::MissingEnv { name }, debug_default);
    };
    match parse_bool(&value) {
        Some(flag) => Ok(flag),
        None => lenient(
            mode,
            SessionConfigError::InvalidEnv {
                name,
                value,
                expected: BOOL_EXPECTED,
            },
            debug_default,
        ),
    }
}

fn same_site_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let Some(value) = env.string(SAMESITE_ENV) else {
        return lenient(
            mode,
            SessionConfigError::MissingEnv { name: SAMESITE_ENV },
            SameSite::Lax,
        );
    };
    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" => lenient(mode, SessionConfigError::InsecureSameSiteNone, SameSite::None),
        _ => lenient(
            mode,
            SessionConfigError::InvalidEnv {
                name: SAMESITE_ENV,
                value,
                expected: SAMESITE_EXPECTED,
            },
            SameSite::Lax,
        ),
    }
}

fn session_key<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned()),
    );
    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            let key = if length >= SESSION_KEY_MIN_LEN
                || (mode == BuildMode::Debug && length >= KEY_DERIVE_MIN_LEN)
            {
                Ok(Key::derive_from(&bytes))
            } else if mode == BuildMode::Debug {
                warn!(
                    path = %path.display(),
                    length,
                    "session key too short to derive from; using temporary session key"
                );
                Ok(Key::generate())
            } else {
                Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                })
            };
            bytes.zeroize();
            key
        }
        Err(source) if mode == BuildMode::Debug || allow_ephemeral => {
            warn!(path = %path.display(), error = %source, "using temporary session key");
            Ok(Key::generate())
        }
        Err(source) => Err(SessionConfigError::KeyRead { path, source }),
    }
}

fn lenient<T>(mode: BuildMode, error: SessionConfigError, fallback: T) -> Result<T, SessionConfigError> {
    match mode {
        BuildMode::Debug => {
            warn!(%error, "session configuration fallback applied");
            Ok(fallback)
        }
        BuildMode::Release => Err(error),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use mockable::MockEnv;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    use super::*;

    fn key_file(len: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp key file");
        file.write_all(&vec![b'k'; len]).expect("write key");
        file
    }

    fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
        let mut env = MockEnv::new();
        env.expect_string()
            .times(0..)
            .returning(move |key| vars.get(key).cloned());
        env
    }

    fn release_vars(key: &NamedTempFile) -> HashMap<&'static str, String> {
        HashMap::from([
            (KEY_FILE_ENV, key.path().display().to_string()),
            (COOKIE_SECURE_ENV, "1".to_owned()),
            (SAMESITE_ENV, "Strict".to_owned()),
            (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
        ])
    }

    #[test]
    fn release_accepts_complete_configuration() {
        let key = key_file(SESSION_KEY_MIN_LEN);
        let env = mock_env(release_vars(&key));

        let settings = session_settings_from_env(&env, BuildMode::Release).expect("valid");

        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Strict);
    }

    #[rstest]
    #[case(COOKIE_SECURE_ENV)]
    #[case(SAMESITE_ENV)]
    #[case(ALLOW_EPHEMERAL_ENV)]
    fn release_requires_every_toggle(#[case] missing: &'static str) {
        let key = key_file(SESSION_KEY_MIN_LEN);
        let mut vars = release_vars(&key);
        vars.remove(missing);

        let err = session_settings_from_env(&mock_env(vars), BuildMode::Release)
            .err()
            .expect("missing toggle");

        assert!(matches!(err, SessionConfigError::MissingEnv { name } if name == missing));
    }

    #[test]
    fn release_rejects_short_keys() {
        let key = key_file(16);
        let env = mock_env(release_vars(&key));

        let err = session_settings_from_env(&env, BuildMode::Release)
            .err()
            .expect("short key");

        assert!(matches!(err, SessionConfigError::KeyTooShort { length: 16, .. }));
    }

    #[test]
    fn release_rejects_insecure_same_site_none() {
        let key = key_file(SESSION_KEY_MIN_LEN);
        let mut vars = release_vars(&key);
        vars.insert(COOKIE_SECURE_ENV, "0".to_owned());
        vars.insert(SAMESITE_ENV, "None".to_owned());

        let err = session_settings_from_env(&mock_env(vars), BuildMode::Release)
            .err()
            .expect("insecure");

        assert!(matches!(err, SessionConfigError::InsecureSameSiteNone));
    }

    #[test]
    fn release_refuses_ephemeral_keys() {
        let key = key_file(SESSION_KEY_MIN_LEN);
        let mut vars = release_vars(&key);
        vars.insert(ALLOW_EPHEMERAL_ENV, "yes".to_owned());

        let err = session_settings_from_env(&mock_env(vars), BuildMode::Release)
            .err()
            .expect("ephemeral");

        assert!(matches!(err, SessionConfigError::EphemeralNotAllowed));
    }

    #[test]
    fn debug_defaults_to_secure_lax_and_generated_key() {
        let vars = HashMap::from([(KEY_FILE_ENV, "/nonexistent/session_key".to_owned())]);

        let settings =
            session_settings_from_env(&mock_env(vars), BuildMode::Debug).expect("defaults");

        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Lax);
    }

    #[rstest]
    #[case("maybe", true)]
    #[case("FALSE", false)]
    #[case(" no ", false)]
    fn debug_tolerates_odd_secure_values(#[case] raw: &str, #[case] expected: bool) {
        let key = key_file(8);
        let vars = HashMap::from([
            (KEY_FILE_ENV, key.path().display().to_string()),
            (COOKIE_SECURE_ENV, raw.to_owned()),
        ]);

        let settings =
            session_settings_from_env(&mock_env(vars), BuildMode::Debug).expect("lenient");

        assert_eq!(settings.cookie_secure, expected);
    }

    fn debug_key(file: &NamedTempFile) -> Key {
        let vars = HashMap::from([(KEY_FILE_ENV, file.path().display().to_string())]);
        session_settings_from_env(&mock_env(vars), BuildMode::Debug)
            .expect("debug settings")
            .key
    }

    #[test]
    fn debug_replaces_undersized_keys_with_a_temporary_one() {
        let file = key_file(8);

        let first = debug_key(&file);
        let second = debug_key(&file);

        assert_ne!(first.master(), second.master());
    }

    #[test]
    fn debug_derives_from_keys_long_enough_for_derivation() {
        let file = key_file(KEY_DERIVE_MIN_LEN);

        let first = debug_key(&file);
        let second = debug_key(&file);

        assert_eq!(first.master(), second.master());
    }
}
