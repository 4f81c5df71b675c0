//! Service-account credential resolution.
//!
//! Credentials come from an ordered chain of sources. The first source that
//! yields a well-formed key wins; absent sources are skipped silently and
//! malformed ones are logged and skipped, so a broken secret mount does not
//! block a working fallback.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use intake_core::error::CoreError;

/// Platform secret-mount location.
pub const SECRET_FILE_PATH: &str = "/etc/secrets/credentials.json";
/// Local development fallback.
pub const DEFAULT_CREDENTIALS_PATH: &str = "./credentials.json";
/// Environment variable holding inline service-account JSON.
pub const INLINE_CREDENTIALS_VAR: &str = "GOOGLE_CREDENTIALS_JSON";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// The fields of a Google service-account key file this service uses.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(default)]
    pub client_email: String,
    #[serde(default)]
    pub private_key: String,
    pub private_key_id: Option<String>,
    pub project_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("private_key_id", &self.private_key_id)
            .field("project_id", &self.project_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    /// Parse and check a key; `origin` names the source in error messages.
    pub fn from_json(origin: &str, json: &str) -> Result<Self, CredentialError> {
        let key: Self =
            serde_json::from_str(json).map_err(|source| CredentialError::InvalidJson {
                origin: origin.to_string(),
                source,
            })?;

        for (field, value) in [
            ("client_email", &key.client_email),
            ("private_key", &key.private_key),
        ] {
            if value.trim().is_empty() {
                return Err(CredentialError::MissingField {
                    origin: origin.to_string(),
                    field,
                });
            }
        }

        jsonwebtoken::EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|source| {
            CredentialError::InvalidPrivateKey {
                origin: origin.to_string(),
                source,
            }
        })?;
        Ok(key)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Failed to read {origin}: {source}")]
    Io {
        origin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {origin}: {source}")]
    InvalidJson {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{origin} is missing required field `{field}`")]
    MissingField { origin: String, field: &'static str },

    #[error("{origin} has an unusable private key: {source}")]
    InvalidPrivateKey {
        origin: String,
        #[source]
        source: jsonwebtoken::errors::Error,
    },
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    SecretFile,
    InlineJson,
    LocalFile,
}

/// One place credentials may come from.
pub trait CredentialSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Human-readable location, used in logs and error messages.
    fn describe(&self) -> String;

    /// `Ok(None)` when the source is simply absent.
    fn load(&self) -> Result<Option<ServiceAccountKey>, CredentialError>;
}

/// A key file on disk.
pub struct FileSource {
    kind: SourceKind,
    path: PathBuf,
}

impl FileSource {
    pub fn secret_mount(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: SourceKind::SecretFile,
            path: path.into(),
        }
    }

    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: SourceKind::LocalFile,
            path: path.into(),
        }
    }
}

impl CredentialSource for FileSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn describe(&self) -> String {
        match self.kind {
            SourceKind::SecretFile => format!("secret file {}", self.path.display()),
            _ => format!("credentials file {}", self.path.display()),
        }
    }

    fn load(&self) -> Result<Option<ServiceAccountKey>, CredentialError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path).map_err(|source| CredentialError::Io {
            origin: self.describe(),
            source,
        })?;
        ServiceAccountKey::from_json(&self.describe(), &contents).map(Some)
    }
}

/// Service-account JSON passed inline, normally via `GOOGLE_CREDENTIALS_JSON`.
pub struct InlineJsonSource {
    json: Option<String>,
}

impl InlineJsonSource {
    pub fn new(json: Option<String>) -> Self {
        Self { json }
    }
}

impl CredentialSource for InlineJsonSource {
    fn kind(&self) -> SourceKind {
        SourceKind::InlineJson
    }

    fn describe(&self) -> String {
        INLINE_CREDENTIALS_VAR.to_string()
    }

    fn load(&self) -> Result<Option<ServiceAccountKey>, CredentialError> {
        match self.json.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(json) => ServiceAccountKey::from_json(&self.describe(), json).map(Some),
        }
    }
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ResolvedCredentials {
    pub key: ServiceAccountKey,
    pub source: SourceKind,
    pub origin: String,
}

pub struct CredentialChain {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialChain {
    pub fn new(sources: Vec<Box<dyn CredentialSource>>) -> Self {
        Self { sources }
    }

    /// Secret mount, then inline JSON, then the local file.
    pub fn standard(
        secret_file: impl Into<PathBuf>,
        inline_json: Option<String>,
        local_file: impl Into<PathBuf>,
    ) -> Self {
        Self::new(vec![
            Box::new(FileSource::secret_mount(secret_file)),
            Box::new(InlineJsonSource::new(inline_json)),
            Box::new(FileSource::local(local_file)),
        ])
    }

    /// Try each source in order and return the first valid key.
    pub fn resolve(&self) -> Result<ResolvedCredentials, CoreError> {
        let mut tried = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            let origin = source.describe();
            match source.load() {
                Ok(Some(key)) => {
                    tracing::info!(
                        source = %origin,
                        service_account = %key.client_email,
                        "Resolved Google credentials"
                    );
                    return Ok(ResolvedCredentials {
                        key,
                        source: source.kind(),
                        origin,
                    });
                }
                Ok(None) => {
                    tracing::debug!(source = %origin, "Credential source not present");
                    tried.push(format!("{origin} (not found)"));
                }
                Err(e) => {
                    tracing::warn!(source = %origin, error = %e, "Skipping malformed credential source");
                    tried.push(format!("{origin} ({e})"));
                }
            }
        }

        Err(CoreError::ConfigurationMissing(format!(
            "Google credentials not found. Checked: {}",
            tried.join("; ")
        )))
    }
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

/// Offline view of a credential file, for configuration reports.
#[derive(Debug, Clone, Serialize)]
pub struct FileInspection {
    pub path: String,
    pub exists: bool,
    pub valid: bool,
    pub service_email: Option<String>,
}

pub fn inspect_file(path: &Path) -> FileInspection {
    let exists = path.exists();
    let key = if exists {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|json| ServiceAccountKey::from_json(&path.display().to_string(), &json).ok())
    } else {
        None
    };

    FileInspection {
        path: path.display().to_string(),
        exists,
        valid: key.is_some(),
        service_email: key.map(|k| k.client_email),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use assert_matches::assert_matches;
    use tempfile::{NamedTempFile, TempDir};

    use super::*;

    fn key_json(email: &str) -> String {
        serde_json::json!({
            "type": "service_account",
            "project_id": "forms-prod",
            "private_key_id": "k1",
            "private_key": include_str!("../tests/fixtures/test_key.pem"),
            "client_email": email,
        })
        .to_string()
    }

    fn write_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn key_defaults_token_uri() {
        let key = ServiceAccountKey::from_json("test", &key_json("a@b.iam")).unwrap();
        assert_eq!(key.token_uri, "https://oauth2.googleapis.com/token");
        assert_eq!(key.project_id.as_deref(), Some("forms-prod"));
    }

    #[test]
    fn key_requires_email_and_private_key() {
        let err = ServiceAccountKey::from_json("test", r#"{"private_key":"x"}"#).unwrap_err();
        assert_matches!(err, CredentialError::MissingField { field: "client_email", .. });

        let err = ServiceAccountKey::from_json("test", r#"{"client_email":"a@b"}"#).unwrap_err();
        assert_matches!(err, CredentialError::MissingField { field: "private_key", .. });
    }

    #[test]
    fn debug_output_redacts_private_key() {
        let key = ServiceAccountKey::from_json("test", &key_json("a@b.iam")).unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("BEGIN PRIVATE KEY"));
    }

    #[test]
    fn secret_file_wins_when_valid() {
        let secret = write_file(&key_json("secret@proj.iam"));
        let chain = CredentialChain::standard(
            secret.path(),
            Some(key_json("inline@proj.iam")),
            "/nonexistent/credentials.json",
        );

        let resolved = chain.resolve().unwrap();
        assert_eq!(resolved.source, SourceKind::SecretFile);
        assert_eq!(resolved.key.client_email, "secret@proj.iam");
    }

    #[test]
    fn malformed_secret_falls_through_to_inline_json() {
        let secret = write_file("{ not json");
        let chain = CredentialChain::standard(
            secret.path(),
            Some(key_json("inline@proj.iam")),
            "/nonexistent/credentials.json",
        );

        let resolved = chain.resolve().unwrap();
        assert_eq!(resolved.source, SourceKind::InlineJson);
        assert_eq!(resolved.key.client_email, "inline@proj.iam");
    }

    #[test]
    fn key_rejects_unparseable_private_key() {
        let json = r#"{"client_email":"a@b.iam","private_key":"garbage not a pem"}"#;
        let err = ServiceAccountKey::from_json("test", json).unwrap_err();
        assert_matches!(err, CredentialError::InvalidPrivateKey { .. });
    }

    #[test]
    fn unusable_private_key_falls_through_to_inline_json() {
        let secret = write_file(
            &serde_json::json!({
                "client_email": "secret@proj.iam",
                "private_key": "garbage not a pem",
            })
            .to_string(),
        );
        let chain = CredentialChain::standard(
            secret.path(),
            Some(key_json("inline@proj.iam")),
            "/nonexistent/credentials.json",
        );

        let resolved = chain.resolve().unwrap();
        assert_eq!(resolved.source, SourceKind::InlineJson);
        assert_eq!(resolved.key.client_email, "inline@proj.iam");
    }

    #[test]
    fn local_file_is_last_resort() {
        let dir = TempDir::new().unwrap();
        let local = dir.path().join("credentials.json");
        std::fs::write(&local, key_json("local@proj.iam")).unwrap();

        let chain = CredentialChain::standard(dir.path().join("missing.json"), None, &local);
        let resolved = chain.resolve().unwrap();
        assert_eq!(resolved.source, SourceKind::LocalFile);
    }

    #[test]
    fn blank_inline_json_counts_as_absent() {
        let source = InlineJsonSource::new(Some("   ".into()));
        assert!(source.load().unwrap().is_none());
    }

    #[test]
    fn exhausted_chain_is_configuration_missing() {
        let chain = CredentialChain::standard(
            "/nonexistent/secret.json",
            Some("not json".into()),
            "/nonexistent/credentials.json",
        );

        assert_matches!(chain.resolve(), Err(CoreError::ConfigurationMissing(msg)) => {
            assert!(msg.contains("secret file /nonexistent/secret.json (not found)"));
            assert!(msg.contains("Invalid JSON in GOOGLE_CREDENTIALS_JSON"));
            assert!(msg.contains("credentials file /nonexistent/credentials.json"));
        });
    }

    #[test]
    fn inspection_reports_service_email() {
        let file = write_file(&key_json("svc@proj.iam"));
        let report = inspect_file(file.path());
        assert!(report.exists);
        assert!(report.valid);
        assert_eq!(report.service_email.as_deref(), Some("svc@proj.iam"));

        let missing = inspect_file(Path::new("/nonexistent/secret.json"));
        assert!(!missing.exists);
        assert!(!missing.valid);
    }
}
