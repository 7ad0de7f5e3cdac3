//! Hugging Face credential resolution.
//!
//! A token is looked up from an ordered list of sources and the first
//! present value wins. The standard order is the secrets file entry
//! `HF_TOKEN`, then the `HUGGINGFACEHUB_API_TOKEN` environment variable.

use std::path::{Path, PathBuf};

/// Key looked up in the secrets file.
pub const SECRETS_TOKEN_KEY: &str = "HF_TOKEN";

/// Environment variable consulted after the secrets file.
pub const TOKEN_ENV_VAR: &str = "HUGGINGFACEHUB_API_TOKEN";

/// Environment variable overriding the secrets file location.
pub const SECRETS_PATH_ENV_VAR: &str = "TEXT2IMAGE_SECRETS";

/// Default secrets file location, relative to the working directory.
pub const DEFAULT_SECRETS_PATH: &str = ".text2image/secrets.toml";

/// An opaque bearer token. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a token. Blank tokens count as absent.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Returns the raw token for use in an `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// A place a credential may be read from.
pub trait CredentialSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Reads the credential. Absence and read failures both return `None`.
    fn lookup(&self) -> Option<Credential>;
}

/// TOML secrets file holding an `HF_TOKEN = "hf_..."` entry.
#[derive(Debug, Clone)]
pub struct SecretsStore {
    path: PathBuf,
}

impl SecretsStore {
    /// Uses the secrets file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses `TEXT2IMAGE_SECRETS` if set, otherwise the default location.
    pub fn from_env() -> Self {
        let path = std::env::var(SECRETS_PATH_ENV_VAR)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SECRETS_PATH.to_string());
        Self::new(path)
    }

    /// Returns the secrets file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads a string entry from the secrets file.
    pub fn get(&self, key: &str) -> Option<String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no secrets file");
                return None;
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "cannot read secrets file: {e}");
                return None;
            }
        };

        let table: toml::Table = match toml::from_str(&content) {
            Ok(table) => table,
            Err(_) => {
                // The parse error may quote file contents, so it is not logged.
                tracing::warn!(path = %self.path.display(), "malformed secrets file");
                return None;
            }
        };

        table.get(key).and_then(|v| v.as_str()).map(str::to_string)
    }
}

impl Default for SecretsStore {
    fn default() -> Self {
        Self::from_env()
    }
}

impl CredentialSource for SecretsStore {
    fn name(&self) -> &str {
        "secrets"
    }

    fn lookup(&self) -> Option<Credential> {
        self.get(SECRETS_TOKEN_KEY).and_then(Credential::new)
    }
}

/// Environment variable holding the token.
#[derive(Debug, Clone)]
pub struct EnvVar {
    name: String,
}

impl EnvVar {
    /// Reads the variable `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for EnvVar {
    fn default() -> Self {
        Self::new(TOKEN_ENV_VAR)
    }
}

impl CredentialSource for EnvVar {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self) -> Option<Credential> {
        std::env::var(&self.name).ok().and_then(Credential::new)
    }
}

struct FnSource<F> {
    name: String,
    lookup: F,
}

impl<F> CredentialSource for FnSource<F>
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self) -> Option<Credential> {
        (self.lookup)().and_then(Credential::new)
    }
}

/// Ordered list of credential sources.
pub struct CredentialResolver {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialResolver {
    /// Creates a resolver with no sources.
    pub fn empty() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Secrets file first, then `HUGGINGFACEHUB_API_TOKEN`.
    pub fn standard(secrets: SecretsStore) -> Self {
        Self::empty().with_source(secrets).with_source(EnvVar::default())
    }

    /// Appends a source with the lowest priority so far.
    pub fn with_source(mut self, source: impl CredentialSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Appends a closure source with the lowest priority so far.
    pub fn with_source_fn<F>(self, name: impl Into<String>, lookup: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        self.with_source(FnSource {
            name: name.into(),
            lookup,
        })
    }

    /// Returns the first credential any source yields.
    pub fn resolve(&self) -> Option<Credential> {
        for source in &self.sources {
            if let Some(credential) = source.lookup() {
                tracing::debug!(source = source.name(), "resolved Hugging Face token");
                return Some(credential);
            }
        }
        tracing::debug!(sources = self.sources.len(), "no Hugging Face token found");
        None
    }
}

impl Default for CredentialResolver {
    fn default() -> Self {
        Self::standard(SecretsStore::from_env())
    }
}

impl std::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.sources.iter().map(|s| s.name()).collect();
        f.debug_struct("CredentialResolver")
            .field("sources", &names)
            .finish()
    }
}

/// Resolves a token from the standard sources.
pub fn resolve_credential() -> Option<Credential> {
    CredentialResolver::default().resolve()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn secrets_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_blank_credential_is_absent() {
        assert!(Credential::new("").is_none());
        assert!(Credential::new("   ").is_none());
        assert_eq!(Credential::new(" hf_abc ").unwrap().expose(), "hf_abc");
    }

    #[test]
    fn test_debug_is_redacted() {
        let credential = Credential::new("hf_secret").unwrap();
        let shown = format!("{credential:?}");
        assert!(!shown.contains("hf_secret"));
    }

    #[test]
    fn test_secrets_store_reads_token() {
        let file = secrets_file("HF_TOKEN = 'hf_from_file'\nOTHER = 1\n");
        let store = SecretsStore::new(file.path());
        assert_eq!(store.lookup().unwrap().expose(), "hf_from_file");
    }

    #[test]
    fn test_secrets_store_missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SecretsStore::new(dir.path().join("nope.toml"));
        assert!(store.lookup().is_none());
    }

    #[test]
    fn test_secrets_store_malformed_or_missing_key_is_absent() {
        let file = secrets_file("HF_TOKEN = ");
        assert!(SecretsStore::new(file.path()).lookup().is_none());

        let file = secrets_file("OTHER_TOKEN = 'x'");
        assert!(SecretsStore::new(file.path()).lookup().is_none());

        let file = secrets_file("HF_TOKEN = 42");
        assert!(SecretsStore::new(file.path()).lookup().is_none());
    }

    #[test]
    fn test_env_var_source() {
        std::env::set_var("TEXT2IMAGE_TEST_ENV_SOURCE", "hf_from_env");
        let source = EnvVar::new("TEXT2IMAGE_TEST_ENV_SOURCE");
        assert_eq!(source.lookup().unwrap().expose(), "hf_from_env");

        std::env::set_var("TEXT2IMAGE_TEST_ENV_SOURCE", "");
        assert!(source.lookup().is_none());
        std::env::remove_var("TEXT2IMAGE_TEST_ENV_SOURCE");
    }

    #[test]
    fn test_secrets_take_priority_over_env() {
        let file = secrets_file("HF_TOKEN = 'hf_secrets'");
        std::env::set_var("TEXT2IMAGE_TEST_PRIORITY", "hf_env");

        let resolver = CredentialResolver::empty()
            .with_source(SecretsStore::new(file.path()))
            .with_source(EnvVar::new("TEXT2IMAGE_TEST_PRIORITY"));
        assert_eq!(resolver.resolve().unwrap().expose(), "hf_secrets");

        std::env::remove_var("TEXT2IMAGE_TEST_PRIORITY");
    }

    // The only test touching the real token and secrets-path variables.
    #[test]
    fn test_standard_sources_in_order() {
        let file = secrets_file("HF_TOKEN = 'hf_secrets'");
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("secrets.toml");
        std::env::set_var(TOKEN_ENV_VAR, "hf_env");

        std::env::set_var(SECRETS_PATH_ENV_VAR, file.path());
        assert_eq!(
            CredentialResolver::standard(SecretsStore::new(file.path()))
                .resolve()
                .unwrap()
                .expose(),
            "hf_secrets"
        );
        assert_eq!(resolve_credential().unwrap().expose(), "hf_secrets");

        std::env::set_var(SECRETS_PATH_ENV_VAR, &missing);
        assert_eq!(
            CredentialResolver::standard(SecretsStore::new(&missing))
                .resolve()
                .unwrap()
                .expose(),
            "hf_env"
        );
        assert_eq!(resolve_credential().unwrap().expose(), "hf_env");

        std::env::remove_var(TOKEN_ENV_VAR);
        assert!(CredentialResolver::standard(SecretsStore::new(&missing))
            .resolve()
            .is_none());
        assert!(resolve_credential().is_none());

        std::env::remove_var(SECRETS_PATH_ENV_VAR);
    }

    #[test]
    fn test_falls_back_to_later_source() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = CredentialResolver::empty()
            .with_source(SecretsStore::new(dir.path().join("missing.toml")))
            .with_source_fn("fallback", || Some("hf_fallback".to_string()));
        assert_eq!(resolver.resolve().unwrap().expose(), "hf_fallback");
    }

    #[test]
    fn test_no_sources_yield_absent() {
        let resolver = CredentialResolver::empty()
            .with_source_fn("a", || None)
            .with_source_fn("b", || Some("  ".to_string()));
        assert!(resolver.resolve().is_none());
        assert!(CredentialResolver::empty().resolve().is_none());
    }

    #[test]
    fn test_resolver_debug_lists_source_names() {
        let resolver = CredentialResolver::empty()
            .with_source_fn("first", || Some("hf_hidden".to_string()))
            .with_source(EnvVar::new("SOME_VAR"));
        let shown = format!("{resolver:?}");
        assert!(shown.contains("first"));
        assert!(shown.contains("SOME_VAR"));
        assert!(!shown.contains("hf_hidden"));
    }
}
