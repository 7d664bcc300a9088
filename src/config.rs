use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::alphabet::{Alphabet, AlphabetError};

/// A single alphabet definition loaded from TOML.
#[derive(Debug, Deserialize, Clone)]
pub struct AlphabetConfig {
    /// The ordered symbol characters
    pub symbols: String,
    /// Optional padding character (e.g. "=" for the RFC alphabets)
    #[serde(default)]
    pub padding: Option<String>,
}

impl AlphabetConfig {
    /// Builds a validated [`Alphabet`] from this definition.
    ///
    /// # Errors
    ///
    /// Returns the underlying construction error if the definition is not a
    /// valid 16/32/64-symbol alphabet.
    pub fn build(&self) -> Result<Alphabet, AlphabetError> {
        let padding = self.padding.as_ref().and_then(|s| s.chars().next());
        Alphabet::new(&self.symbols, padding)
    }
}

/// Named alphabet definitions, builtin plus user overrides.
#[derive(Debug, Deserialize)]
pub struct AlphabetRegistry {
    pub alphabets: HashMap<String, AlphabetConfig>,
}

/// Errors raised when resolving an alphabet by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No alphabet with this name is registered
    NotFound(String),
    /// The definition exists but fails alphabet validation
    Invalid { name: String, source: AlphabetError },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::NotFound(name) => write!(f, "alphabet '{}' not found", name),
            RegistryError::Invalid { name, source } => {
                write!(f, "alphabet '{}' is invalid: {}", name, source)
            }
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::NotFound(_) => None,
            RegistryError::Invalid { source, .. } => Some(source),
        }
    }
}

impl AlphabetRegistry {
    /// Parses alphabet definitions from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads the builtin definitions embedded at compile time.
    pub fn load_default() -> Result<Self, Box<dyn std::error::Error>> {
        let content = include_str!("../alphabets.toml");
        Ok(Self::from_toml(content)?)
    }

    /// Loads definitions from a custom file path.
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml(&content)?)
    }

    /// Loads the builtin definitions, then merges user overrides from
    /// `~/.config/base-codec/alphabets.toml` and `./alphabets.toml` when they
    /// exist. A file that fails to parse is logged and skipped.
    pub fn load_with_overrides() -> Result<Self, Box<dyn std::error::Error>> {
        let mut registry = Self::load_default()?;

        if let Some(config_dir) = dirs::config_dir() {
            let user_path = config_dir.join("base-codec").join("alphabets.toml");
            if user_path.exists() {
                match Self::load_from_file(&user_path) {
                    Ok(user) => {
                        debug!(path = %user_path.display(), "merging user alphabets");
                        registry.merge(user);
                    }
                    Err(e) => {
                        warn!(path = %user_path.display(), error = %e, "skipping unreadable user alphabets");
                    }
                }
            }
        }

        let local_path = Path::new("alphabets.toml");
        if local_path.exists() {
            match Self::load_from_file(local_path) {
                Ok(local) => {
                    debug!("merging local alphabets.toml");
                    registry.merge(local);
                }
                Err(e) => {
                    warn!(error = %e, "skipping unreadable local alphabets.toml");
                }
            }
        }

        Ok(registry)
    }

    /// Merges another registry into this one, overriding same-named entries.
    pub fn merge(&mut self, other: AlphabetRegistry) {
        for (name, config) in other.alphabets {
            self.alphabets.insert(name, config);
        }
    }

    /// Looks up a definition by name.
    pub fn get(&self, name: &str) -> Option<&AlphabetConfig> {
        self.alphabets.get(name)
    }

    /// Resolves a name to a validated [`Alphabet`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for unknown names and
    /// [`RegistryError::Invalid`] when the definition fails validation.
    pub fn build(&self, name: &str) -> Result<Alphabet, RegistryError> {
        let config = self
            .alphabets
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        config.build().map_err(|source| RegistryError::Invalid {
            name: name.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunked::{decode, encode};

    #[test]
    fn test_load_default_registry() {
        let registry = AlphabetRegistry::load_default().unwrap();
        for name in ["base64", "base64url", "base32", "zbase32", "base16", "base16_upper"] {
            assert!(registry.get(name).is_some(), "missing builtin '{}'", name);
            registry.build(name).unwrap();
        }
    }

    #[test]
    fn test_builtin_base64_matches_constant() {
        let registry = AlphabetRegistry::load_default().unwrap();
        let alphabet = registry.build("base64").unwrap();
        assert_eq!(encode(b"Hello, World!", &alphabet), "SGVsbG8sIFdvcmxkIQ==");
    }

    #[test]
    fn test_custom_alphabet_from_toml() {
        let content = r#"
[alphabets.crockford32]
symbols = "0123456789ABCDEFGHJKMNPQRSTVWXYZ"
"#;
        let registry = AlphabetRegistry::from_toml(content).unwrap();
        let alphabet = registry.build("crockford32").unwrap();
        assert_eq!(alphabet.base(), 32);
        assert_eq!(alphabet.padding(), None);

        let data = b"custom alphabets";
        assert_eq!(decode(&encode(data, &alphabet), &alphabet), data);
    }

    #[test]
    fn test_invalid_definition_reported_by_name() {
        let content = r#"
[alphabets.broken]
symbols = "AAAABCDEFGHIJKLM"
"#;
        let registry = AlphabetRegistry::from_toml(content).unwrap();
        let err = registry.build("broken").unwrap_err();
        assert_eq!(
            err,
            RegistryError::Invalid {
                name: "broken".to_string(),
                source: AlphabetError::DuplicateSymbol('A'),
            }
        );
    }

    #[test]
    fn test_unknown_name() {
        let registry = AlphabetRegistry::load_default().unwrap();
        assert_eq!(
            registry.build("base58").unwrap_err(),
            RegistryError::NotFound("base58".to_string())
        );
    }

    #[test]
    fn test_merge_overrides() {
        let mut registry = AlphabetRegistry::load_default().unwrap();
        let override_toml = r#"
[alphabets.base16]
symbols = "0123456789ABCDEF"
"#;
        registry.merge(AlphabetRegistry::from_toml(override_toml).unwrap());
        let alphabet = registry.build("base16").unwrap();
        assert_eq!(encode(&[156], &alphabet), "9C");
    }
}
