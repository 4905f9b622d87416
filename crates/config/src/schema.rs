//! Config schema types.

use std::path::{Path, PathBuf};

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
    tracing::debug,
};

use crate::{Error, Result};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CartlistConfig {
    pub discord: DiscordConfig,
    pub registry: RegistryConfig,
    pub checklist: ChecklistConfig,
}

/// Discord credentials.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Inline bot token. Takes precedence over `token_file`.
    #[serde(
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub token: Option<Secret<String>>,

    /// File holding the bot token. Surrounding whitespace is trimmed.
    pub token_file: PathBuf,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("token_file", &self.token_file)
            .finish()
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: None,
            token_file: PathBuf::from("token.secret"),
        }
    }
}

impl DiscordConfig {
    /// Resolve the bot token: inline value first, then the token file.
    pub fn resolve_token(&self) -> Result<Secret<String>> {
        if let Some(token) = &self.token
            && !token.expose_secret().trim().is_empty()
        {
            debug!("using inline discord token");
            return Ok(Secret::new(token.expose_secret().trim().to_string()));
        }
        read_token_file(&self.token_file)
    }
}

fn read_token_file(path: &Path) -> Result<Secret<String>> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
    let token = raw.trim();
    if token.is_empty() {
        return Err(Error::EmptyToken {
            path: path.to_path_buf(),
        });
    }
    debug!(path = %path.display(), "read discord token file");
    Ok(Secret::new(token.to_string()))
}

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}

/// Channel registry location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub path: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data.json"),
        }
    }
}

/// Chat-facing behaviour of the checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecklistConfig {
    /// Prefix that marks a message as a bot command.
    pub command_prefix: String,
    /// Messages starting with this marker are ignored entirely.
    pub comment_marker: String,
    /// Lines starting with this marker become headings instead of items.
    pub heading_marker: String,
    pub glyphs: Glyphs,
}

impl Default for ChecklistConfig {
    fn default() -> Self {
        Self {
            command_prefix: "!".into(),
            comment_marker: "#".into(),
            heading_marker: "#".into(),
            glyphs: Glyphs::default(),
        }
    }
}

/// Emoji used for control reactions and item state decoration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Glyphs {
    /// Reaction that checks an item.
    pub check: String,
    /// Reaction that deletes an item.
    pub delete: String,
    /// Reaction that opens an edit session.
    pub edit: String,
    /// Prefix of a checked item body.
    pub checked: String,
    /// Prefix of an unchecked item body.
    pub unchecked: String,
}

impl Default for Glyphs {
    fn default() -> Self {
        Self {
            check: "\u{1F6D2}".into(),
            delete: "\u{1F5D1}".into(),
            edit: "\u{270F}".into(),
            checked: "\u{2705}".into(),
            unchecked: "\u{25FB}".into(),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, tempfile::TempDir};

    #[test]
    fn defaults() {
        let cfg = CartlistConfig::default();
        assert_eq!(cfg.checklist.command_prefix, "!");
        assert_eq!(cfg.checklist.glyphs.check, "🛒");
        assert_eq!(cfg.checklist.glyphs.delete, "🗑");
        assert_eq!(cfg.checklist.glyphs.edit, "✏");
        assert_eq!(cfg.checklist.glyphs.checked, "✅");
        assert_eq!(cfg.checklist.glyphs.unchecked, "◻");
        assert_eq!(cfg.registry.path, PathBuf::from("data.json"));
        assert_eq!(cfg.discord.token_file, PathBuf::from("token.secret"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: CartlistConfig = toml::from_str(
            r#"
            [checklist]
            command_prefix = "?"

            [checklist.glyphs]
            check = "👍"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.checklist.command_prefix, "?");
        assert_eq!(cfg.checklist.glyphs.check, "👍");
        assert_eq!(cfg.checklist.glyphs.delete, "🗑");
        assert_eq!(cfg.checklist.heading_marker, "#");
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = DiscordConfig {
            token: Some(Secret::new("abc.def".into())),
            ..Default::default()
        };
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("abc.def"));
        assert!(dbg.contains("[REDACTED]"));
    }

    #[test]
    fn inline_token_wins_over_file() {
        let cfg = DiscordConfig {
            token: Some(Secret::new("  inline  ".into())),
            token_file: PathBuf::from("/definitely/missing/token"),
        };
        assert_eq!(cfg.resolve_token().unwrap().expose_secret(), "inline");
    }

    #[test]
    fn token_file_is_trimmed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("token.secret");
        std::fs::write(&path, "  tok.en \n").unwrap();

        let cfg = DiscordConfig {
            token: None,
            token_file: path,
        };
        assert_eq!(cfg.resolve_token().unwrap().expose_secret(), "tok.en");
    }

    #[test]
    fn missing_token_file_is_an_error() {
        let cfg = DiscordConfig {
            token: None,
            token_file: PathBuf::from("/definitely/missing/token"),
        };
        assert!(matches!(cfg.resolve_token(), Err(Error::Read { .. })));
    }

    #[test]
    fn blank_token_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("token.secret");
        std::fs::write(&path, "\n\n").unwrap();

        let cfg = DiscordConfig {
            token: None,
            token_file: path,
        };
        assert!(matches!(cfg.resolve_token(), Err(Error::EmptyToken { .. })));
    }
}
