use anyhow::Context;
use facedesk_client::ClientConfig;
use std::path::{Path, PathBuf};

/// Resolve client settings: defaults, then the TOML file, then `FACEDESK_*` variables.
///
/// An explicit `--config` path must exist. Without one, the default location
/// is read only if present.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<ClientConfig> {
    let file_config = match explicit {
        Some(path) => Some(read_file(path)?),
        None => match default_path() {
            Some(path) if path.exists() => Some(read_file(&path)?),
            _ => None,
        },
    };

    Ok(file_config.unwrap_or_default().with_env())
}

fn read_file(path: &Path) -> anyhow::Result<ClientConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = parse(&text).with_context(|| format!("invalid config file {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

fn parse(text: &str) -> Result<ClientConfig, toml::de::Error> {
    toml::from_str(text)
}

/// `$XDG_CONFIG_HOME/facedesk/config.toml`, falling back to `~/.config`.
fn default_path() -> Option<PathBuf> {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|home| PathBuf::from(home).join(".config")))
        .ok()?;
    Some(config_dir.join("facedesk").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let config = parse(
            r#"
            base_url = "http://faces.lan:5000"
            rebuild_poll_interval_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "http://faces.lan:5000");
        assert_eq!(config.rebuild_poll_interval_ms, 250);
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.images_prefix, "/images");
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        assert!(parse("rebuild_poll_max = \"lots\"").is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_explicit_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facedesk.toml");
        std::fs::write(&path, "api_prefix = \"/v2/api\"\n").unwrap();

        let config = read_file(&path).unwrap();
        assert_eq!(config.api_prefix, "/v2/api");
    }
}
