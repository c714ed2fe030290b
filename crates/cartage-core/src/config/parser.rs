//! TOML parser with helpful error messages

use std::path::Path;

use super::paths::find_config_file;
use super::schema::CartageConfig;
use crate::error::{Error, Result};

/// Load configuration. An explicit `path` must exist; otherwise the default
/// locations under `base_dir` are searched and an empty configuration is
/// returned when none exists.
pub fn load(path: Option<&Path>, base_dir: &Path) -> Result<CartageConfig> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(Error::MissingConfigFile(path.to_path_buf()));
            }
            parse_cartage_toml(path)
        }
        None => match find_config_file(base_dir) {
            Some(found) => {
                tracing::debug!("Loading configuration from {}", found.display());
                parse_cartage_toml(&found)
            }
            None => Ok(CartageConfig::new()),
        },
    }
}

/// Parse cartage.toml with detailed error messages
pub fn parse_cartage_toml(path: &Path) -> Result<CartageConfig> {
    let content = std::fs::read_to_string(path)?;

    parse_cartage_toml_str(&content).map_err(|e| {
        Error::configuration(format!(
            "Failed to parse config file {}: {e}",
            path.display()
        ))
    })
}

/// Parse cartage.toml content from string
pub fn parse_cartage_toml_str(content: &str) -> Result<CartageConfig> {
    let config: CartageConfig =
        toml::from_str(content).map_err(|e| enhance_toml_error(e, content))?;

    config.validate()?;

    Ok(config)
}

/// Enhance TOML parsing errors with helpful context
fn enhance_toml_error(error: toml::de::Error, content: &str) -> Error {
    let error_msg = error.to_string();

    let line_hint = error_msg
        .lines()
        .find(|line| line.contains("line "))
        .and_then(|line| {
            line.split("line ")
                .nth(1)
                .and_then(|s| s.split(|c: char| !c.is_ascii_digit()).next())
                .and_then(|s| s.parse::<usize>().ok())
        });

    if let Some(line_num) = line_hint {
        let context = get_line_context(content, line_num);
        Error::configuration(format!(
            "TOML parsing error at line {line_num}:\n{context}\n\nError: {error_msg}"
        ))
    } else {
        Error::configuration(format!("TOML parsing error: {error_msg}"))
    }
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2).min(lines.len());
    let end = (line_num + 2).min(lines.len());

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize a configuration to TOML string
pub fn to_toml(config: &CartageConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::Compression;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_parse_valid_config() {
        let toml = r#"
name = "cartage"
compression = "gzip"
disable_dependency_cache = true

[plugins.build_tarball]
disabled = true

[commands.pack]
skip_check = true
"#;

        let config = parse_cartage_toml_str(toml).unwrap();
        assert_eq!(config.name.as_deref(), Some("cartage"));
        assert_eq!(config.compression, Some(Compression::Gzip));
        assert!(config.disable_dependency_cache);
        assert!(config.for_plugin("build_tarball").disabled);
        assert_eq!(
            config.for_command("pack").get("skip_check"),
            Some(&toml::Value::Boolean(true))
        );
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_cartage_toml_str("").unwrap();
        assert_eq!(config, CartageConfig::new());
    }

    #[test]
    fn test_enhance_toml_error() {
        let result = parse_cartage_toml_str("name = [unclosed");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("line ") || err.contains("TOML parsing error"));
    }

    #[test]
    fn test_invalid_compression_is_rejected() {
        assert!(parse_cartage_toml_str("compression = \"lzma\"").is_err());
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let mut original = CartageConfig::new();
        original.name = Some("app".to_string());
        original.compression = Some(Compression::None);
        original.quiet = true;

        let toml_str = to_toml(&original).unwrap();
        let parsed = parse_cartage_toml_str(&toml_str).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        let err = load(Some(&missing), temp.path()).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_load_explicit_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "name = \"explicit\"").unwrap();
        let config = load(Some(temp_file.path()), Path::new(".")).unwrap();
        assert_eq!(config.name.as_deref(), Some("explicit"));
    }

    #[test]
    fn test_load_without_any_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let config = load(None, temp.path()).unwrap();
        assert_eq!(config, CartageConfig::new());
    }
}
