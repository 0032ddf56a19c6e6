use crate::error::{PlantCareError, Result};
use dialoguer::{Input, Password};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "plantcare";
const CONFIG_FILE: &str = "config.yaml";
const DATA_FILE: &str = "plants.json";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub email: Option<EmailConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port", deserialize_with = "deserialize_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    5001
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Plant document location; defaults to the XDG data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port", deserialize_with = "deserialize_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub security: SmtpSecurity,
    pub username: String,
    pub password: String,
    /// Sender address; defaults to `username`.
    #[serde(default)]
    pub from: Option<String>,
    /// Recipient address; defaults to `username`.
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl EmailConfig {
    /// SMTP settings from `EMAIL_USER` / `EMAIL_PASS`, sending to self.
    pub fn from_env() -> Option<Self> {
        Self::from_credentials(
            std::env::var("EMAIL_USER").ok(),
            std::env::var("EMAIL_PASS").ok(),
        )
    }

    fn from_credentials(user: Option<String>, pass: Option<String>) -> Option<Self> {
        let username = user.filter(|u| !u.trim().is_empty())?;
        let password = pass.unwrap_or_default();
        Some(Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            security: SmtpSecurity::default(),
            username,
            password,
            from: None,
            to: None,
            enabled: true,
        })
    }

    pub fn sender(&self) -> &str {
        self.from.as_deref().unwrap_or(&self.username)
    }

    pub fn recipient(&self) -> &str {
        self.to.as_deref().unwrap_or(&self.username)
    }
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("security", &self.security)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("enabled", &self.enabled)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// TLS from the first byte (SMTPS, usually port 465).
    #[default]
    Implicit,
    /// Plain connection upgraded with STARTTLS (usually port 587).
    Starttls,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".into()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_enabled() -> bool {
    true
}

/// Accepts `465` or `"465"`; the latter is what `${VAR}` substitution yields.
fn deserialize_port<'de, D>(deserializer: D) -> std::result::Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortValue {
        Number(u16),
        Text(String),
    }

    match PortValue::deserialize(deserializer)? {
        PortValue::Number(port) => Ok(port),
        PortValue::Text(value) => value.trim().parse::<u16>().map_err(|_| {
            D::Error::custom(format!(
                "invalid port '{}' - check the environment variable it is read from",
                value
            ))
        }),
    }
}

impl Config {
    pub fn load(config_override: Option<&PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) if !p.exists() => {
                return Err(PlantCareError::Config(format!(
                    "Config file not found at {:?}",
                    p
                )));
            }
            Some(p) => Some(p.clone()),
            None => Self::find_config_path(),
        };

        let mut config = match config_path {
            Some(path) => {
                let config_str = std::fs::read_to_string(&path)
                    .map_err(|e| PlantCareError::Config(format!("Failed to read config: {}", e)))?;
                tracing::info!(path = %path.display(), "Loaded configuration");
                Self::from_yaml(&config_str)?
            }
            None => {
                tracing::info!("No config file found, using defaults");
                Config::default()
            }
        };

        if config.email.is_none() {
            config.email = EmailConfig::from_env();
        }

        Ok(config)
    }

    /// Parse YAML after substituting `${VAR}` placeholders.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content)?;
        serde_yaml::from_str(&content)
            .map_err(|e| PlantCareError::Config(format!("Failed to parse config: {}", e)))
    }

    /// First existing config in the standard locations.
    fn find_config_path() -> Option<PathBuf> {
        let local_config = PathBuf::from("config").join(CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .filter(|p| p.exists())
    }

    /// Default path for writing new config files (~/.config/plantcare/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| PlantCareError::Config("Cannot determine config directory".into()))?
            .join(APP_DIR);
        Ok(config_dir.join(CONFIG_FILE))
    }

    /// Email settings that should actually be used, if any.
    pub fn active_email(&self) -> Option<&EmailConfig> {
        self.email
            .as_ref()
            .filter(|e| e.enabled && !e.username.trim().is_empty())
    }

    /// Resolve the plant document path: CLI override, then
    /// `PLANTCARE_DATA_FILE`, then `store.path`, then the XDG data dir.
    pub fn data_file(&self, data_file_override: Option<&PathBuf>) -> Result<PathBuf> {
        if let Some(path) = data_file_override {
            return Ok(path.clone());
        }

        if let Ok(path) = std::env::var("PLANTCARE_DATA_FILE") {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }

        if let Some(path) = &self.store.path {
            return Ok(path.clone());
        }

        Self::default_data_file()
    }

    fn default_data_file() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| PlantCareError::Config("Cannot determine data directory".into()))?
            .join(APP_DIR);
        Ok(data_dir.join(DATA_FILE))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the new Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up PlantCare!");
        println!();

        // --- Server ---
        println!("Server");
        let port: u16 = Input::new()
            .with_prompt("  Port")
            .default(default_port())
            .interact_text()
            .map_err(|e| PlantCareError::Config(format!("Input error: {}", e)))?;

        let default_data = Self::default_data_file()?;
        let data_path: String = Input::new()
            .with_prompt("  Plant data file")
            .default(default_data.display().to_string())
            .interact_text()
            .map_err(|e| PlantCareError::Config(format!("Input error: {}", e)))?;

        println!();

        // --- Email (optional) ---
        println!("Email reminders (leave username blank to skip)");
        let username: String = Input::new()
            .with_prompt("  SMTP username")
            .default(String::new())
            .allow_empty(true)
            .interact_text()
            .map_err(|e| PlantCareError::Config(format!("Input error: {}", e)))?;

        let email = if username.is_empty() {
            None
        } else {
            let smtp_host: String = Input::new()
                .with_prompt("  SMTP host")
                .default(default_smtp_host())
                .interact_text()
                .map_err(|e| PlantCareError::Config(format!("Input error: {}", e)))?;

            let smtp_port: u16 = Input::new()
                .with_prompt("  SMTP port (465 = TLS, 587 = STARTTLS)")
                .default(default_smtp_port())
                .interact_text()
                .map_err(|e| PlantCareError::Config(format!("Input error: {}", e)))?;

            let password: String = Password::new()
                .with_prompt("  SMTP password")
                .allow_empty_password(true)
                .interact()
                .map_err(|e| PlantCareError::Config(format!("Input error: {}", e)))?;

            let to: String = Input::new()
                .with_prompt("  Send reminders to")
                .default(username.clone())
                .interact_text()
                .map_err(|e| PlantCareError::Config(format!("Input error: {}", e)))?;

            Some(EmailConfig {
                smtp_host,
                smtp_port,
                security: if smtp_port == 587 {
                    SmtpSecurity::Starttls
                } else {
                    SmtpSecurity::Implicit
                },
                to: (to != username).then_some(to),
                username,
                password,
                from: None,
                enabled: true,
            })
        };

        println!();

        let config = Config {
            server: ServerConfig {
                host: default_host(),
                port,
            },
            store: StoreConfig {
                path: Some(PathBuf::from(data_path)),
            },
            email,
        };

        let config_path = Self::default_config_path()?;
        config.write_to(&config_path)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)
            .map_err(|e| PlantCareError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# PlantCare Configuration\n# Generated by `plantcare init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(path, content)?;
        Ok(())
    }

    fn substitute_env_vars(content: &str) -> Result<String> {
        let mut result = content.to_string();

        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| PlantCareError::Config(format!("Bad substitution pattern: {}", e)))?;

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5001);
        assert!(config.store.path.is_none());
        assert!(config.email.is_none());
    }

    #[test]
    fn email_section_defaults() {
        let config = Config::from_yaml(
            r#"
email:
  username: owner@example.com
  password: hunter2
"#,
        )
        .unwrap();

        let email = config.active_email().unwrap();
        assert_eq!(email.smtp_host, "smtp.gmail.com");
        assert_eq!(email.smtp_port, 465);
        assert_eq!(email.security, SmtpSecurity::Implicit);
        assert_eq!(email.sender(), "owner@example.com");
        assert_eq!(email.recipient(), "owner@example.com");
    }

    #[test]
    fn explicit_sender_and_recipient() {
        let config = Config::from_yaml(
            r#"
email:
  smtp_host: mail.example.com
  smtp_port: 587
  security: starttls
  username: bot@example.com
  password: pw
  from: plants@example.com
  to: me@example.com
"#,
        )
        .unwrap();

        let email = config.email.unwrap();
        assert_eq!(email.security, SmtpSecurity::Starttls);
        assert_eq!(email.smtp_port, 587);
        assert_eq!(email.sender(), "plants@example.com");
        assert_eq!(email.recipient(), "me@example.com");
    }

    #[test]
    fn disabled_email_is_inactive() {
        let config = Config::from_yaml(
            r#"
email:
  username: owner@example.com
  password: pw
  enabled: false
"#,
        )
        .unwrap();
        assert!(config.active_email().is_none());
    }

    #[test]
    fn substitutes_environment_variables() {
        std::env::set_var("PLANTCARE_TEST_SMTP_PORT", "2525");
        std::env::set_var("PLANTCARE_TEST_SMTP_PASS", "s3cret");

        let config = Config::from_yaml(
            r#"
email:
  smtp_port: "${PLANTCARE_TEST_SMTP_PORT}"
  username: owner@example.com
  password: "${PLANTCARE_TEST_SMTP_PASS}"
"#,
        )
        .unwrap();

        let email = config.email.unwrap();
        assert_eq!(email.smtp_port, 2525);
        assert_eq!(email.password, "s3cret");
    }

    #[test]
    fn unset_port_variable_is_reported() {
        let err = Config::from_yaml(
            r#"
server:
  port: "${PLANTCARE_TEST_UNSET_PORT}"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid port"));
    }

    #[test]
    fn credentials_from_environment_values() {
        let email =
            EmailConfig::from_credentials(Some("me@example.com".into()), Some("pw".into()))
                .unwrap();
        assert_eq!(email.smtp_host, "smtp.gmail.com");
        assert_eq!(email.smtp_port, 465);
        assert_eq!(email.recipient(), "me@example.com");

        assert!(EmailConfig::from_credentials(None, Some("pw".into())).is_none());
        assert!(EmailConfig::from_credentials(Some(" ".into()), None).is_none());
    }

    #[test]
    fn debug_redacts_password() {
        let email =
            EmailConfig::from_credentials(Some("me@example.com".into()), Some("topsecret".into()))
                .unwrap();
        let debug = format!("{:?}", email);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("topsecret"));
    }

    #[test]
    fn data_file_prefers_override() {
        let config = Config {
            store: StoreConfig {
                path: Some(PathBuf::from("/srv/plants.json")),
            },
            ..Config::default()
        };
        let cli = PathBuf::from("/tmp/override.json");
        assert_eq!(config.data_file(Some(&cli)).unwrap(), cli);
    }

    #[test]
    fn missing_override_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(matches!(
            Config::load(Some(&missing)),
            Err(PlantCareError::Config(_))
        ));
    }

    #[test]
    fn written_config_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 8080,
            },
            store: StoreConfig {
                path: Some(dir.path().join("plants.json")),
            },
            email: EmailConfig::from_credentials(Some("me@example.com".into()), Some("pw".into())),
        };
        config.write_to(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.server.port, 8080);
        assert_eq!(loaded.store.path, config.store.path);
        assert_eq!(loaded.email.unwrap().username, "me@example.com");
    }
}
