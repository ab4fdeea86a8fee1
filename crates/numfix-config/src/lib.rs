use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use numfix_core::{CountryProfile, CountryRegistry, CoreError};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const APP_DIR: &str = "numfix";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub countries: Vec<CountryProfile>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    /// Externally reachable base URL. When unset, links point at `listen`.
    pub public_url: Option<Url>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            public_url: None,
        }
    }
}

impl AppConfig {
    /// Builtin country profiles with the configured ones layered on top.
    pub fn registry(&self) -> CountryRegistry {
        CountryRegistry::with_overrides(self.countries.iter().cloned())
    }
}

impl ServerConfig {
    /// Link a client can follow to read back a stored batch.
    pub fn batch_href(&self, batch_ref: &str) -> String {
        format!("{}/numbers/{}", self.base_url(), batch_ref)
    }

    /// `public_url` without a trailing slash, or `http://` plus the listen address.
    /// Loopback and wildcard binds are reported as `localhost`.
    pub fn base_url(&self) -> String {
        if let Some(url) = &self.public_url {
            return url.as_str().trim_end_matches('/').to_string();
        }
        let ip = self.listen.ip();
        if ip.is_loopback() || ip.is_unspecified() {
            format!("http://localhost:{}", self.listen.port())
        } else {
            format!("http://{}", self.listen)
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid server.listen value: {0}")]
    InvalidListen(String),
    #[error("invalid server.public_url value {value}: {reason}")]
    InvalidPublicUrl { value: String, reason: String },
    #[error("invalid country profile {code}: {source}")]
    InvalidCountry {
        code: String,
        #[source]
        source: CoreError,
    },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    server: Option<ServerFile>,
    countries: Option<BTreeMap<String, CountryFile>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerFile {
    listen: Option<String>,
    public_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CountryFile {
    dialing_prefix: String,
    length: usize,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path.clone()) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(server) = parsed.server {
        if let Some(listen) = server.listen {
            config.server.listen = listen
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidListen(listen.clone()))?;
        }
        if let Some(public_url) = server.public_url {
            config.server.public_url = Some(parse_public_url(&public_url)?);
        }
    }

    if let Some(countries) = parsed.countries {
        for (code, country) in countries {
            let profile = CountryProfile::new(&code, &country.dialing_prefix, country.length)
                .map_err(|source| ConfigError::InvalidCountry {
                    code: code.clone(),
                    source,
                })?;
            config.countries.push(profile);
        }
    }

    Ok(config)
}

fn parse_public_url(value: &str) -> Result<Url> {
    let invalid = |reason: String| ConfigError::InvalidPublicUrl {
        value: value.to_string(),
        reason,
    };
    let url = Url::parse(value.trim()).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(invalid(format!("unsupported scheme {}", scheme))),
    }
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        load_at_path, merge_config, AppConfig, ConfigError, ConfigFile, CountryFile, ServerConfig,
        ServerFile,
    };
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn restrict_permissions(path: &Path) {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path).expect("metadata").permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).expect("chmod");
        }
    }

    #[test]
    fn defaults_use_builtin_registry() {
        let config = AppConfig::default();
        assert_eq!(config.server.listen.to_string(), "127.0.0.1:8080");
        assert_eq!(config.registry().len(), 4);
        assert_eq!(
            config.server.batch_href("abc"),
            "http://localhost:8080/numbers/abc"
        );
    }

    #[test]
    fn merge_config_applies_values() {
        let mut countries = BTreeMap::new();
        countries.insert(
            "nzl".to_string(),
            CountryFile {
                dialing_prefix: "64".to_string(),
                length: 10,
            },
        );
        let parsed = ConfigFile {
            server: Some(ServerFile {
                listen: Some("0.0.0.0:9000".to_string()),
                public_url: Some("https://numbers.example.com/".to_string()),
            }),
            countries: Some(countries),
        };
        let merged = merge_config(parsed).expect("merge");
        assert_eq!(merged.server.listen.port(), 9000);
        assert_eq!(merged.server.base_url(), "https://numbers.example.com");
        assert_eq!(
            merged.server.batch_href("abc"),
            "https://numbers.example.com/numbers/abc"
        );
        let registry = merged.registry();
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.lookup("nzl").expect("nzl").required_length, 10);
    }

    #[test]
    fn batch_href_follows_listen_without_public_url() {
        let mut server = ServerConfig {
            listen: "0.0.0.0:9000".parse().expect("addr"),
            public_url: None,
        };
        assert_eq!(server.batch_href("abc"), "http://localhost:9000/numbers/abc");

        server.listen = "192.168.1.20:7000".parse().expect("addr");
        assert_eq!(server.batch_href("abc"), "http://192.168.1.20:7000/numbers/abc");

        server.listen = "[2001:db8::1]:7000".parse().expect("addr");
        assert_eq!(server.batch_href("abc"), "http://[2001:db8::1]:7000/numbers/abc");
    }

    #[test]
    fn merge_config_rejects_bad_listen() {
        let parsed = ConfigFile {
            server: Some(ServerFile {
                listen: Some("not an address".to_string()),
                public_url: None,
            }),
            countries: None,
        };
        let err = merge_config(parsed).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidListen(_)));
    }

    #[test]
    fn merge_config_rejects_non_http_url() {
        let parsed = ConfigFile {
            server: Some(ServerFile {
                listen: None,
                public_url: Some("ftp://example.com".to_string()),
            }),
            countries: None,
        };
        let err = merge_config(parsed).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPublicUrl { .. }));
    }

    #[test]
    fn merge_config_rejects_bad_country() {
        let mut countries = BTreeMap::new();
        countries.insert(
            "nzl".to_string(),
            CountryFile {
                dialing_prefix: "6x".to_string(),
                length: 10,
            },
        );
        let parsed = ConfigFile {
            server: None,
            countries: Some(countries),
        };
        let err = merge_config(parsed).unwrap_err();
        assert!(err.to_string().contains("invalid country profile nzl"));
    }

    #[test]
    fn load_at_path_requires_file_when_requested() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        let err = load_at_path(&missing, true).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("config file not found"));
    }

    #[test]
    fn load_at_path_skips_missing_optional_file() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        assert!(load_at_path(&missing, false).expect("load").is_none());
    }

    #[test]
    fn load_at_path_parses_toml() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "[server]\nlisten = \"127.0.0.1:9090\"\n\n[countries.usa]\ndialing_prefix = \"1\"\nlength = 12\n",
        )
        .expect("write config");
        restrict_permissions(&path);

        let config = load_at_path(&path, true).expect("load").expect("config");
        assert_eq!(config.server.listen.port(), 9090);
        assert_eq!(config.registry().lookup("usa").unwrap().required_length, 12);
    }

    #[test]
    fn load_at_path_rejects_unknown_fields() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "retention_days = 5\n").expect("write config");
        restrict_permissions(&path);

        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn load_at_path_rejects_world_readable_file() {
        use std::os::unix::fs::PermissionsExt;
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "").expect("write config");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).expect("chmod");

        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::InsecurePermissions(_)));
    }
}
