use secrecy::SecretString;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Development-only signing secret used when `AUTH_SECRET` is not set.
pub const DEV_AUTH_SECRET: &str = "hospital-system-dev-secret";

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8083";
pub const DEFAULT_DATA_DIR: &str = "static";
pub const DEFAULT_BCRYPT_COST: u32 = 10;
pub const MIN_BCRYPT_COST: u32 = 10;
pub const MAX_BCRYPT_COST: u32 = 14;
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 72;
/// One year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 366;
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Whether registration writes must name departments that exist in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepartmentValidation {
    /// Checked for every caller, admins included.
    #[default]
    All,
    /// Checked for patients only; admins may name any department.
    NonAdmin,
    /// Never checked.
    Disabled,
}

impl DepartmentValidation {
    pub fn applies_to_admin(&self) -> bool {
        matches!(self, DepartmentValidation::All)
    }

    pub fn applies_to_non_admin(&self) -> bool {
        !matches!(self, DepartmentValidation::Disabled)
    }
}

impl FromStr for DepartmentValidation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(DepartmentValidation::All),
            "non-admin" => Ok(DepartmentValidation::NonAdmin),
            "off" => Ok(DepartmentValidation::Disabled),
            other => Err(format!("expected all, non-admin or off, got {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub data_dir: PathBuf,
    pub auth_secret: SecretString,
    /// True when the development fallback secret is in use.
    pub auth_secret_is_default: bool,
    pub bcrypt_cost: u32,
    pub session_ttl_hours: i64,
    pub admin_username: String,
    pub admin_password: Option<SecretString>,
    pub department_validation: DepartmentValidation,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

fn invalid(name: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Returns the trimmed value, treating blank as unset.
fn non_blank<'a>(vars: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = match (non_blank(vars, "BIND_ADDRESS"), non_blank(vars, "PORT")) {
            (Some(addr), _) => addr.to_string(),
            (None, Some(port)) => {
                let port: u16 = port
                    .parse()
                    .map_err(|_| invalid("PORT", format!("not a port number: {}", port)))?;
                format!("0.0.0.0:{}", port)
            }
            (None, None) => DEFAULT_BIND_ADDRESS.to_string(),
        };

        let data_dir = non_blank(vars, "DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let (auth_secret, auth_secret_is_default) = match non_blank(vars, "AUTH_SECRET") {
            Some(secret) => (SecretString::from(secret.to_string()), false),
            None => (SecretString::from(DEV_AUTH_SECRET.to_string()), true),
        };

        let bcrypt_cost = match non_blank(vars, "BCRYPT_COST") {
            Some(raw) => {
                let cost: u32 = raw
                    .parse()
                    .map_err(|_| invalid("BCRYPT_COST", format!("not a number: {}", raw)))?;
                if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
                    return Err(invalid(
                        "BCRYPT_COST",
                        format!(
                            "must be between {} and {}, got {}",
                            MIN_BCRYPT_COST, MAX_BCRYPT_COST, cost
                        ),
                    ));
                }
                cost
            }
            None => DEFAULT_BCRYPT_COST,
        };

        let session_ttl_hours = match non_blank(vars, "SESSION_TTL_HOURS") {
            Some(raw) => {
                let hours: i64 = raw.parse().map_err(|_| {
                    invalid("SESSION_TTL_HOURS", format!("not a number: {}", raw))
                })?;
                if hours <= 0 {
                    return Err(invalid("SESSION_TTL_HOURS", "must be greater than zero"));
                }
                if hours > MAX_SESSION_TTL_HOURS {
                    return Err(invalid(
                        "SESSION_TTL_HOURS",
                        format!("must be at most {}, got {}", MAX_SESSION_TTL_HOURS, hours),
                    ));
                }
                hours
            }
            None => DEFAULT_SESSION_TTL_HOURS,
        };

        let admin_username = non_blank(vars, "ADMIN_USERNAME")
            .unwrap_or(DEFAULT_ADMIN_USERNAME)
            .to_string();

        let admin_password = non_blank(vars, "ADMIN_PASSWORD")
            .map(|password| SecretString::from(password.to_string()));

        let department_validation = match non_blank(vars, "DEPARTMENT_VALIDATION") {
            Some(raw) => raw
                .parse()
                .map_err(|reason: String| invalid("DEPARTMENT_VALIDATION", reason))?,
            None => DepartmentValidation::default(),
        };

        Ok(Config {
            bind_address,
            data_dir,
            auth_secret,
            auth_secret_is_default,
            bcrypt_cost,
            session_ttl_hours,
            admin_username,
            admin_password,
            department_validation,
        })
    }

    /// Out-of-range hours (only reachable by building `Config` by hand) fall
    /// back to the default session length.
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.session_ttl_hours)
            .unwrap_or_else(|| chrono::Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }
}
