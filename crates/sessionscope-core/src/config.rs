#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: String,
    pub storage_mode: StorageMode,
    pub auth_mode: AuthMode,
    pub cors_origins: Vec<String>,
}

/// Which storage engine serves read queries. Chosen once at startup; the
/// process never switches backends mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Relational,
    Columnar,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthMode {
    None,
    /// Holds the static bearer token read from `SESSIONSCOPE_AUTH_TOKEN`.
    Token(String),
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: std::env::var("SESSIONSCOPE_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            data_dir: std::env::var("SESSIONSCOPE_DATA_DIR")
                .unwrap_or_else(|_| "./data".to_string()),
            storage_mode: {
                let raw = std::env::var("SESSIONSCOPE_STORAGE")
                    .unwrap_or_else(|_| "relational".to_string());
                match raw.as_str() {
                    "relational" => StorageMode::Relational,
                    "columnar" => StorageMode::Columnar,
                    other => {
                        return Err(format!(
                            "SESSIONSCOPE_STORAGE must be 'relational' or 'columnar', got '{other}'"
                        ))
                    }
                }
            },
            auth_mode: {
                let raw =
                    std::env::var("SESSIONSCOPE_AUTH").unwrap_or_else(|_| "none".to_string());
                match raw.as_str() {
                    "none" => AuthMode::None,
                    "token" => {
                        let token = std::env::var("SESSIONSCOPE_AUTH_TOKEN").map_err(|_| {
                            "SESSIONSCOPE_AUTH_TOKEN required when SESSIONSCOPE_AUTH=token"
                                .to_string()
                        })?;
                        AuthMode::Token(token)
                    }
                    other => {
                        return Err(format!(
                            "SESSIONSCOPE_AUTH must be 'none' or 'token', got '{other}'"
                        ))
                    }
                }
            },
            cors_origins: std::env::var("SESSIONSCOPE_CORS_ORIGINS")
                .map(|v| v.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
        })
    }
}
