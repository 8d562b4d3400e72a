//! Credentials management infrastructure
//!
//! API keys are read from environment variables whose *names* come from
//! configuration. Anything configured in place of a variable name is rejected
//! without being echoed, so secrets never live in config files or error output.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::domain::errors::{PipelineError, PipelineResult};

static ENV_VAR_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid env var pattern"));

/// True when `name` is a portable environment variable name
pub fn is_env_var_name(name: &str) -> bool {
    ENV_VAR_NAME.is_match(name)
}

/// An API key read from the environment; never printed
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Read the key held by the environment variable `var`
    ///
    /// # Errors
    /// `Configuration` when `var` is not a variable name, or when the variable
    /// is unset or blank. The error names `var` only once it is known to be a
    /// variable name.
    pub fn from_env(var: &str) -> PipelineResult<Self> {
        if !is_env_var_name(var) {
            return Err(PipelineError::Configuration(
                "api_key_env must name an environment variable (letters, digits and underscores); the configured value is not shown"
                    .to_string(),
            ));
        }

        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => Ok(Self(value.trim().to_string())),
            _ => Err(PipelineError::Configuration(format!(
                "{var} environment variable not set"
            ))),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}
