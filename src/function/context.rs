//! Invocation context passed to the handler alongside the event.

/// Hostname used when the configured variable is unset or empty.
pub const DEFAULT_HOSTNAME: &str = "localhost";

/// Environment variable consulted for the instance hostname by default.
pub const DEFAULT_HOSTNAME_VAR: &str = "HOSTNAME";

/// Per-invocation metadata independent of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Identity of the executing instance.
    pub hostname: String,
}

impl Context {
    /// Create a context with an explicit hostname.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(DEFAULT_HOSTNAME)
    }
}

/// Builds a fresh [`Context`] for every request.
///
/// The variable is re-read on each call; nothing is cached.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    hostname_var: String,
}

impl ContextBuilder {
    /// Read the hostname from the named environment variable.
    pub fn new(hostname_var: impl Into<String>) -> Self {
        Self {
            hostname_var: hostname_var.into(),
        }
    }

    /// Name of the variable this builder reads.
    pub fn hostname_var(&self) -> &str {
        &self.hostname_var
    }

    /// Build a context from the process environment.
    pub fn build(&self) -> Context {
        self.build_with(|key| std::env::var(key).ok())
    }

    /// Build a context using `lookup` in place of the process environment.
    pub fn build_with<F>(&self, lookup: F) -> Context
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let hostname = lookup(&self.hostname_var)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_HOSTNAME.to_string());
        Context { hostname }
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_HOSTNAME_VAR)
    }
}
