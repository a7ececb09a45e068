// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error kinds for remote calls and consistent error formatting.
//!
//! Every fallible [`RemoteClient`](crate::remote::RemoteClient) call returns a
//! [`ClientError`]; callers branch on the kind instead of on message text.
//! Startup failures are shown to the user through [`format_error`] so each
//! one comes with likely causes and fixes.

use std::fmt;

/// Issue tracker shown at the bottom of formatted errors.
pub const ISSUES_URL: &str = "https://github.com/pyload/pyload/issues";

/// Result alias for remote calls.
pub type ClientResult<T> = Result<T, ClientError>;

/// Error kinds surfaced by the remote service binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The service rejected the username/password pair.
    WrongLogin,
    /// The service could not be reached at connect time.
    NoConnection { addr: String, port: u16 },
    /// The service requires a secure transport this build cannot provide.
    NoSsl,
    /// An established connection went away mid-session.
    ConnectionClosed,
    /// The service reported a failure for one call.
    Remote(String),
    /// The service answered with something that could not be decoded.
    Protocol(String),
}

impl ClientError {
    /// Only a lost connection ends an interactive session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConnectionClosed)
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongLogin => write!(f, "Login data is wrong."),
            Self::NoConnection { addr, port } => {
                write!(f, "Could not establish connection to {}:{}.", addr, port)
            }
            Self::NoSsl => write!(f, "A secure connection is required but unavailable."),
            Self::ConnectionClosed => write!(f, "Connection to the pyLoad core was closed."),
            Self::Remote(msg) => write!(f, "pyLoad error: {}", msg),
            Self::Protocol(msg) => write!(f, "Unexpected response: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

/// Formats an error message with title, causes, fixes, and help link.
///
/// # Example
///
/// ```
/// use pyload_cli::error::format_error;
///
/// let error = format_error(
///     "Could not establish connection to 127.0.0.1:7227.",
///     &["pyLoad core is not running", "Wrong address or port"],
///     &["Start the core: pyload", "Pass the address: pyload-cli -a HOST -p PORT"],
/// );
/// println!("{}", error);
/// ```
pub fn format_error(title: &str, causes: &[&str], fixes: &[&str]) -> String {
    let mut output = String::new();

    output.push_str(&format!("[✗] {}\n\n", title));

    if !causes.is_empty() {
        output.push_str("Possible causes:\n");
        for cause in causes {
            output.push_str(&format!("  - {}\n", cause));
        }
        output.push('\n');
    }

    if !fixes.is_empty() {
        output.push_str("Try these fixes:\n");
        for (i, fix) in fixes.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, fix));
        }
        output.push('\n');
    }

    output.push_str(&format!("Need help? {}", ISSUES_URL));

    output
}

/// Builder for constructing formatted error messages.
///
/// ```
/// use pyload_cli::error::ErrorBuilder;
///
/// let error = ErrorBuilder::new("Login data is wrong.")
///     .cause("Username or password mistyped")
///     .fix("Retry with: pyload-cli -u USER --pw PASSWORD")
///     .build();
/// assert!(error.contains("Login data is wrong."));
/// ```
#[derive(Debug, Clone)]
pub struct ErrorBuilder {
    title: String,
    causes: Vec<String>,
    fixes: Vec<String>,
}

impl ErrorBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            causes: Vec::new(),
            fixes: Vec::new(),
        }
    }

    pub fn cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }

    pub fn fix(mut self, fix: impl Into<String>) -> Self {
        self.fixes.push(fix.into());
        self
    }

    pub fn build(self) -> String {
        let causes: Vec<&str> = self.causes.iter().map(|s| s.as_str()).collect();
        let fixes: Vec<&str> = self.fixes.iter().map(|s| s.as_str()).collect();
        format_error(&self.title, &causes, &fixes)
    }
}

impl fmt::Display for ErrorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.clone().build())
    }
}

/// Whether `err` carries a lost connection anywhere in its chain.
pub fn is_connection_lost(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<ClientError>())
        .any(ClientError::is_fatal)
}

/// Explain a connect-time failure the way the user can act on it.
pub fn describe_connect_error(err: &ClientError) -> String {
    match err {
        ClientError::WrongLogin => ErrorBuilder::new(err.to_string())
            .cause("Username or password mistyped")
            .cause("The account was removed on the core")
            .fix("Retry with: pyload-cli -u USER --pw PASSWORD")
            .fix("Use interactive mode to be prompted: pyload-cli -i")
            .build(),
        ClientError::NoConnection { .. } => ErrorBuilder::new(err.to_string())
            .cause("pyLoad core is not running")
            .cause("Wrong address or port")
            .fix("Start the core and retry")
            .fix("Pass the address: pyload-cli -a HOST -p PORT")
            .build(),
        ClientError::NoSsl => ErrorBuilder::new(err.to_string())
            .cause("The core only accepts TLS connections")
            .fix("Connect with an https:// address: pyload-cli -a https://HOST")
            .build(),
        other => ErrorBuilder::new(other.to_string()).build(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error() {
        let error = format_error("Test Error", &["Cause 1", "Cause 2"], &["Fix 1", "Fix 2"]);

        assert!(error.contains("[✗] Test Error"));
        assert!(error.contains("  - Cause 1"));
        assert!(error.contains("  2. Fix 2"));
        assert!(error.contains(ISSUES_URL));
    }

    #[test]
    fn test_empty_causes_and_fixes() {
        let error = format_error("Empty test", &[], &[]);
        assert!(!error.contains("Possible causes:"));
        assert!(!error.contains("Try these fixes:"));
    }

    #[test]
    fn test_only_connection_closed_is_fatal() {
        assert!(ClientError::ConnectionClosed.is_fatal());
        assert!(!ClientError::WrongLogin.is_fatal());
        assert!(!ClientError::Remote("boom".into()).is_fatal());
    }

    #[test]
    fn test_connection_lost_through_context() {
        let err = anyhow::Error::new(ClientError::ConnectionClosed).context("refreshing header");
        assert!(is_connection_lost(&err));
        assert!(!is_connection_lost(&anyhow::anyhow!("invalid selection")));
        assert!(!is_connection_lost(&anyhow::Error::new(ClientError::NoSsl)));
    }

    #[test]
    fn test_describe_no_connection() {
        let text = describe_connect_error(&ClientError::NoConnection {
            addr: "10.0.0.1".into(),
            port: 7227,
        });
        assert!(text.contains("10.0.0.1:7227"));
        assert!(text.contains("pyload-cli -a HOST -p PORT"));
    }
}
