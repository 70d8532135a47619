//! Navigation guard for protected routes.

use crate::TOKEN_KEY;

/// Decision produced by the guard for one navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// The navigation proceeds unmodified.
    Proceed,
    /// The caller must navigate to the contained path instead.
    Redirect(String),
}

/// Redirects unauthenticated navigation away from protected path prefixes.
///
/// Token presence alone grants passage; signature and expiry verification
/// stay with the backend, which re-validates on the first API call made
/// under the session.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    protected_prefixes: Vec<String>,
    login_path: String,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(["/dashboard", "/profile"], "/login")
    }
}

impl RouteGuard {
    pub fn new<I, S>(protected_prefixes: I, login_path: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            protected_prefixes: protected_prefixes.into_iter().map(Into::into).collect(),
            login_path: login_path.into(),
        }
    }

    /// The path unauthenticated requests are redirected to.
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Evaluate one navigation request.
    pub fn check(&self, path: &str, token: Option<&str>) -> GuardDecision {
        let protected = self
            .protected_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()));
        if !protected {
            return GuardDecision::Proceed;
        }

        match token {
            Some(token) if !token.is_empty() => GuardDecision::Proceed,
            _ => GuardDecision::Redirect(self.login_path.clone()),
        }
    }

    /// Extract the bearer token from navigation-time request material:
    /// the `access_token` cookie first, then an `Authorization` header.
    pub fn token_from_request(
        cookie_header: Option<&str>,
        authorization: Option<&str>,
    ) -> Option<String> {
        if let Some(cookies) = cookie_header {
            for pair in cookies.split(';') {
                if let Some(value) = pair.trim().strip_prefix(TOKEN_KEY) {
                    if let Some(value) = value.strip_prefix('=') {
                        return Some(value.to_string());
                    }
                }
            }
        }

        authorization
            .and_then(|header| header.strip_prefix("Bearer "))
            .map(str::to_string)
    }
}
