//! Request authentication.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Credentials attached to every request.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// No `Authorization` header.
    Anonymous,
    /// Username (or email) and API token.
    Basic {
        /// Username or email.
        username: String,
        /// API token.
        api_token: String,
    },
    /// Personal Access Token.
    Bearer(String),
}

impl Auth {
    /// Pick the authentication scheme from configured credentials.
    ///
    /// A non-empty `pat` wins over basic credentials.
    pub fn from_credentials(username: &str, api_token: &str, pat: &str) -> Self {
        if !pat.is_empty() {
            Self::Bearer(pat.to_owned())
        } else if !username.is_empty() && !api_token.is_empty() {
            Self::Basic {
                username: username.to_owned(),
                api_token: api_token.to_owned(),
            }
        } else {
            Self::Anonymous
        }
    }

    /// Value of the `Authorization` header, if any.
    pub(crate) fn header(&self) -> Option<String> {
        match self {
            Self::Anonymous => None,
            Self::Basic {
                username,
                api_token,
            } => {
                let encoded = STANDARD.encode(format!("{username}:{api_token}"));
                Some(format!("Basic {encoded}"))
            }
            Self::Bearer(token) => Some(format!("Bearer {token}")),
        }
    }
}

// Credentials never show up in logs.
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::Bearer(_) => f.write_str("Bearer(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_pat_wins() {
        let auth = Auth::from_credentials("me", "token", "pat123");
        assert_eq!(auth, Auth::Bearer("pat123".to_owned()));
        assert_eq!(auth.header().unwrap(), "Bearer pat123");
    }

    #[test]
    fn test_basic_header() {
        let auth = Auth::from_credentials("user", "pass", "");
        assert_eq!(auth.header().unwrap(), "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn test_anonymous_without_credentials() {
        let auth = Auth::from_credentials("user", "", "");
        assert_eq!(auth, Auth::Anonymous);
        assert!(auth.header().is_none());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let auth = Auth::from_credentials("user", "secret", "");
        let debug = format!("{auth:?}");
        assert!(debug.contains("user"));
        assert!(!debug.contains("secret"));
        assert_eq!(format!("{:?}", Auth::Bearer("secret".to_owned())), "Bearer(..)");
    }
}
