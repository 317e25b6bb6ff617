//! # HTTP Basic Credentials

use base64::Engine;

use super::errors::{AuthError, AuthResult};

/// Login and password from an `Authorization: Basic ...` header.
///
/// The login is either a username or an email address.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub login: String,
    pub password: String,
}

impl BasicCredentials {
    /// Parse the value of an `Authorization` header
    pub fn parse(header: &str) -> AuthResult<Self> {
        let (scheme, encoded) = header
            .trim()
            .split_once(' ')
            .ok_or(AuthError::MalformedHeader)?;

        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(AuthError::MalformedHeader);
        }

        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|_| AuthError::MalformedHeader)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedHeader)?;

        let (login, password) = decoded
            .split_once(':')
            .ok_or(AuthError::MalformedHeader)?;

        if login.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Self {
            login: login.to_string(),
            password: password.to_string(),
        })
    }

    /// Build the header value for these credentials
    pub fn to_header(&self) -> String {
        let raw = format!("{}:{}", self.login, self.password);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_header() {
        // "maria:s3cret:with:colons"
        let creds = BasicCredentials::parse("Basic bWFyaWE6czNjcmV0OndpdGg6Y29sb25z").unwrap();
        assert_eq!(creds.login, "maria");
        assert_eq!(creds.password, "s3cret:with:colons");
    }

    #[test]
    fn test_header_round_trip() {
        let creds = BasicCredentials {
            login: "maria@example.com".to_string(),
            password: "pw".to_string(),
        };
        assert_eq!(BasicCredentials::parse(&creds.to_header()).unwrap(), creds);
    }

    #[test]
    fn test_wrong_scheme_rejected() {
        assert!(matches!(
            BasicCredentials::parse("Bearer abc.def"),
            Err(AuthError::MalformedHeader)
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(BasicCredentials::parse("Basic !!!").is_err());
        assert!(BasicCredentials::parse("Basic").is_err());
        // "nocolon"
        assert!(BasicCredentials::parse("Basic bm9jb2xvbg==").is_err());
    }

    #[test]
    fn test_debug_hides_password() {
        let creds = BasicCredentials {
            login: "maria".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }
}
