use base64::Engine;
use base64::engine::general_purpose;
use http::HeaderValue;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::error::HttpError;
use crate::secret::SecretString;

/// How the client authenticates against Grafana.
///
/// Admin endpoints require basic authentication as a Grafana server admin;
/// service-account tokens go through [`Credentials::Bearer`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Credentials {
    /// No `Authorization` header
    #[default]
    None,
    /// `Authorization: Basic base64(user:password)`
    Basic { user: String, password: SecretString },
    /// `Authorization: Bearer <token>`
    Bearer { token: SecretString },
}

impl Credentials {
    #[must_use]
    pub fn basic(user: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self::Basic {
            user: user.into(),
            password: password.into(),
        }
    }

    #[must_use]
    pub fn bearer(token: impl Into<SecretString>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Build the `Authorization` header value, marked sensitive.
    ///
    /// Returns `Ok(None)` for [`Credentials::None`].
    ///
    /// # Errors
    ///
    /// Returns `HttpError::InvalidHeaderValue` if a token contains characters
    /// that are not allowed in a header.
    pub fn authorization_header(&self) -> Result<Option<HeaderValue>, HttpError> {
        let raw = match self {
            Self::None => return Ok(None),
            Self::Basic { user, password } => {
                let pair = Zeroizing::new(format!("{user}:{}", password.expose()));
                let encoded = Zeroizing::new(general_purpose::STANDARD.encode(pair.as_bytes()));
                Zeroizing::new(format!("Basic {}", &*encoded))
            }
            Self::Bearer { token } => Zeroizing::new(format!("Bearer {}", token.expose())),
        };

        let mut value = HeaderValue::from_str(&raw)?;
        value.set_sensitive(true);
        Ok(Some(value))
    }
}
