use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::config::SigningKeyConfig;

#[derive(Debug, Error)]
pub enum SignError {
    #[error("invalid signing key: {0}")]
    InvalidKey(jsonwebtoken::errors::Error),
    #[error("failed to sign request object: {0}")]
    Sign(jsonwebtoken::errors::Error),
}

/// Canonical payload signed into the COR-901 `request` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeClaims {
    pub member_name: String,
    pub password: String,
    pub client_id: String,
    pub nonce: String,
}

/// Produces the compact JWS the Core API verifies on COR-901.
#[derive(Clone)]
pub struct RequestSigner {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("RequestSigner")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl RequestSigner {
    pub fn from_config(key: &SigningKeyConfig) -> Result<Self, SignError> {
        match key {
            SigningKeyConfig::Hmac(secret) => Ok(Self {
                algorithm: Algorithm::HS256,
                encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            }),
            SigningKeyConfig::EdPem(pem) => {
                let encoding_key = EncodingKey::from_ed_pem(pem.as_bytes()).map_err(|e| {
                    warn!(error = %e, "failed to parse request signing key PEM (expected Ed25519 PKCS#8 PEM)");
                    SignError::InvalidKey(e)
                })?;
                Ok(Self {
                    algorithm: Algorithm::EdDSA,
                    encoding_key,
                })
            }
        }
    }

    pub fn sign<T: Serialize>(&self, claims: &T) -> Result<String, SignError> {
        let mut header = Header::new(self.algorithm);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign request object");
            SignError::Sign(e)
        })
    }
}
