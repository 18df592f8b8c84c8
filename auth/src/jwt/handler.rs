use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::TokenClaims;
use super::claims::TokenKind;
use super::errors::JwtError;

/// JWT token handler for signing and verifying session tokens.
///
/// Uses HS256 (HMAC with SHA-256). Expiry is enforced with zero leeway.
#[derive(Clone)]
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Minimum secret length accepted for HS256.
    pub const MIN_SECRET_LENGTH: usize = 32;

    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens
    ///
    /// # Returns
    /// JwtHandler instance configured with HS256 algorithm
    ///
    /// # Errors
    /// * `WeakSecret` - Secret is shorter than 256 bits
    pub fn new(secret: &[u8]) -> Result<Self, JwtError> {
        if secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(JwtError::WeakSecret {
                min: Self::MIN_SECRET_LENGTH,
                actual: secret.len(),
            });
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        })
    }

    /// Sign claims into a compact JWT.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode(&self, claims: &TokenClaims) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify signature and expiry, then check the token kind.
    ///
    /// # Arguments
    /// * `token` - JWT token string
    /// * `expected` - Kind the caller is willing to accept
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `TokenExpired` - exp claim is in the past
    /// * `InvalidToken` - Signature mismatch or malformed token
    /// * `DecodingFailed` - Claims payload could not be parsed
    /// * `WrongKind` - Token was minted for another purpose
    pub fn decode(&self, token: &str, expected: TokenKind) -> Result<TokenClaims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data =
            decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                    ErrorKind::InvalidSignature
                    | ErrorKind::InvalidToken
                    | ErrorKind::InvalidAlgorithm
                    | ErrorKind::Base64(_) => JwtError::InvalidToken(e.to_string()),
                    _ => JwtError::DecodingFailed(e.to_string()),
                }
            })?;

        let claims = token_data.claims;
        if claims.kind != expected {
            return Err(JwtError::WrongKind {
                expected,
                actual: claims.kind,
            });
        }

        Ok(claims)
    }
}
