// src/services/auth.rs

use jsonwebtoken::{decode, DecodingKey, Validation};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::Claims};

/// Confere tokens HS256 assinados com o `JWT_SECRET`.
#[derive(Clone)]
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    /// Devolve o ID do dono dos dados (o `sub` do token).
    pub fn validate(&self, token: &str) -> Result<Uuid, AppError> {
        // Usa '?' para converter jsonwebtoken::errors::Error -> AppError::JwtError
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;

        Ok(token_data.claims.sub)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::issue_token;
    use super::*;

    #[test]
    fn valid_token_yields_owner() {
        let owner = Uuid::new_v4();
        let validator = TokenValidator::new("segredo");

        assert_eq!(validator.validate(&issue_token("segredo", owner, 3600)).unwrap(), owner);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let validator = TokenValidator::new("segredo");
        let token = issue_token("outro-segredo", Uuid::new_v4(), 3600);

        assert!(matches!(validator.validate(&token), Err(AppError::JwtError(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let validator = TokenValidator::new("segredo");
        let token = issue_token("segredo", Uuid::new_v4(), -3600);

        assert!(matches!(validator.validate(&token), Err(AppError::JwtError(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        let validator = TokenValidator::new("segredo");
        assert!(matches!(validator.validate("nao-e-um-jwt"), Err(AppError::JwtError(_))));
    }
}
