pub mod session;

use rand::Rng;

use crate::backend::Principal;

pub use session::SessionStore;

const MAX_PRINCIPAL_LEN: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Principal must be 1-63 characters of a-z, 0-9 and '-'")]
    InvalidPrincipal,
}

/// Turns a login attempt into an opaque principal.
pub trait IdentityProvider: Send + Sync {
    fn login(&self, hint: Option<&str>) -> Result<Principal, AuthError>;
}

/// Development identity: trusts a supplied principal text, or mints a random
/// one when none is given.
#[derive(Debug, Default, Clone, Copy)]
pub struct DevIdentityProvider;

impl IdentityProvider for DevIdentityProvider {
    fn login(&self, hint: Option<&str>) -> Result<Principal, AuthError> {
        let Some(hint) = hint.map(str::trim).filter(|h| !h.is_empty()) else {
            let principal = mint_principal();
            tracing::info!(principal = %principal, "Minted development principal");
            return Ok(principal);
        };

        let text = hint.to_ascii_lowercase();
        let valid = text.len() <= MAX_PRINCIPAL_LEN
            && text
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid {
            return Err(AuthError::InvalidPrincipal);
        }
        Ok(Principal::new(text))
    }
}

/// Six dash-separated groups of five hex digits.
fn mint_principal() -> Principal {
    let bytes: [u8; 15] = rand::thread_rng().gen();
    let digits = hex::encode(bytes);
    let groups: Vec<&str> = (0..digits.len())
        .step_by(5)
        .map(|start| &digits[start..start + 5])
        .collect();
    Principal::new(groups.join("-"))
}
