use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::{error, warn};

/// Argon2id with a per-digest random salt and a process-wide pepper passed
/// as the Argon2 secret, so a leaked table is useless without the pepper.
#[derive(Clone)]
pub struct CredentialHasher {
    pepper: Vec<u8>,
    params: Params,
}

impl CredentialHasher {
    pub fn new(pepper: impl Into<Vec<u8>>) -> Self {
        Self {
            pepper: pepper.into(),
            params: Params::default(),
        }
    }

    /// Cheap parameters for tests; never use in production.
    pub fn fast(pepper: impl Into<Vec<u8>>) -> Self {
        let params = Params::new(Params::MIN_M_COST * 2, 1, 1, None).unwrap_or_default();
        Self {
            pepper: pepper.into(),
            params,
        }
    }

    fn argon2(&self) -> anyhow::Result<Argon2<'_>> {
        Argon2::new_with_secret(
            &self.pepper,
            Algorithm::Argon2id,
            Version::V0x13,
            self.params.clone(),
        )
        .map_err(|e| anyhow::anyhow!("argon2 setup: {e}"))
    }

    pub fn digest(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()?
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// Constant-time check; a malformed stored digest simply fails to verify.
    pub fn verify(&self, plain: &str, digest: &str) -> bool {
        let parsed = match PasswordHash::new(digest) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "stored password digest is not a valid PHC string");
                return false;
            }
        };
        match self.argon2() {
            Ok(argon2) => argon2.verify_password(plain.as_bytes(), &parsed).is_ok(),
            Err(e) => {
                error!(error = %e, "argon2 setup failed during verify");
                false
            }
        }
    }
}
