// src/auth/password.rs

//! Password storage as Argon2id PHC strings. Verification reads the cost from
//! the stored string, so changing [`PasswordCost`] only affects new hashes.

use crate::errors::ServerError;
use argon2::{Algorithm, Argon2, Params, Version};
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordCost {
    pub memory_kib: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for PasswordCost {
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl PasswordCost {
    fn hasher(&self) -> Result<Argon2<'static>, ServerError> {
        let params = Params::new(self.memory_kib, self.time_cost, self.parallelism, None)
            .map_err(|e| {
                log::error!("Rejected argon2 cost {self:?}: {e}");
                ServerError::InternalError
            })?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

pub fn hash_password(cost: &PasswordCost, password: &str) -> Result<String, ServerError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = cost
        .hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            log::error!("Password hashing failed: {e}");
            ServerError::InternalError
        })?;
    Ok(hash.to_string())
}

/// False for a wrong password and for a stored value that is not a PHC string.
pub fn verify_password(stored: &str, password: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::warn!("Stored password hash unreadable: {e}");
            false
        }
    }
}

#[cfg(test)]
pub(crate) const TEST_COST: PasswordCost = PasswordCost {
    memory_kib: 1024,
    time_cost: 1,
    parallelism: 1,
};
