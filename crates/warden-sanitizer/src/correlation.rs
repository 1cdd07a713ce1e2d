//! Correlation/public token generation.
//!
//! A `uuid::Uuid::new_v4` call produces the audit correlation id, paired
//! with a short CSPRNG-derived token for the half of the pair that actually
//! leaves the process.

use rand::RngCore;
use uuid::Uuid;

/// A private identifier, logged alongside the real failure reason. Never
/// returned to the caller.
#[must_use]
pub fn generate_correlation_id() -> String {
    format!("sec_{}", Uuid::new_v4())
}

/// A short, unpredictable identifier returned to the caller so operators can
/// find the matching log record without leaking anything themselves.
#[must_use]
pub fn generate_public_token() -> String {
    let mut bytes = [0u8; 6];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
