//! The symmetric key shared between a subverted party and its adversary.

use core::fmt;

use rand::Rng;

use crate::errors::KleptoError;

/// Length of a backdoor key in bytes (an AES-256 key).
pub const BACKDOOR_KEY_LEN: usize = 32;

/// Opaque symmetric key known only to the subverted party and the adversary.
///
/// It never appears in a transcript. `Debug` output is redacted; the hex text
/// form exists for the run store.
#[derive(Clone, PartialEq, Eq)]
pub struct BackdoorKey([u8; BACKDOOR_KEY_LEN]);

impl BackdoorKey {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; BACKDOOR_KEY_LEN];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; BACKDOOR_KEY_LEN]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; BACKDOOR_KEY_LEN] {
        &self.0
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses the output of [`BackdoorKey::to_hex`].
    pub fn from_hex(text: &str) -> Result<Self, KleptoError> {
        let mut bytes = [0u8; BACKDOOR_KEY_LEN];
        hex::decode_to_slice(text.trim(), &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for BackdoorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BackdoorKey(..)")
    }
}
