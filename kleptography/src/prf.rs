//! AES-based pseudorandom function keyed by the backdoor key.
//!
//! An input integer is encoded big-endian at a fixed width, optionally has a
//! one-bit selector XOR-ed into its last byte, is PKCS#7 padded and encrypted
//! with AES-256-CBC under a zero IV. The leading ciphertext bytes, read as a
//! big-endian integer, are the PRF output. With outputs of at most one block
//! this coincides with single-block ECB encryption.

use core::fmt;

use aes::cipher::generic_array::GenericArray;
use aes::cipher::KeyInit;
use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockEncryptMut, InnerIvInit};
use modp::GroupParameters;
use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::backdoor::BackdoorKey;
use crate::errors::KleptoError;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Length of the PKCS#7-padded encoding, and hence of the ciphertext, for an
/// input of `input_len` bytes.
#[inline]
pub const fn ciphertext_len(input_len: usize) -> usize {
    (input_len / BLOCK_SIZE + 1) * BLOCK_SIZE
}

/// Keyed PRF over fixed-width integer inputs.
#[derive(Clone)]
pub struct PrfOracle {
    cipher: Aes256,
    input_len: usize,
}

impl PrfOracle {
    /// Creates an oracle whose inputs are encoded on `input_len` bytes.
    pub fn new(key: &BackdoorKey, input_len: usize) -> Self {
        Self {
            cipher: Aes256::new(GenericArray::from_slice(key.as_bytes())),
            input_len,
        }
    }

    /// Creates an oracle sized for residues modulo `p`.
    pub fn for_group(key: &BackdoorKey, params: &GroupParameters) -> Self {
        Self::new(key, params.modulus_bytes())
    }

    #[inline]
    pub fn input_len(&self) -> usize {
        self.input_len
    }

    /// `PRF(key, input)` truncated to `output_len` bytes.
    pub fn evaluate(&self, input: &BigUint, output_len: usize) -> Result<BigUint, KleptoError> {
        let encoded = self.encode(input)?;
        self.encrypt_truncated(encoded, output_len)
    }

    /// `PRF(key, input)` with `selector` folded into the low bit of the last input byte.
    pub fn evaluate_with_selector(
        &self,
        input: &BigUint,
        selector: bool,
        output_len: usize,
    ) -> Result<BigUint, KleptoError> {
        let mut encoded = self.encode(input)?;
        if let Some(last) = encoded.last_mut() {
            *last ^= u8::from(selector);
        }
        self.encrypt_truncated(encoded, output_len)
    }

    /// Splits a full-width PRF output `v` into `(v mod n, (v div n) mod 2)`.
    ///
    /// `n` is the bit length of the secret key, so the first component is a
    /// key bit position and the second a candidate value for that bit.
    pub fn position_and_bit(&self, input: &BigUint, n: usize) -> Result<(usize, bool), KleptoError> {
        if n == 0 {
            return Err(KleptoError::InvalidConfig("key bit length must be positive"));
        }
        let v = self.evaluate(input, self.input_len)?;
        let n_big = BigUint::from(n);
        // v mod n < n, so the conversion cannot fail.
        let position = (&v % &n_big).to_usize().unwrap_or_default();
        let bit = (v / n_big).bit(0);
        Ok((position, bit))
    }

    fn encode(&self, input: &BigUint) -> Result<Vec<u8>, KleptoError> {
        let bytes = input.to_bytes_be();
        // Zero encodes as a single 0x00 byte, which still fits any width.
        let significant = if input.bits() == 0 { 0 } else { bytes.len() };
        if significant > self.input_len {
            return Err(KleptoError::PrfInputTooLarge {
                len: significant,
                max: self.input_len,
            });
        }
        let mut out = vec![0u8; self.input_len];
        out[self.input_len - significant..].copy_from_slice(&bytes[bytes.len() - significant..]);
        Ok(out)
    }

    fn encrypt_truncated(&self, data: Vec<u8>, output_len: usize) -> Result<BigUint, KleptoError> {
        let available = ciphertext_len(data.len());
        if output_len > available {
            return Err(KleptoError::PrfOutputTooLong {
                requested: output_len,
                available,
            });
        }

        // Zero IV.
        let ciphertext = Aes256CbcEnc::inner_iv_init(self.cipher.clone(), &GenericArray::default())
            .encrypt_padded_vec_mut::<Pkcs7>(&data);
        Ok(BigUint::from_bytes_be(&ciphertext[..output_len]))
    }
}

impl fmt::Debug for PrfOracle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrfOracle")
            .field("input_len", &self.input_len)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn oracle(input_len: usize) -> PrfOracle {
        PrfOracle::new(&BackdoorKey::from_bytes([7u8; 32]), input_len)
    }

    #[test]
    fn test_ciphertext_len_adds_full_padding_block() {
        assert_eq!(ciphertext_len(16), 32);
        assert_eq!(ciphertext_len(8), 16);
        assert_eq!(ciphertext_len(15), 16);
        assert_eq!(ciphertext_len(192), 208);
    }

    #[test]
    fn test_known_answer_single_block() {
        // FIPS-197 C.3: AES-256 with key 00..1f on 00112233..eeff.
        let key_bytes: [u8; 32] = core::array::from_fn(|i| i as u8);
        let key = BackdoorKey::from_bytes(key_bytes);
        let prf = PrfOracle::new(&key, 16);
        let input = BigUint::parse_bytes(b"00112233445566778899aabbccddeeff", 16).expect("hex");
        let out = prf.evaluate(&input, 16).expect("prf");
        let expected = BigUint::parse_bytes(b"8ea2b7ca516745bfeafc49904b496089", 16).expect("hex");
        assert_eq!(out, expected);
    }

    #[test]
    fn test_second_block_is_chained() {
        // Equal second plaintext blocks encrypt differently once the first
        // blocks differ.
        let prf = oracle(32);
        let a = BigUint::from_bytes_be(&[[1u8; 16], [0u8; 16]].concat());
        let b = BigUint::from_bytes_be(&[[2u8; 16], [0u8; 16]].concat());
        let second_block = |v: BigUint| {
            let bytes = v.to_bytes_be();
            bytes[bytes.len() - BLOCK_SIZE..].to_vec()
        };
        assert_ne!(
            second_block(prf.evaluate(&a, 32).expect("prf")),
            second_block(prf.evaluate(&b, 32).expect("prf"))
        );
        assert!(prf.evaluate(&a, ciphertext_len(32)).is_ok());
    }

    #[test]
    fn test_selector_changes_output() {
        let prf = oracle(16);
        let input = BigUint::from(0xdead_beefu32);
        let zero = prf.evaluate_with_selector(&input, false, 16).expect("prf");
        let one = prf.evaluate_with_selector(&input, true, 16).expect("prf");
        assert_ne!(zero, one);
        assert_eq!(zero, prf.evaluate(&input, 16).expect("prf"));
    }

    #[test]
    fn test_rejects_oversized_input_and_output() {
        let prf = oracle(4);
        let wide = BigUint::from(1u64 << 40);
        assert_eq!(
            prf.evaluate(&wide, 4),
            Err(KleptoError::PrfInputTooLarge { len: 6, max: 4 })
        );
        assert_eq!(
            prf.evaluate(&BigUint::from(1u32), 17),
            Err(KleptoError::PrfOutputTooLong {
                requested: 17,
                available: 16
            })
        );
    }

    #[test]
    fn test_zero_input_is_encodable() {
        let prf = oracle(16);
        assert!(prf.evaluate(&BigUint::from(0u32), 16).is_ok());
    }

    #[test]
    fn test_position_and_bit_requires_positive_length() {
        let prf = oracle(16);
        assert!(matches!(
            prf.position_and_bit(&BigUint::from(1u32), 0),
            Err(KleptoError::InvalidConfig(_))
        ));
    }

    proptest! {
        #[test]
        fn prf_is_deterministic_and_bounded(
            key in prop::array::uniform32(any::<u8>()),
            input in any::<u128>(),
            output_len in 1usize..=32,
        ) {
            let prf = PrfOracle::new(&BackdoorKey::from_bytes(key), 16);
            let input = BigUint::from(input);
            let a = prf.evaluate(&input, output_len).expect("prf");
            let b = prf.evaluate(&input, output_len).expect("prf");
            prop_assert_eq!(&a, &b);
            prop_assert!(a.bits() <= 8 * output_len as u64);
        }

        #[test]
        fn position_and_bit_in_range(
            key in prop::array::uniform32(any::<u8>()),
            input in any::<u64>(),
            n in 1usize..600,
        ) {
            let prf = PrfOracle::new(&BackdoorKey::from_bytes(key), 16);
            let (position, _) = prf.position_and_bit(&BigUint::from(input), n).expect("prf");
            prop_assert!(position < n);
        }
    }
}
