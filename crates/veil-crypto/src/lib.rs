//! Payload cryptography for veil call envelopes.
//!
//! - Modular exponentiation for the identification protocol
//! - Seed-derived keystream and lazy bit-stream adaptors
//! - Session-keyed Vernam cipher wrapped in AES-256-CBC
//! - JSON values carrying big integers and GUIDs
//! - SHA-512 pseudonyms

pub mod bits;
pub mod block;
pub mod crypter;
pub mod error;
pub mod guid;
pub mod hash;
pub mod json;
pub mod keys;
pub mod keystream;
pub mod modular;
pub mod text;
pub mod types;
pub mod vernam;

pub use bits::{bits_of, pack_bits, xor_bits, Bits, Xor};
pub use block::{generate_iv, BlockCipherLayer, IvMode};
pub use crypter::HybridCrypter;
pub use error::CryptoError;
pub use guid::Guid;
pub use hash::sha512;
pub use json::{Map, Value};
pub use keys::CryptionKeys;
pub use keystream::Keystream;
pub use modular::{mod_mul, mod_pow, mod_square};
pub use text::{bytes_to_text, text_to_bytes};
pub use types::{AES_BLOCK_LENGTH, AES_KEY_LENGTH, BIGINT_SUFFIX, SESSION_KEY_LENGTH, VERNAM_KEY_LENGTH};
pub use vernam::{generate_session_key, VernamCipher};
