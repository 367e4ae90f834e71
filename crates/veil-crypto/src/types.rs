/// AES key length in bytes (256 bits).
pub const AES_KEY_LENGTH: usize = 32;

/// AES block length in bytes, which is also the CBC IV length.
pub const AES_BLOCK_LENGTH: usize = 16;

/// Secret Vernam key length in bytes.
pub const VERNAM_KEY_LENGTH: usize = 32;

/// Per-message Vernam session key length.
///
/// The session key is sent in the clear at the front of the Vernam output:
/// [session key:32][payload XOR keystream]
pub const SESSION_KEY_LENGTH: usize = 32;

/// Suffix marking a big integer carried inside a JSON string.
pub const BIGINT_SUFFIX: &str = "#bigint";
