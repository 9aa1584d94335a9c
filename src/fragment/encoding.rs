//! Text encodings used to carry payload bytes inside QR alphanumeric mode.

use std::io::Read;

use data_encoding::{BASE32_NOPAD, HEXUPPER, HEXUPPER_PERMISSIVE};
use flate2::{Compress, Compression, FlushCompress, Status, read::DeflateDecoder};
use serde::{Deserialize, Serialize};

use super::{JoinError, SplitError};

/// DEFLATE window size, in bits, expected by BBQr readers.
pub const DEFLATE_WINDOW_BITS: u8 = 10;

/// Payload encoding, carried as one header character.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    /// Upper-case hexadecimal (`H`).
    Hex,
    /// RFC 4648 base32 without padding (`2`).
    #[default]
    Base32,
    /// Raw DEFLATE stream wrapped in base32 (`Z`).
    Zlib,
}

impl Encoding {
    /// Header character for this encoding.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Hex => 'H',
            Self::Base32 => '2',
            Self::Zlib => 'Z',
        }
    }

    /// Look up an encoding from its header character.
    #[must_use]
    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            'H' => Some(Self::Hex),
            '2' => Some(Self::Base32),
            'Z' => Some(Self::Zlib),
            _ => None,
        }
    }

    /// Number of characters that decode to a whole number of bytes.
    ///
    /// Every part except the last carries a multiple of this many
    /// characters.
    #[must_use]
    pub const fn split_modulus(self) -> usize {
        match self {
            Self::Hex => 2,
            Self::Base32 | Self::Zlib => 8,
        }
    }

    /// Encode `payload` as header-safe text.
    ///
    /// [`Encoding::Zlib`] compresses with a raw DEFLATE stream using a
    /// [`DEFLATE_WINDOW_BITS`] window before wrapping it in base32.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::Compression`] if the compressor fails.
    pub fn encode(self, payload: &[u8]) -> Result<String, SplitError> {
        match self {
            Self::Hex => Ok(HEXUPPER.encode(payload)),
            Self::Base32 => Ok(BASE32_NOPAD.encode(payload)),
            Self::Zlib => Ok(BASE32_NOPAD.encode(&deflate(payload)?)),
        }
    }

    /// Check one part body on its own.
    ///
    /// Every body but the last must hold a multiple of
    /// [`split_modulus`](Self::split_modulus) characters, and each body
    /// must decode independently. The compressed stream of
    /// [`Encoding::Zlib`] can only be checked once the series is whole.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn check_body(self, body: &str, last: bool) -> Result<(), String> {
        let modulus = self.split_modulus();
        if !last && body.len() % modulus != 0 {
            return Err(format!(
                "{} characters is not a multiple of {modulus}",
                body.len()
            ));
        }
        let decoded = match self {
            Self::Hex => HEXUPPER_PERMISSIVE.decode(body.as_bytes()),
            Self::Base32 | Self::Zlib => BASE32_NOPAD.decode(body.as_bytes()),
        };
        decoded.map(drop).map_err(|err| err.to_string())
    }

    /// Decode concatenated part bodies back into payload bytes.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError::Decode`] when the text is not valid for this
    /// encoding or the compressed stream is corrupt.
    pub fn decode(self, text: &str) -> Result<Vec<u8>, JoinError> {
        let fail = |reason: String| JoinError::Decode {
            encoding: self,
            reason,
        };
        match self {
            Self::Hex => HEXUPPER_PERMISSIVE
                .decode(text.as_bytes())
                .map_err(|err| fail(err.to_string())),
            Self::Base32 => BASE32_NOPAD
                .decode(text.as_bytes())
                .map_err(|err| fail(err.to_string())),
            Self::Zlib => {
                let compressed = BASE32_NOPAD
                    .decode(text.as_bytes())
                    .map_err(|err| fail(err.to_string()))?;
                let mut inflated = Vec::new();
                DeflateDecoder::new(compressed.as_slice())
                    .read_to_end(&mut inflated)
                    .map_err(|err| fail(err.to_string()))?;
                Ok(inflated)
            }
        }
    }
}

fn deflate(payload: &[u8]) -> Result<Vec<u8>, SplitError> {
    let fail = |reason: String| SplitError::Compression { reason };
    let mut compress =
        Compress::new_with_window_bits(Compression::best(), false, DEFLATE_WINDOW_BITS);
    let mut out = Vec::with_capacity(payload.len() / 2 + 64);
    loop {
        let consumed = usize::try_from(compress.total_in()).map_err(|err| fail(err.to_string()))?;
        let rest = payload.get(consumed..).unwrap_or_default();
        match compress
            .compress_vec(rest, &mut out, FlushCompress::Finish)
            .map_err(|err| fail(err.to_string()))?
        {
            Status::StreamEnd => return Ok(out),
            Status::Ok | Status::BufError => out.reserve(out.capacity().max(64)),
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
