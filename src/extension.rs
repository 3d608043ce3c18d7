use crate::error::{LengthErrorKind, Result, RtpError};

/// RTP header extension (RFC 3550 §5.3.1).
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      defined by profile       |           length              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        header extension                       |
/// |                             ....                              |
/// ```
///
/// The 16-bit profile field is kept as two opaque bytes ([`start_bits`]).
/// The length field counts 32-bit words in the body, excluding the 4-byte
/// preamble, so the body must be word aligned and at most 65535 words.
/// Both constraints are checked on every assignment.
///
/// [`start_bits`]: Self::start_bits
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Extension {
    start_bits: [u8; 2],
    header_extension: Vec<u8>,
}

impl Extension {
    /// Size of the profile and length fields that precede the body.
    pub const PREAMBLE_LEN: usize = 4;

    /// Largest body the 16-bit word count can describe.
    pub const MAX_BODY_LEN: usize = u16::MAX as usize * 4;

    /// Create an extension, validating the body.
    pub fn new(start_bits: [u8; 2], header_extension: Vec<u8>) -> Result<Self> {
        check_body(&header_extension)?;
        Ok(Self {
            start_bits,
            header_extension,
        })
    }

    /// The profile-defined first 16 bits.
    pub fn start_bits(&self) -> [u8; 2] {
        self.start_bits
    }

    /// Replace the profile-defined bits. `bits` must be exactly 2 bytes.
    pub fn set_start_bits(&mut self, bits: &[u8]) -> Result<()> {
        self.start_bits = <[u8; 2]>::try_from(bits)
            .map_err(|_| RtpError::length(LengthErrorKind::StartBits { len: bits.len() }))?;
        Ok(())
    }

    /// The extension body, without the 4-byte preamble.
    pub fn header_extension(&self) -> &[u8] {
        &self.header_extension
    }

    /// Replace the body. It must be a multiple of 4 bytes and at most
    /// [`MAX_BODY_LEN`](Self::MAX_BODY_LEN) long.
    pub fn set_header_extension(&mut self, body: Vec<u8>) -> Result<()> {
        check_body(&body)?;
        self.header_extension = body;
        Ok(())
    }

    /// Value written to the length field.
    pub fn word_count(&self) -> u16 {
        // check_body bounds the body to u16::MAX words
        (self.header_extension.len() / 4) as u16
    }

    /// Total encoded size, preamble included.
    pub fn encoded_len(&self) -> usize {
        self.header_extension.len() + Self::PREAMBLE_LEN
    }

    /// Parse an extension occupying all of `bytes`.
    ///
    /// The length field must describe exactly the bytes that follow the
    /// preamble, otherwise a length error is returned.
    ///
    /// ```
    /// use rtp::Extension;
    ///
    /// let ext = Extension::decode(&[0xbe, 0xde, 0x00, 0x01, 1, 2, 3, 4]).unwrap();
    /// assert_eq!(ext.start_bits(), [0xbe, 0xde]);
    /// assert_eq!(ext.header_extension(), &[1, 2, 3, 4]);
    ///
    /// assert!(Extension::decode(&[0xbe, 0xde, 0x00, 0x02, 1, 2, 3, 4]).is_err());
    /// ```
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::PREAMBLE_LEN {
            return Err(RtpError::length(LengthErrorKind::Truncated {
                needed: Self::PREAMBLE_LEN,
                available: bytes.len(),
            }));
        }

        let declared = u16::from_be_bytes([bytes[2], bytes[3]]);
        if bytes.len() % 4 != 0 || bytes.len() / 4 - 1 != declared as usize {
            tracing::debug!(
                declared,
                actual = bytes.len(),
                "extension length field mismatch"
            );
            return Err(RtpError::length(LengthErrorKind::LengthFieldMismatch {
                declared,
                actual: bytes.len(),
            }));
        }

        Ok(Self {
            start_bits: [bytes[0], bytes[1]],
            header_extension: bytes[Self::PREAMBLE_LEN..].to_vec(),
        })
    }

    /// Append the encoded extension to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.start_bits);
        buf.extend_from_slice(&self.word_count().to_be_bytes());
        buf.extend_from_slice(&self.header_extension);
    }

    /// Serialize the preamble followed by the body.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf
    }
}

fn check_body(body: &[u8]) -> Result<()> {
    if body.len() % 4 != 0 {
        return Err(RtpError::length(LengthErrorKind::Unaligned { len: body.len() }));
    }
    if body.len() > Extension::MAX_BODY_LEN {
        return Err(RtpError::length(LengthErrorKind::TooLong {
            words: body.len() / 4,
        }));
    }
    Ok(())
}

impl TryFrom<&[u8]> for Extension {
    type Error = RtpError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::decode(bytes)
    }
}
