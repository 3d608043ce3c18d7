use crate::csrc::CsrcList;
use crate::error::{LengthErrorKind, Result, RtpError};
use crate::extension::Extension;
use crate::payload_type::PayloadType;

/// The only RTP version this codec accepts (RFC 3550 §5.1).
pub const RTP_VERSION: u8 = 2;

/// Size of the fixed header preceding the CSRC list.
pub const FIXED_HEADER_LEN: usize = 12;

/// An RTP packet (RFC 3550 §5.1).
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |V=2|P|X|  CC   |M|     PT      |       sequence number         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           timestamp                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |           synchronization source (SSRC) identifier            |
/// +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// |            contributing source (CSRC) identifiers             |
/// |                             ....                              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                 header extension (if X is set)                |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                            payload                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// The X and CC bits are not stored: they are derived from
/// [`extension`](Self::extension) and [`csrc_list`](Self::csrc_list) when
/// encoding, so the header can never disagree with the body.
///
/// Padding is carried as a flag only. Any padding octets stay at the end of
/// [`payload`](Self::payload), which keeps `encode(decode(b)) == b`.
///
/// Sequence number and SSRC are chosen randomly when not supplied
/// (RFC 3550 §5.1, §8.1). Use [`RtpPacket::builder`] to pin them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpPacket {
    version: u8,
    padding: bool,
    marker: bool,
    payload_type: PayloadType,
    sequence_number: u16,
    timestamp: u32,
    ssrc: u32,
    extension: Option<Extension>,
    csrc_list: CsrcList,
    payload: Vec<u8>,
}

fn random_sequence_number() -> u16 {
    let sequence_number = rand::random::<u16>();
    tracing::trace!(sequence_number, "random initial sequence number");
    sequence_number
}

fn random_ssrc() -> u32 {
    let ssrc = rand::random::<u32>();
    tracing::trace!(ssrc = format_args!("{:#010X}", ssrc), "random SSRC");
    ssrc
}

fn ensure_len(bytes: &[u8], needed: usize) -> Result<()> {
    if bytes.len() < needed {
        tracing::debug!(needed, available = bytes.len(), "RTP packet truncated");
        return Err(RtpError::length(LengthErrorKind::Truncated {
            needed,
            available: bytes.len(),
        }));
    }
    Ok(())
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

impl RtpPacket {
    /// Create a packet with default fields and a random sequence number
    /// and SSRC.
    pub fn new() -> Self {
        Self::with_identifiers(random_sequence_number(), random_ssrc())
    }

    /// Start building a packet with explicit field values.
    pub fn builder() -> PacketBuilder {
        PacketBuilder::default()
    }

    fn with_identifiers(sequence_number: u16, ssrc: u32) -> Self {
        Self {
            version: RTP_VERSION,
            padding: false,
            marker: false,
            payload_type: PayloadType::default(),
            sequence_number,
            timestamp: 0,
            ssrc,
            extension: None,
            csrc_list: CsrcList::new(),
            payload: Vec::new(),
        }
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// Only version 2 is accepted; anything else is a range error.
    pub fn set_version(&mut self, version: u8) -> Result<()> {
        if version != RTP_VERSION {
            return Err(RtpError::Range {
                field: "version",
                value: version as u64,
            });
        }
        self.version = version;
        Ok(())
    }

    pub fn padding(&self) -> bool {
        self.padding
    }

    pub fn set_padding(&mut self, padding: bool) {
        self.padding = padding;
    }

    pub fn marker(&self) -> bool {
        self.marker
    }

    pub fn set_marker(&mut self, marker: bool) {
        self.marker = marker;
    }

    pub fn payload_type(&self) -> PayloadType {
        self.payload_type
    }

    pub fn set_payload_type(&mut self, payload_type: PayloadType) {
        self.payload_type = payload_type;
    }

    pub fn sequence_number(&self) -> u16 {
        self.sequence_number
    }

    pub fn set_sequence_number(&mut self, sequence_number: u16) {
        self.sequence_number = sequence_number;
    }

    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: u32) {
        self.timestamp = timestamp;
    }

    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    pub fn set_ssrc(&mut self, ssrc: u32) {
        self.ssrc = ssrc;
    }

    pub fn extension(&self) -> Option<&Extension> {
        self.extension.as_ref()
    }

    /// Mutable access to the extension. Its own setters keep it valid.
    pub fn extension_mut(&mut self) -> Option<&mut Extension> {
        self.extension.as_mut()
    }

    pub fn set_extension(&mut self, extension: Option<Extension>) {
        self.extension = extension;
    }

    pub fn csrc_list(&self) -> &CsrcList {
        &self.csrc_list
    }

    /// Mutable access to the CSRC list; every mutation on it is validated.
    pub fn csrc_list_mut(&mut self) -> &mut CsrcList {
        &mut self.csrc_list
    }

    pub fn set_csrc_list(&mut self, csrc_list: CsrcList) {
        self.csrc_list = csrc_list;
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut Vec<u8> {
        &mut self.payload
    }

    pub fn set_payload(&mut self, payload: Vec<u8>) {
        self.payload = payload;
    }

    /// Serialize the 12-byte fixed header.
    ///
    /// The X bit and CC field are derived from the extension and CSRC list.
    pub fn fixed_header(&self) -> [u8; FIXED_HEADER_LEN] {
        let first_byte: u8 = (self.version << 6)
            | ((self.padding as u8) << 5)
            | ((self.extension.is_some() as u8) << 4)
            | self.csrc_list.len() as u8;
        let second_byte: u8 = ((self.marker as u8) << 7) | self.payload_type.code();

        let mut header = [0u8; FIXED_HEADER_LEN];
        header[0] = first_byte;
        header[1] = second_byte;
        header[2..4].copy_from_slice(&self.sequence_number.to_be_bytes());
        header[4..8].copy_from_slice(&self.timestamp.to_be_bytes());
        header[8..12].copy_from_slice(&self.ssrc.to_be_bytes());
        header
    }

    /// Total size of [`encode`](Self::encode)'s output.
    pub fn encoded_len(&self) -> usize {
        FIXED_HEADER_LEN
            + 4 * self.csrc_list.len()
            + self.extension.as_ref().map_or(0, Extension::encoded_len)
            + self.payload.len()
    }

    /// Serialize the packet into a single contiguous buffer.
    ///
    /// ```
    /// use rtp::RtpPacket;
    ///
    /// let packet = RtpPacket::builder()
    ///     .sequence_number(0)
    ///     .ssrc(0)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(packet.encode(), [0x80, 0x60, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    /// ```
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.extend_from_slice(&self.fixed_header());
        for csrc in &self.csrc_list {
            buf.extend_from_slice(&csrc.to_be_bytes());
        }
        if let Some(extension) = &self.extension {
            extension.encode_into(&mut buf);
        }
        buf.extend_from_slice(&self.payload);

        tracing::trace!(
            len = buf.len(),
            sequence_number = self.sequence_number,
            csrcs = self.csrc_list.len(),
            extension = self.extension.is_some(),
            "encoded RTP packet"
        );
        buf
    }

    /// Parse a whole packet from `bytes`.
    ///
    /// Fails with a range error for a version other than 2, and with a
    /// length error when the buffer ends inside the fixed header, the CSRC
    /// block or the extension, or when the extension's length field is
    /// inconsistent. Reserved and unassigned payload types are accepted.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        ensure_len(bytes, FIXED_HEADER_LEN)?;

        let version = bytes[0] >> 6;
        if version != RTP_VERSION {
            tracing::debug!(version, "rejecting RTP packet with unsupported version");
            return Err(RtpError::Range {
                field: "version",
                value: version as u64,
            });
        }

        let padding = bytes[0] & 0x20 != 0;
        let has_extension = bytes[0] & 0x10 != 0;
        let csrc_count = (bytes[0] & 0x0f) as usize;
        let marker = bytes[1] & 0x80 != 0;
        let payload_type = PayloadType::from_header_byte(bytes[1]);

        let extension_start = FIXED_HEADER_LEN + 4 * csrc_count;
        ensure_len(bytes, extension_start)?;

        let csrcs: Vec<u32> = bytes[FIXED_HEADER_LEN..extension_start]
            .chunks_exact(4)
            .map(|chunk| read_u32(chunk, 0))
            .collect();
        let csrc_list = CsrcList::try_from(csrcs)?;

        let mut payload_start = extension_start;
        let extension = if has_extension {
            ensure_len(bytes, extension_start + Extension::PREAMBLE_LEN)?;
            let words = u16::from_be_bytes([bytes[extension_start + 2], bytes[extension_start + 3]]);
            payload_start += (words as usize + 1) * 4;
            ensure_len(bytes, payload_start)?;
            Some(Extension::decode(&bytes[extension_start..payload_start])?)
        } else {
            None
        };

        let packet = Self {
            version,
            padding,
            marker,
            payload_type,
            sequence_number: u16::from_be_bytes([bytes[2], bytes[3]]),
            timestamp: read_u32(bytes, 4),
            ssrc: read_u32(bytes, 8),
            extension,
            csrc_list,
            payload: bytes[payload_start..].to_vec(),
        };

        tracing::trace!(
            len = bytes.len(),
            sequence_number = packet.sequence_number,
            payload_type = %packet.payload_type,
            csrcs = csrc_count,
            extension = has_extension,
            "decoded RTP packet"
        );
        Ok(packet)
    }
}

impl Default for RtpPacket {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<&[u8]> for RtpPacket {
    type Error = RtpError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::decode(bytes)
    }
}

impl From<&RtpPacket> for Vec<u8> {
    fn from(packet: &RtpPacket) -> Vec<u8> {
        packet.encode()
    }
}

/// Keyword-style construction of an [`RtpPacket`].
///
/// Every field starts at the packet default. Sequence number and SSRC are
/// drawn randomly at [`build`](Self::build) time unless set. Validation
/// (version, CSRC count) happens once, in `build`.
///
/// ```
/// use rtp::{PayloadType, RtpPacket};
///
/// let packet = RtpPacket::builder()
///     .payload_type(PayloadType::PCMU)
///     .marker(true)
///     .timestamp(160)
///     .csrcs([1, 2])
///     .payload(vec![0xff; 160])
///     .build()
///     .unwrap();
///
/// assert_eq!(packet.csrc_list().len(), 2);
/// assert!(RtpPacket::builder().csrcs(0..16).build().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PacketBuilder {
    version: u8,
    padding: bool,
    marker: bool,
    payload_type: PayloadType,
    sequence_number: Option<u16>,
    timestamp: u32,
    ssrc: Option<u32>,
    extension: Option<Extension>,
    csrcs: Vec<u32>,
    payload: Vec<u8>,
}

impl Default for PacketBuilder {
    fn default() -> Self {
        Self {
            version: RTP_VERSION,
            padding: false,
            marker: false,
            payload_type: PayloadType::default(),
            sequence_number: None,
            timestamp: 0,
            ssrc: None,
            extension: None,
            csrcs: Vec::new(),
            payload: Vec::new(),
        }
    }
}

impl PacketBuilder {
    pub fn version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    pub fn padding(mut self, padding: bool) -> Self {
        self.padding = padding;
        self
    }

    pub fn marker(mut self, marker: bool) -> Self {
        self.marker = marker;
        self
    }

    pub fn payload_type(mut self, payload_type: PayloadType) -> Self {
        self.payload_type = payload_type;
        self
    }

    pub fn sequence_number(mut self, sequence_number: u16) -> Self {
        self.sequence_number = Some(sequence_number);
        self
    }

    pub fn timestamp(mut self, timestamp: u32) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn ssrc(mut self, ssrc: u32) -> Self {
        self.ssrc = Some(ssrc);
        self
    }

    pub fn extension(mut self, extension: Extension) -> Self {
        self.extension = Some(extension);
        self
    }

    pub fn csrcs<I>(mut self, csrcs: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        self.csrcs = csrcs.into_iter().collect();
        self
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    /// Validate the collected fields and produce the packet.
    pub fn build(self) -> Result<RtpPacket> {
        let csrc_list = CsrcList::try_from(self.csrcs)?;

        let mut packet = RtpPacket::with_identifiers(
            self.sequence_number.unwrap_or_else(random_sequence_number),
            self.ssrc.unwrap_or_else(random_ssrc),
        );
        packet.set_version(self.version)?;
        packet.padding = self.padding;
        packet.marker = self.marker;
        packet.payload_type = self.payload_type;
        packet.timestamp = self.timestamp;
        packet.extension = self.extension;
        packet.csrc_list = csrc_list;
        packet.payload = self.payload;
        Ok(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zeroed() -> RtpPacket {
        RtpPacket::builder()
            .sequence_number(0)
            .ssrc(0)
            .build()
            .unwrap()
    }

    #[test]
    fn defaults() {
        let packet = RtpPacket::new();
        assert_eq!(packet.version(), 2);
        assert!(!packet.padding());
        assert!(!packet.marker());
        assert_eq!(packet.payload_type(), PayloadType::DYNAMIC_96);
        assert_eq!(packet.timestamp(), 0);
        assert!(packet.extension().is_none());
        assert!(packet.csrc_list().is_empty());
        assert!(packet.payload().is_empty());
    }

    #[test]
    fn version_is_2() {
        let mut packet = zeroed();
        assert_eq!(packet.encode()[0] >> 6, 2);

        for version in [0u8, 1, 3, 255] {
            assert_eq!(
                packet.set_version(version),
                Err(RtpError::Range {
                    field: "version",
                    value: version as u64
                })
            );
        }
        assert_eq!(packet.version(), 2);
        packet.set_version(2).unwrap();
    }

    #[test]
    fn builder_rejects_version() {
        assert!(matches!(
            RtpPacket::builder().version(1).build(),
            Err(RtpError::Range { field: "version", .. })
        ));
    }

    #[test]
    fn builder_rejects_too_many_csrcs() {
        assert_eq!(
            RtpPacket::builder().csrcs(0..16).build(),
            Err(RtpError::length(LengthErrorKind::TooManyCsrcs { len: 16 }))
        );
    }

    #[test]
    fn fixed_header_default() {
        assert_eq!(zeroed().fixed_header(), [0x80, 0x60, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn padding_bit() {
        let mut packet = zeroed();
        packet.set_padding(true);
        assert_eq!(packet.encode()[0], 0xa0);
    }

    #[test]
    fn marker_bit() {
        let mut packet = zeroed();
        assert_eq!(packet.encode()[1] & 0x80, 0);
        packet.set_marker(true);
        assert_eq!(packet.encode()[1], 0xe0);
    }

    #[test]
    fn payload_type_bits() {
        let mut packet = zeroed();
        packet.set_payload_type(PayloadType::PCMA);
        assert_eq!(packet.encode()[1] & 0x7f, 8);
    }

    #[test]
    fn field_offsets() {
        let packet = RtpPacket::builder()
            .sequence_number(0x1234)
            .timestamp(0xdeadbeef)
            .ssrc(0xaabbccdd)
            .build()
            .unwrap();
        let buf = packet.encode();
        assert_eq!(&buf[2..4], &[0x12, 0x34]);
        assert_eq!(&buf[4..8], &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(&buf[8..12], &[0xaa, 0xbb, 0xcc, 0xdd]);
    }

    #[test]
    fn csrc_count_and_entries() {
        let mut packet = zeroed();
        packet.csrc_list_mut().extend([0x01020304, 0xffffffff]).unwrap();
        let buf = packet.encode();
        assert_eq!(buf[0] & 0x0f, 2);
        assert_eq!(&buf[12..20], &[1, 2, 3, 4, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(buf.len(), packet.encoded_len());
    }

    #[test]
    fn extension_layout() {
        let mut packet = zeroed();
        packet.set_extension(Some(Extension::new([0xbe, 0xde], vec![1, 2, 3, 4]).unwrap()));
        packet.set_payload(vec![0xaa]);
        let buf = packet.encode();
        assert_eq!(buf[0], 0x90);
        assert_eq!(&buf[12..20], &[0xbe, 0xde, 0, 1, 1, 2, 3, 4]);
        assert_eq!(&buf[20..], &[0xaa]);
    }

    #[test]
    fn decode_default() {
        let packet = RtpPacket::decode(&[0x80, 0x60, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(packet, zeroed());
    }

    #[test]
    fn decode_bad_version() {
        assert_eq!(
            RtpPacket::decode(&[0x40, 0x60, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
            Err(RtpError::Range {
                field: "version",
                value: 1
            })
        );
    }

    #[test]
    fn decode_truncated_header() {
        assert_eq!(
            RtpPacket::decode(&[0x80, 0x60, 0, 0]),
            Err(RtpError::length(LengthErrorKind::Truncated {
                needed: 12,
                available: 4
            }))
        );
    }

    #[test]
    fn decode_truncated_csrcs() {
        let mut buf = zeroed().encode();
        buf[0] |= 0x02;
        buf.extend_from_slice(&[0, 0, 0, 1]);
        assert_eq!(
            RtpPacket::decode(&buf),
            Err(RtpError::length(LengthErrorKind::Truncated {
                needed: 20,
                available: 16
            }))
        );
    }

    #[test]
    fn decode_truncated_extension() {
        let mut buf = zeroed().encode();
        buf[0] |= 0x10;
        buf.extend_from_slice(&[0xbe, 0xde, 0x00, 0x02, 1, 2, 3, 4]);
        assert_eq!(
            RtpPacket::decode(&buf),
            Err(RtpError::length(LengthErrorKind::Truncated {
                needed: 24,
                available: 20
            }))
        );

        let mut buf = zeroed().encode();
        buf[0] |= 0x10;
        buf.extend_from_slice(&[0xbe]);
        assert!(matches!(
            RtpPacket::decode(&buf),
            Err(RtpError::Length {
                kind: LengthErrorKind::Truncated { .. }
            })
        ));
    }

    #[test]
    fn decode_reserved_payload_type() {
        let mut buf = zeroed().encode();
        buf[1] = 72;
        let packet = RtpPacket::decode(&buf).unwrap();
        assert!(packet.payload_type().is_reserved());
    }

    #[test]
    fn random_identifiers_vary() {
        let packets: Vec<RtpPacket> = (0..16).map(|_| RtpPacket::new()).collect();
        let first = &packets[0];
        assert!(
            packets
                .iter()
                .any(|p| p.ssrc() != first.ssrc() || p.sequence_number() != first.sequence_number())
        );
    }

    #[test]
    fn builder_random_identifiers_only_when_unset() {
        let packet = RtpPacket::builder().ssrc(7).build().unwrap();
        assert_eq!(packet.ssrc(), 7);
        let packet = RtpPacket::builder().sequence_number(9).build().unwrap();
        assert_eq!(packet.sequence_number(), 9);
    }
}
