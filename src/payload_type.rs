use std::fmt;

use crate::error::{Result, RtpError};

/// RTP payload type code (RFC 3551 §6).
///
/// A 7-bit value carried in the low bits of header byte 1. Codes 0–34 are
/// statically assigned audio/video encodings, 96–127 are dynamic and the
/// rest are reserved or unassigned.
///
/// Classification is descriptive: every code in `0..=127` is a valid
/// `PayloadType`, including reserved and unassigned ones, so decoding a
/// packet never fails because of its payload type.
///
/// The categories overlap. MP2T (33) is audio, video and AV at once, and
/// 20–23 count as both audio and unassigned.
///
/// ```
/// use rtp::PayloadType;
///
/// let pt = PayloadType::new(33).unwrap();
/// assert!(pt.is_audio() && pt.is_video() && pt.is_av());
/// assert_eq!(pt, PayloadType::MP2T);
///
/// assert!(PayloadType::new(128).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PayloadType(u8);

impl PayloadType {
    /// Highest payload type code representable in the 7-bit field.
    pub const MAX: u8 = 127;

    pub const PCMU: Self = Self(0);
    pub const GSM: Self = Self(3);
    pub const G723: Self = Self(4);
    pub const DVI4_8000: Self = Self(5);
    pub const DVI4_16000: Self = Self(6);
    pub const LPC: Self = Self(7);
    pub const PCMA: Self = Self(8);
    pub const G722: Self = Self(9);
    /// L16, 44.1 kHz, two channels.
    pub const L16_STEREO: Self = Self(10);
    /// L16, 44.1 kHz, one channel.
    pub const L16_MONO: Self = Self(11);
    pub const QCELP: Self = Self(12);
    /// Comfort noise (RFC 3389).
    pub const CN: Self = Self(13);
    pub const MPA: Self = Self(14);
    pub const G728: Self = Self(15);
    pub const DVI4_11025: Self = Self(16);
    pub const DVI4_22050: Self = Self(17);
    pub const G729: Self = Self(18);
    pub const CELB: Self = Self(25);
    pub const JPEG: Self = Self(26);
    pub const NV: Self = Self(28);
    pub const H261: Self = Self(31);
    pub const MPV: Self = Self(32);
    /// MPEG-2 transport stream, the only combined audio/video type.
    pub const MP2T: Self = Self(33);
    pub const H263: Self = Self(34);
    /// First dynamic code, used as the packet default.
    pub const DYNAMIC_96: Self = Self(96);

    /// Create a payload type from its 7-bit code.
    ///
    /// Returns [`RtpError::Range`] if `code` is above 127.
    pub fn new(code: u8) -> Result<Self> {
        if code > Self::MAX {
            return Err(RtpError::Range {
                field: "payload type",
                value: code as u64,
            });
        }

        Ok(Self(code))
    }

    /// Masks a raw header byte down to its payload type bits.
    pub(crate) fn from_header_byte(byte: u8) -> Self {
        Self(byte & 0x7f)
    }

    /// The numeric code.
    pub fn code(self) -> u8 {
        self.0
    }

    /// Audio encoding. True for MP2T as well.
    pub fn is_audio(self) -> bool {
        self.0 <= 23 || self.0 == 33
    }

    /// Video encoding. True for MP2T as well.
    pub fn is_video(self) -> bool {
        (24..=34).contains(&self.0)
    }

    /// Combined audio/video encoding. Only MP2T.
    pub fn is_av(self) -> bool {
        self.0 == 33
    }

    pub fn is_dynamic(self) -> bool {
        self.0 >= 96
    }

    /// Gaps in the RFC 3551 static table.
    pub fn is_unassigned(self) -> bool {
        matches!(self.0, 20..=24 | 27 | 29 | 30 | 35..=71 | 77..=95)
    }

    /// Codes reserved by RFC 3551 (1, 2, 19) and the RTCP conflict range
    /// 72–76 (RFC 3550 §12.1).
    pub fn is_reserved(self) -> bool {
        matches!(self.0, 1 | 2 | 19 | 72..=76)
    }

    /// RFC 3551 encoding name.
    ///
    /// Codes without a static assignment report `"reserved"`,
    /// `"unassigned"` or `"dynamic"`.
    pub fn encoding_name(self) -> &'static str {
        match self.0 {
            0 => "PCMU",
            3 => "GSM",
            4 => "G723",
            5 | 6 | 16 | 17 => "DVI4",
            7 => "LPC",
            8 => "PCMA",
            9 => "G722",
            10 | 11 => "L16",
            12 => "QCELP",
            13 => "CN",
            14 => "MPA",
            15 => "G728",
            18 => "G729",
            25 => "CelB",
            26 => "JPEG",
            28 => "nv",
            31 => "H261",
            32 => "MPV",
            33 => "MP2T",
            34 => "H263",
            _ if self.is_dynamic() => "dynamic",
            _ if self.is_reserved() => "reserved",
            _ => "unassigned",
        }
    }
}

impl Default for PayloadType {
    fn default() -> Self {
        Self::DYNAMIC_96
    }
}

impl TryFrom<u8> for PayloadType {
    type Error = RtpError;

    fn try_from(code: u8) -> Result<Self> {
        Self::new(code)
    }
}

impl From<PayloadType> for u8 {
    fn from(pt: PayloadType) -> u8 {
        pt.0
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.encoding_name(), self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> impl Iterator<Item = PayloadType> {
        (0..=PayloadType::MAX).map(|code| PayloadType::new(code).unwrap())
    }

    #[test]
    fn construct_in_range() {
        for code in 0..=127u8 {
            assert_eq!(PayloadType::new(code).unwrap().code(), code);
        }
    }

    #[test]
    fn construct_out_of_range() {
        for code in 128..=255u8 {
            assert_eq!(
                PayloadType::new(code),
                Err(RtpError::Range {
                    field: "payload type",
                    value: code as u64
                })
            );
        }
    }

    #[test]
    fn audio() {
        let audio: Vec<u8> = all().filter(|pt| pt.is_audio()).map(u8::from).collect();
        let mut expected: Vec<u8> = (0..=23).collect();
        expected.push(33);
        assert_eq!(audio, expected);
    }

    #[test]
    fn video() {
        let video: Vec<u8> = all().filter(|pt| pt.is_video()).map(u8::from).collect();
        assert_eq!(video, (24..=34).collect::<Vec<u8>>());
    }

    #[test]
    fn av_only_mp2t() {
        let av: Vec<PayloadType> = all().filter(|pt| pt.is_av()).collect();
        assert_eq!(av, vec![PayloadType::MP2T]);
    }

    #[test]
    fn dynamic() {
        let dynamic: Vec<u8> = all().filter(|pt| pt.is_dynamic()).map(u8::from).collect();
        assert_eq!(dynamic, (96..=127).collect::<Vec<u8>>());
    }

    #[test]
    fn unassigned() {
        let unassigned: Vec<u8> = all()
            .filter(|pt| pt.is_unassigned())
            .map(u8::from)
            .collect();
        let mut expected: Vec<u8> = (20..=24).collect();
        expected.push(27);
        expected.extend([29, 30]);
        expected.extend(35..=71);
        expected.extend(77..=95);
        assert_eq!(unassigned, expected);
    }

    #[test]
    fn reserved() {
        let reserved: Vec<u8> = all().filter(|pt| pt.is_reserved()).map(u8::from).collect();
        assert_eq!(reserved, vec![1, 2, 19, 72, 73, 74, 75, 76]);
    }

    #[test]
    fn default_is_dynamic_96() {
        assert_eq!(PayloadType::default().code(), 96);
        assert!(PayloadType::default().is_dynamic());
    }

    #[test]
    fn header_byte_masks_marker() {
        assert_eq!(PayloadType::from_header_byte(0xe0), PayloadType::DYNAMIC_96);
        assert_eq!(PayloadType::from_header_byte(0x80), PayloadType::PCMU);
    }

    #[test]
    fn names() {
        assert_eq!(PayloadType::PCMA.encoding_name(), "PCMA");
        assert_eq!(PayloadType::DVI4_22050.encoding_name(), "DVI4");
        assert_eq!(PayloadType::new(2).unwrap().encoding_name(), "reserved");
        assert_eq!(PayloadType::new(74).unwrap().encoding_name(), "reserved");
        assert_eq!(PayloadType::new(50).unwrap().encoding_name(), "unassigned");
        assert_eq!(PayloadType::new(120).unwrap().encoding_name(), "dynamic");
        assert_eq!(PayloadType::H263.to_string(), "H263/34");
    }
}
