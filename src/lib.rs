//! RTP packet encoding and decoding (RFC 3550).
//!
//! This crate translates between RTP packets on the wire and a validated
//! in-memory [`RtpPacket`]. It does no I/O: one datagram in, one packet
//! out, and back again.
//!
//! ## Components
//!
//! | Type | Module | RFC | Purpose |
//! |------|--------|-----|---------|
//! | [`PayloadType`] | [`payload_type`] | [RFC 3551 §6](https://tools.ietf.org/html/rfc3551#section-6) | 7-bit payload type and its category |
//! | [`CsrcList`] | [`csrc`] | [RFC 3550 §5.1](https://tools.ietf.org/html/rfc3550#section-5.1) | Up to 15 contributing sources |
//! | [`Extension`] | [`extension`] | [RFC 3550 §5.3.1](https://tools.ietf.org/html/rfc3550#section-5.3.1) | Profile-defined header extension |
//! | [`RtpPacket`] | [`packet`] | [RFC 3550 §5.1](https://tools.ietf.org/html/rfc3550#section-5.1) | Fixed header, CSRCs, extension, payload |
//!
//! Every mutation is validated where it happens and reports an
//! [`RtpError`]; a rejected call leaves the value unchanged.
//!
//! ```
//! use rtp::{Extension, PayloadType, RtpPacket};
//!
//! let packet = RtpPacket::builder()
//!     .payload_type(PayloadType::PCMU)
//!     .sequence_number(1)
//!     .ssrc(0x1234_5678)
//!     .extension(Extension::new([0xbe, 0xde], vec![0; 4]).unwrap())
//!     .payload(b"audio".to_vec())
//!     .build()
//!     .unwrap();
//!
//! let bytes = packet.encode();
//! assert_eq!(RtpPacket::decode(&bytes).unwrap(), packet);
//! ```

pub mod csrc;
pub mod error;
pub mod extension;
pub mod packet;
pub mod payload_type;

pub use csrc::CsrcList;
pub use error::{LengthErrorKind, Result, RtpError};
pub use extension::Extension;
pub use packet::{FIXED_HEADER_LEN, PacketBuilder, RTP_VERSION, RtpPacket};
pub use payload_type::PayloadType;
