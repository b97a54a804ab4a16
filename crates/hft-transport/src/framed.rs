//! Wire format for messages carried over [`crate::VLRing`].
//!
//! Every frame begins with an 8-byte, 8-byte-aligned header:
//!
//! ```text
//! offset 0: u32 length  (total frame bytes including header, multiple of 8)
//! offset 4: u16 kind
//! offset 6: u16 count
//! offset 8: body of (length - 8) bytes
//! ```

use std::mem::size_of;

/// Size of [`FrameHeader`] on the wire. `VLRing` relies on this being 8.
pub const HEADER_LEN: usize = 8;

/// Reserved `kind` value marking a frame that exists only to consume the
/// tail of the ring so the next real frame can start at offset 0.
pub const KIND_PADDING: u16 = 0xFFFF;

/// Defined message kinds carried over the ring (the market-data shapes this
/// transport was built for; application code may define further kinds as
/// long as they avoid [`KIND_PADDING`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum MessageKind {
    Trade = 1,
    Depth = 2,
    BookTicker = 3,
    Snapshot = 4,
}

impl MessageKind {
    pub const fn from_u16(v: u16) -> Option<Self> {
        match v {
            1 => Some(Self::Trade),
            2 => Some(Self::Depth),
            3 => Some(Self::BookTicker),
            4 => Some(Self::Snapshot),
            _ => None,
        }
    }
}

/// The fixed 8-byte header preceding every frame's body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct FrameHeader {
    pub length: u32,
    pub kind: u16,
    pub count: u16,
}

const _: () = assert!(size_of::<FrameHeader>() == HEADER_LEN);

impl FrameHeader {
    #[inline]
    pub const fn padding(length: u32) -> Self {
        Self {
            length,
            kind: KIND_PADDING,
            count: 0,
        }
    }

    #[inline]
    pub const fn new(length: u32, kind: u16, count: u16) -> Self {
        Self { length, kind, count }
    }

    #[inline]
    pub const fn is_padding(&self) -> bool {
        self.kind == KIND_PADDING
    }

    /// Writes this header's bytes, little-endian, to the start of `dst`.
    ///
    /// # Panics
    /// Panics if `dst` is shorter than [`HEADER_LEN`].
    #[inline]
    pub fn write_to(&self, dst: &mut [u8]) {
        dst[0..4].copy_from_slice(&self.length.to_le_bytes());
        dst[4..6].copy_from_slice(&self.kind.to_le_bytes());
        dst[6..8].copy_from_slice(&self.count.to_le_bytes());
    }

    /// Reads a header from the start of `src`.
    ///
    /// # Panics
    /// Panics if `src` is shorter than [`HEADER_LEN`].
    #[inline]
    pub fn read_from(src: &[u8]) -> Self {
        let length = u32::from_le_bytes(src[0..4].try_into().unwrap());
        let kind = u16::from_le_bytes(src[4..6].try_into().unwrap());
        let count = u16::from_le_bytes(src[6..8].try_into().unwrap());
        Self { length, kind, count }
    }
}

/// Rounds `len` up to the next multiple of 8, as the framed wire format
/// requires for every `length` field.
#[inline]
pub const fn align_up_8(len: usize) -> usize {
    (len + 7) & !7
}
