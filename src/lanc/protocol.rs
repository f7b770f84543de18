//! # LANC Protocol Constants and Types
//!
//! Core timing and framing definitions for the LANC bus.
//!
//! ```text
//! __        ____  ____  ____  ____  ____  ____  ____  ____  _______
//!   \      / D0 \/ D1 \/ D2 \/ D3 \/ D4 \/ D5 \/ D6 \/ D7 \/
//!    \____/\____/\____/\____/\____/\____/\____/\____/\____/
//!   T  S  T  S  T
//! ```
//!
//! `T` is the bit-slot tick (start of each bit cell), `S` is the sampler clock,
//! half a bit later, in the middle of the cell.
//!
//! - 1 bit   =    104 us (9615 bps, 0.16% faster than the nominal 9600)
//! - 1 byte  =  1.248 ms = 12 bit slots (1 start, 8 data, 3 stop)
//! - 1 frame = 19.968 ms = 16 byte slots (2 received here, 14 left alone)

/// Protocol bit period in microseconds
pub const BIT_PERIOD_US: u32 = 104;

/// Offset between the bit-slot tick and the sampler clock, in microseconds
pub const HALF_BIT_PERIOD_US: u32 = BIT_PERIOD_US / 2;

/// Nominal LANC bit rate
pub const NOMINAL_BAUD_RATE: u32 = 9600;

/// Bit slots per byte slot (1 start + 8 data + 3 stop)
pub const BIT_SLOTS_PER_BYTE: u8 = 12;

/// Data bits captured per byte
pub const DATA_BITS: u8 = 8;

/// Byte slots per frame
pub const BYTE_SLOTS_PER_FRAME: u8 = 16;

/// Bit-slot ticks per frame (16 × 12)
pub const TICKS_PER_FRAME: u32 = BIT_SLOTS_PER_BYTE as u32 * BYTE_SLOTS_PER_FRAME as u32;

/// Byte slot duration in microseconds
pub const BYTE_SLOT_PERIOD_US: u32 = BIT_PERIOD_US * BIT_SLOTS_PER_BYTE as u32;

/// Frame duration in microseconds
pub const FRAME_PERIOD_US: u32 = BYTE_SLOT_PERIOD_US * BYTE_SLOTS_PER_FRAME as u32;

/// Byte slots whose contents this receiver captures (slots 0 and 1)
pub const RECEIVE_SLOTS: u8 = 2;

/// Byte slots with this bit set belong to the trailing idle region of the frame
pub const IDLE_REGION_MASK: u8 = 0x08;

/// First byte of a "move" command
pub const MOVE_COMMAND: u8 = 0x28;

/// Direction bit in the second command byte (set = reverse)
pub const DIRECTION_BIT: u8 = 0x10;

/// Position within the LANC frame: `(byte_slot, bit_slot)`
///
/// `bit_slot` is always in `0..12` and `byte_slot` in `0..16`. Only the
/// bit-slot tick handler moves the cursor.
///
/// # Examples
///
/// ```
/// use lanc_zoom::lanc::protocol::FrameCursor;
///
/// let mut cursor = FrameCursor::default();
/// assert_eq!(cursor.advance(), FrameCursor::new(0, 0));
/// assert_eq!(cursor, FrameCursor::new(0, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameCursor {
    /// Byte slot within the frame (0-15)
    pub byte_slot: u8,

    /// Bit slot within the byte slot (0-11)
    pub bit_slot: u8,
}

impl FrameCursor {
    /// Create a cursor at an explicit position
    ///
    /// Out-of-range values are wrapped into the frame.
    pub const fn new(byte_slot: u8, bit_slot: u8) -> Self {
        Self {
            byte_slot: byte_slot % BYTE_SLOTS_PER_FRAME,
            bit_slot: bit_slot % BIT_SLOTS_PER_BYTE,
        }
    }

    /// Advance by one bit slot, returning the position that was current
    /// before the advance
    ///
    /// The bit slot wraps to 0 at 12, at which point the byte slot moves
    /// forward by one, modulo 16.
    pub fn advance(&mut self) -> FrameCursor {
        let current = *self;

        self.bit_slot += 1;
        if self.bit_slot >= BIT_SLOTS_PER_BYTE {
            self.bit_slot = 0;
            self.byte_slot = (self.byte_slot + 1) % BYTE_SLOTS_PER_FRAME;
        }

        current
    }

    /// True for byte slots in the trailing half of the frame
    pub const fn in_idle_region(&self) -> bool {
        self.byte_slot & IDLE_REGION_MASK != 0
    }

    /// True for the byte slots this receiver captures
    pub const fn is_receive_slot(&self) -> bool {
        self.byte_slot < RECEIVE_SLOTS
    }

    /// Number of ticks since the start of the frame
    pub const fn tick_index(&self) -> u32 {
        self.byte_slot as u32 * BIT_SLOTS_PER_BYTE as u32 + self.bit_slot as u32
    }
}
