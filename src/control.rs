//! The PCF8591 control byte.
//!
//! The chip has a single write-only configuration register that is sent as the first byte of
//! every write transaction:
//!
//! ```text
//! || 0 | DAC | MODE MODE | 0 | AI | CH CH ||
//! ```
//!
//! - `CH`: A/D channel number.
//! - `AI`: auto-increment flag, the channel advances after each conversion.
//! - `MODE`: analog input programming, see [`InputMode`].
//! - `DAC`: analog output enable.
//!
//! Since the register can't be read back, the driver keeps a [`ControlByte`] mirror of what was
//! last transmitted.

use crate::types::*;

const CHANNEL_MASK: u8 = 0b0000_0011;
const AUTO_INCREMENT_FLAG: u8 = 0b0000_0100;
const INPUT_MODE_SHIFT: u8 = 4;
const INPUT_MODE_MASK: u8 = 0b0011_0000;
const DAC_ENABLE_FLAG: u8 = 0b0100_0000;

/// Value of the control byte, with accessors for each field.
///
/// Every setter is a read-modify-write of its own field only.
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlByte(u8);

impl ControlByte {
    /// A control byte with every field cleared: channel 0, no auto-increment,
    /// [`InputMode::FourSingleEnded`] and the analog output disabled.
    pub const fn new() -> ControlByte {
        ControlByte(0)
    }

    /// Wraps a raw control byte. Unused bits are kept as given.
    pub const fn from_bits(bits: u8) -> ControlByte {
        ControlByte(bits)
    }

    /// The byte as it goes on the wire.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Selected A/D channel.
    pub fn channel(self) -> Channel {
        match self.0 & CHANNEL_MASK {
            0 => Channel::Ain0,
            1 => Channel::Ain1,
            2 => Channel::Ain2,
            _ => Channel::Ain3,
        }
    }

    /// Sets the channel field from a channel number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChannel`] if `channel` is greater than 3, leaving the byte as it
    /// was.
    pub fn set_channel<E>(&mut self, channel: u8) -> Result<(), Error<E>> {
        let channel = Channel::try_from(channel).map_err(|_| Error::InvalidChannel(channel))?;
        *self = self.with_channel(channel);
        Ok(())
    }

    /// Convenience builder method to set the channel.
    pub fn with_channel(self, channel: Channel) -> ControlByte {
        ControlByte((self.0 & !CHANNEL_MASK) | u8::from(channel))
    }

    /// Whether auto-increment is set.
    pub fn auto_increment(self) -> bool {
        self.0 & AUTO_INCREMENT_FLAG != 0
    }

    pub fn set_auto_increment(&mut self, enabled: bool) {
        if enabled {
            self.0 |= AUTO_INCREMENT_FLAG;
        } else {
            self.0 &= !AUTO_INCREMENT_FLAG;
        }
    }

    pub fn clear_auto_increment(&mut self) {
        self.set_auto_increment(false);
    }

    /// Selected analog input programming.
    pub fn input_mode(self) -> InputMode {
        match (self.0 & INPUT_MODE_MASK) >> INPUT_MODE_SHIFT {
            0 => InputMode::FourSingleEnded,
            1 => InputMode::ThreeDifferential,
            2 => InputMode::Mixed,
            _ => InputMode::TwoDifferential,
        }
    }

    /// Sets the input mode field from a raw mode number. Only the low two bits of `mode` are used.
    pub fn set_input_mode(&mut self, mode: u8) {
        self.0 = (self.0 & !INPUT_MODE_MASK) | ((mode << INPUT_MODE_SHIFT) & INPUT_MODE_MASK);
    }

    /// Convenience builder method to set the input mode.
    pub fn with_input_mode(mut self, mode: InputMode) -> ControlByte {
        self.set_input_mode(mode.into());
        self
    }

    /// Whether the analog output is enabled.
    pub fn dac_enabled(self) -> bool {
        self.0 & DAC_ENABLE_FLAG != 0
    }

    pub fn enable_dac(&mut self, enabled: bool) {
        if enabled {
            self.0 |= DAC_ENABLE_FLAG;
        } else {
            self.0 &= !DAC_ENABLE_FLAG;
        }
    }

    /// Convenience builder method to enable or disable the analog output.
    pub fn with_dac(mut self, enabled: bool) -> ControlByte {
        self.enable_dac(enabled);
        self
    }
}

impl From<ControlByte> for u8 {
    fn from(control: ControlByte) -> u8 {
        control.bits()
    }
}
