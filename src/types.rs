use num_enum::{IntoPrimitive, TryFromPrimitive};

// Error type.

/// Error type for the crate, which can represent either an error from this driver or an inner error
/// that comes from the I2C type.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<InnerError> {
    /// The device did not acknowledge its address while probing during
    /// [`Pcf8591::init`](crate::Pcf8591::init).
    DeviceNotReady(InnerError),
    /// A transmit or receive on the bus failed.
    ///
    /// The transaction is abandoned at the first failure and no readings are cached.
    BusTransferFailed(InnerError),
    /// A channel number outside `0..=3` was requested.
    ///
    /// This is detected before anything is sent on the bus.
    InvalidChannel(u8),
}

impl<InnerError> From<InnerError> for Error<InnerError> {
    fn from(inner: InnerError) -> Self {
        Error::BusTransferFailed(inner)
    }
}

// Enums for configuration.

/// Analog input channel selection.
#[derive(IntoPrimitive, TryFromPrimitive, Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Channel {
    Ain0 = 0,
    Ain1 = 1,
    Ain2 = 2,
    Ain3 = 3,
}

impl Channel {
    /// All channels in the order a full sweep returns them.
    pub const ALL: [Channel; 4] = [Channel::Ain0, Channel::Ain1, Channel::Ain2, Channel::Ain3];
}

/// Mapping of the four analog input pins onto ADC channels.
///
/// Channel numbers used for reads refer to the channels of the active mode, e.g. in
/// [`InputMode::TwoDifferential`] channel 1 is `AIN2 - AIN3`.
#[derive(IntoPrimitive, TryFromPrimitive, Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum InputMode {
    /// Four single-ended inputs, `AIN0` to `AIN3`.
    FourSingleEnded = 0,
    /// Three differential inputs, each of `AIN0`, `AIN1` and `AIN2` measured against `AIN3`.
    ThreeDifferential = 1,
    /// `AIN0` and `AIN1` single-ended, `AIN2 - AIN3` differential.
    Mixed = 2,
    /// Two differential inputs, `AIN0 - AIN1` and `AIN2 - AIN3`.
    TwoDifferential = 3,
}


impl Default for InputMode {
    fn default() -> Self {
        InputMode::FourSingleEnded
    }
}
