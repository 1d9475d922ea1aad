//! # Rust driver for PCF8591 8-bit 4-channel ADC / 1-channel DAC
//!
//! This is a platform agnostic rust driver for the PCF8591 using the [embedded-hal](https://github.com/rust-embedded/embedded-hal) traits.
//!
//! The chip has a single write-only control byte (see [`ControlByte`]) that selects the input
//! mode, the A/D channel, auto-increment and whether the analog output is on. The driver keeps a
//! copy of it and of the most recent readings of every channel.
//!
//! A/D conversions run continuously and each read returns the result of the conversion started by
//! the previous one, so the first byte of every read transaction is stale. The driver always
//! reads one extra byte and throws it away.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(target_os = "linux")] {
//! use linux_embedded_hal::I2cdev;
//! use pcf8591::{InputMode, Pcf8591};
//!
//! let i2c = I2cdev::new("/dev/i2c-1").unwrap();
//! let mut pcf = Pcf8591::new(i2c);
//! pcf.init(true, InputMode::FourSingleEnded, 3.3).unwrap();
//! pcf.write_voltage(1.2).unwrap();
//! let volts = pcf.read_channel_voltage(0).unwrap();
//! # }
//! ```
#![cfg_attr(not(test), no_std)]

#[cfg(feature = "async")]
mod async_impl;
mod control;
mod conversion;
mod types;

pub use crate::control::ControlByte;
pub use crate::conversion::{code_to_voltage, voltage_to_code, FULL_SCALE};
pub use crate::types::*;

#[cfg(feature = "sync")]
use embedded_hal::i2c;

/// Address of a PCF8591 with the A2, A1 and A0 pins tied low.
pub const DEFAULT_ADDRESS: u8 = 0x48;
/// Reference voltage assumed until [`Pcf8591::init`] or [`Pcf8591::set_reference_voltage`].
pub const DEFAULT_REFERENCE_VOLTAGE: f32 = 3.3;

const CHANNEL_COUNT: usize = 4;

/// PCF8591 8-bit A/D and D/A converter.
pub struct Pcf8591<I2C> {
    i2c: I2C,
    address: u8,
    reference_voltage: f32,
    control: ControlByte,
    dac_value: u8,
    last_raw: [u8; CHANNEL_COUNT],
    last_converted: [f32; CHANNEL_COUNT],
}

/// Bus independent state handling, shared by the blocking and async implementations.
impl<I2C> Pcf8591<I2C> {
    /// Creates a new [`Pcf8591`] at [`DEFAULT_ADDRESS`].
    ///
    /// Nothing is sent on the bus until [`Pcf8591::init`] or another command is issued.
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    /// Creates a new [`Pcf8591`] at a specific 7-bit address (0x48 to 0x4f depending on the
    /// address pins).
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Pcf8591 {
            i2c,
            address,
            reference_voltage: DEFAULT_REFERENCE_VOLTAGE,
            control: ControlByte::new(),
            dac_value: 0,
            last_raw: [0; CHANNEL_COUNT],
            last_converted: [0.0; CHANNEL_COUNT],
        }
    }

    /// Destroy this instance and return the inner I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Voltage that corresponds to code 255.
    pub fn reference_voltage(&self) -> f32 {
        self.reference_voltage
    }

    /// Changes the reference voltage used by later conversions. Cached readings are not
    /// recomputed.
    pub fn set_reference_voltage(&mut self, reference_voltage: f32) {
        self.reference_voltage = reference_voltage;
    }

    /// The control byte as last acknowledged by the device.
    pub fn control(&self) -> ControlByte {
        self.control
    }

    /// The DAC code as last acknowledged by the device.
    pub fn dac_value(&self) -> u8 {
        self.dac_value
    }

    /// Sets or clears the auto-increment flag.
    ///
    /// Only the local copy of the control byte changes. The flag is sent with the next command;
    /// note that [`Pcf8591::read_all_raw`] and [`Pcf8591::read_all_voltage`] always clear it.
    pub fn set_auto_increment(&mut self, enabled: bool) {
        self.control.set_auto_increment(enabled);
    }

    /// Most recent code read from each channel, 0 for channels never read.
    pub fn last_raw(&self) -> [u8; CHANNEL_COUNT] {
        self.last_raw
    }

    /// Most recent voltage read from each channel.
    pub fn last_converted(&self) -> [f32; CHANNEL_COUNT] {
        self.last_converted
    }

    pub fn last_raw_channel(&self, channel: Channel) -> u8 {
        self.last_raw[channel as usize]
    }

    pub fn last_voltage_channel(&self, channel: Channel) -> f32 {
        self.last_converted[channel as usize]
    }

    fn parse_channel<E>(channel: u8) -> Result<Channel, Error<E>> {
        Channel::try_from(channel).map_err(|_| Error::InvalidChannel(channel))
    }

    /// Control byte for [`Pcf8591::init`]: new input mode and analog output enable, channel and
    /// auto-increment as before.
    fn init_control(&self, enable_dac: bool, input_mode: InputMode) -> ControlByte {
        self.control.with_input_mode(input_mode).with_dac(enable_dac)
    }

    fn sweep_control(&self) -> ControlByte {
        let mut control = self.control;
        control.clear_auto_increment();
        control
    }

    fn store_reading(&mut self, channel: Channel, code: u8) -> f32 {
        let voltage = code_to_voltage(code, self.reference_voltage);
        self.last_raw[channel as usize] = code;
        self.last_converted[channel as usize] = voltage;
        voltage
    }

    fn store_sweep(&mut self, codes: [u8; CHANNEL_COUNT]) -> [f32; CHANNEL_COUNT] {
        let mut voltages = [0.0; CHANNEL_COUNT];
        for (channel, &code) in Channel::ALL.iter().zip(codes.iter()) {
            voltages[*channel as usize] = self.store_reading(*channel, code);
        }
        voltages
    }
}

/// Implementation of all commands given a generic I2CInterface.
///
/// # Errors
///
/// Any errors encountered within the I2C device will be wrapped in [`Error::BusTransferFailed`],
/// except for the presence probe in [`Pcf8591::init`] which reports [`Error::DeviceNotReady`].
/// Nothing is cached from a failed transfer: the control byte and DAC value only change once the
/// device has acknowledged them, and readings only once the whole read succeeded.
#[cfg(feature = "sync")]
impl<I2C, E> Pcf8591<I2C>
where
    I2C: i2c::I2c<Error = E>,
{
    /// Writes only the control byte.
    fn send_command(&mut self, control: ControlByte) -> Result<(), Error<E>> {
        log::trace!("pcf8591@{:#04x}: command {:#010b}", self.address, control.bits());
        self.i2c.write(self.address, &[control.bits()])?;
        self.control = control;
        Ok(())
    }

    /// Writes the control byte followed by the DAC code.
    fn send_command_with_data(&mut self, control: ControlByte, data: u8) -> Result<(), Error<E>> {
        log::trace!(
            "pcf8591@{:#04x}: command {:#010b} data {:#04x}",
            self.address,
            control.bits(),
            data
        );
        self.i2c.write(self.address, &[control.bits(), data])?;
        self.control = control;
        self.dac_value = data;
        Ok(())
    }

    /// Sends `control` and then reads `N` conversion results.
    ///
    /// `N + 1` bytes are read and the first one, left over from the previous conversion cycle, is
    /// dropped.
    fn fetch<const N: usize>(&mut self, control: ControlByte) -> Result<[u8; N], Error<E>> {
        self.send_command(control)?;
        let mut bytes = [0; CHANNEL_COUNT + 1];
        self.i2c.read(self.address, &mut bytes[..N + 1])?;
        log::trace!("pcf8591@{:#04x}: read {:02x?}", self.address, &bytes[..N + 1]);
        let mut codes = [0; N];
        codes.copy_from_slice(&bytes[1..N + 1]);
        Ok(codes)
    }

    /// Checks that the device acknowledges its address, then sets the input mode and analog output
    /// enable.
    ///
    /// The channel and auto-increment bits are kept. `reference_voltage` is stored even if this
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotReady`] if the device doesn't respond and
    /// [`Error::BusTransferFailed`] if writing the control byte fails.
    pub fn init(
        &mut self,
        enable_dac: bool,
        input_mode: InputMode,
        reference_voltage: f32,
    ) -> Result<(), Error<E>> {
        self.reference_voltage = reference_voltage;
        if let Err(e) = self.i2c.write(self.address, &[]) {
            log::warn!("pcf8591@{:#04x}: no response to probe", self.address);
            return Err(Error::DeviceNotReady(e));
        }
        let control = self.init_control(enable_dac, input_mode);
        log::debug!(
            "pcf8591@{:#04x}: init {:?}, dac {}, reference {} V",
            self.address,
            input_mode,
            enable_dac,
            reference_voltage
        );
        self.send_command(control)
    }

    /// Turns the analog output on or off without changing the DAC code.
    pub fn set_dac_enabled(&mut self, enabled: bool) -> Result<(), Error<E>> {
        self.send_command(self.control.with_dac(enabled))
    }

    /// Enables the analog output and sets it to `code`.
    pub fn write_raw(&mut self, code: u8) -> Result<(), Error<E>> {
        self.send_command_with_data(self.control.with_dac(true), code)
    }

    /// Enables the analog output and sets it to the code closest to `voltage`.
    ///
    /// The voltage is clamped to between 0 V and the reference voltage.
    pub fn write_voltage(&mut self, voltage: f32) -> Result<(), Error<E>> {
        self.write_raw(voltage_to_code(voltage, self.reference_voltage))
    }

    /// Reads the code of a single channel (0 to 3).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChannel`] without touching the bus if `channel` is greater than 3.
    pub fn read_channel_raw(&mut self, channel: u8) -> Result<u8, Error<E>> {
        let channel = Self::parse_channel(channel)?;
        let [code] = self.fetch::<1>(self.control.with_channel(channel))?;
        self.store_reading(channel, code);
        Ok(code)
    }

    /// Reads the codes of all four channels, in channel order.
    ///
    /// Auto-increment is cleared in the command sent for this read.
    pub fn read_all_raw(&mut self) -> Result<[u8; CHANNEL_COUNT], Error<E>> {
        let codes = self.fetch::<CHANNEL_COUNT>(self.sweep_control())?;
        self.store_sweep(codes);
        Ok(codes)
    }

    /// Reads a single channel (0 to 3) and converts it to a voltage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChannel`] without touching the bus if `channel` is greater than 3.
    pub fn read_channel_voltage(&mut self, channel: u8) -> Result<f32, Error<E>> {
        let channel = Self::parse_channel(channel)?;
        let [code] = self.fetch::<1>(self.control.with_channel(channel))?;
        Ok(self.store_reading(channel, code))
    }

    /// Reads all four channels and converts them to voltages, in channel order.
    pub fn read_all_voltage(&mut self) -> Result<[f32; CHANNEL_COUNT], Error<E>> {
        let codes = self.fetch::<CHANNEL_COUNT>(self.sweep_control())?;
        Ok(self.store_sweep(codes))
    }
}
