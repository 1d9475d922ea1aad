use crate::control::ControlByte;
use crate::conversion::voltage_to_code;
use crate::types::*;
use crate::{Pcf8591, CHANNEL_COUNT};

use embedded_hal_async::i2c;

/// Implementation of all commands given a generic I2CInterface.
///
/// # Errors
///
/// Any errors encountered within the I2C device will be wrapped in [`Error::BusTransferFailed`],
/// except for the presence probe in [`Pcf8591::init_async`] which reports
/// [`Error::DeviceNotReady`].
impl<I, E> Pcf8591<I>
where
    I: i2c::I2c<Error = E>,
{
    async fn send_command_async(&mut self, control: ControlByte) -> Result<(), Error<E>> {
        log::trace!("pcf8591@{:#04x}: command {:#010b}", self.address, control.bits());
        self.i2c.write(self.address, &[control.bits()]).await?;
        self.control = control;
        Ok(())
    }

    async fn send_command_with_data_async(
        &mut self,
        control: ControlByte,
        data: u8,
    ) -> Result<(), Error<E>> {
        log::trace!(
            "pcf8591@{:#04x}: command {:#010b} data {:#04x}",
            self.address,
            control.bits(),
            data
        );
        self.i2c.write(self.address, &[control.bits(), data]).await?;
        self.control = control;
        self.dac_value = data;
        Ok(())
    }

    async fn fetch_async<const N: usize>(
        &mut self,
        control: ControlByte,
    ) -> Result<[u8; N], Error<E>> {
        self.send_command_async(control).await?;
        let mut bytes = [0; CHANNEL_COUNT + 1];
        self.i2c.read(self.address, &mut bytes[..N + 1]).await?;
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
    pub async fn init_async(
        &mut self,
        enable_dac: bool,
        input_mode: InputMode,
        reference_voltage: f32,
    ) -> Result<(), Error<E>> {
        self.reference_voltage = reference_voltage;
        if let Err(e) = self.i2c.write(self.address, &[]).await {
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
        self.send_command_async(control).await
    }

    /// Turns the analog output on or off without changing the DAC code.
    pub async fn set_dac_enabled_async(&mut self, enabled: bool) -> Result<(), Error<E>> {
        self.send_command_async(self.control.with_dac(enabled)).await
    }

    /// Enables the analog output and sets it to `code`.
    pub async fn write_raw_async(&mut self, code: u8) -> Result<(), Error<E>> {
        self.send_command_with_data_async(self.control.with_dac(true), code)
            .await
    }

    /// Enables the analog output and sets it to the code closest to `voltage`, clamped to between
    /// 0 V and the reference voltage.
    pub async fn write_voltage_async(&mut self, voltage: f32) -> Result<(), Error<E>> {
        self.write_raw_async(voltage_to_code(voltage, self.reference_voltage))
            .await
    }

    /// Reads the code of a single channel (0 to 3).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChannel`] without touching the bus if `channel` is greater than 3.
    pub async fn read_channel_raw_async(&mut self, channel: u8) -> Result<u8, Error<E>> {
        let channel = Self::parse_channel(channel)?;
        let [code] = self
            .fetch_async::<1>(self.control.with_channel(channel))
            .await?;
        self.store_reading(channel, code);
        Ok(code)
    }

    /// Reads the codes of all four channels, in channel order.
    pub async fn read_all_raw_async(&mut self) -> Result<[u8; CHANNEL_COUNT], Error<E>> {
        let codes = self
            .fetch_async::<CHANNEL_COUNT>(self.sweep_control())
            .await?;
        self.store_sweep(codes);
        Ok(codes)
    }

    /// Reads a single channel (0 to 3) and converts it to a voltage.
    pub async fn read_channel_voltage_async(&mut self, channel: u8) -> Result<f32, Error<E>> {
        let channel = Self::parse_channel(channel)?;
        let [code] = self
            .fetch_async::<1>(self.control.with_channel(channel))
            .await?;
        Ok(self.store_reading(channel, code))
    }

    /// Reads all four channels and converts them to voltages, in channel order.
    pub async fn read_all_voltage_async(&mut self) -> Result<[f32; CHANNEL_COUNT], Error<E>> {
        let codes = self
            .fetch_async::<CHANNEL_COUNT>(self.sweep_control())
            .await?;
        Ok(self.store_sweep(codes))
    }
}

#[cfg(test)]
mod tests {
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    use crate::*;

    const ADDR: u8 = DEFAULT_ADDRESS;

    #[tokio::test]
    async fn init_write_read_scenario() {
        let i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![]),
            I2cTransaction::write(ADDR, vec![0x40]),
            I2cTransaction::write(ADDR, vec![0x40, 128]),
            I2cTransaction::write(ADDR, vec![0x42]),
            I2cTransaction::read(ADDR, vec![0x00, 0xff]),
        ]);
        let mut pcf = Pcf8591::new(i2c);
        assert_eq!(
            pcf.init_async(true, InputMode::FourSingleEnded, 3.3).await,
            Ok(())
        );
        assert_eq!(pcf.write_voltage_async(1.65).await, Ok(()));
        assert_eq!(pcf.read_channel_voltage_async(2).await, Ok(3.3));
        assert_eq!(pcf.last_raw()[2], 255);
        pcf.release().done();
    }

    #[tokio::test]
    async fn init_device_not_ready() {
        let i2c = I2cMock::new(&[I2cTransaction::write(ADDR, vec![]).with_error(ErrorKind::Other)]);
        let mut pcf = Pcf8591::new(i2c);
        assert_eq!(
            pcf.init_async(false, InputMode::Mixed, 2.5).await,
            Err(Error::DeviceNotReady(ErrorKind::Other))
        );
        assert_eq!(pcf.reference_voltage(), 2.5);
        pcf.release().done();
    }

    #[tokio::test]
    async fn read_all_raw_discards_stale_byte() {
        let i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![0b00000000]),
            I2cTransaction::read(ADDR, vec![0xff, 0x10, 0x20, 0x30, 0x40]),
        ]);
        let mut pcf = Pcf8591::new(i2c);
        pcf.set_auto_increment(true);
        assert_eq!(pcf.read_all_raw_async().await, Ok([0x10, 0x20, 0x30, 0x40]));
        assert_eq!(pcf.last_raw(), [0x10, 0x20, 0x30, 0x40]);
        pcf.release().done();
    }

    #[tokio::test]
    async fn invalid_channel() {
        let i2c = I2cMock::new(&[]);
        let mut pcf = Pcf8591::new(i2c);
        assert_eq!(
            pcf.read_channel_raw_async(4).await,
            Err(Error::InvalidChannel(4))
        );
        assert_eq!(
            pcf.read_channel_voltage_async(9).await,
            Err(Error::InvalidChannel(9))
        );
        pcf.release().done();
    }

    #[tokio::test]
    async fn read_error_keeps_cache() {
        let i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![0b00000011]),
            I2cTransaction::read(ADDR, vec![0x00, 0x7f]).with_error(ErrorKind::Other),
        ]);
        let mut pcf = Pcf8591::new(i2c);
        assert_eq!(
            pcf.read_channel_raw_async(3).await,
            Err(Error::BusTransferFailed(ErrorKind::Other))
        );
        assert_eq!(pcf.last_raw(), [0; 4]);
        assert_eq!(pcf.last_converted(), [0.0; 4]);
        pcf.release().done();
    }

    #[tokio::test]
    async fn write_raw_and_disable() {
        let i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![0b01000000, 0x33]),
            I2cTransaction::write(ADDR, vec![0b00000000]),
        ]);
        let mut pcf = Pcf8591::new(i2c);
        assert_eq!(pcf.write_raw_async(0x33).await, Ok(()));
        assert_eq!(pcf.set_dac_enabled_async(false).await, Ok(()));
        assert_eq!(pcf.dac_value(), 0x33);
        assert!(!pcf.control().dac_enabled());
        pcf.release().done();
    }
}
