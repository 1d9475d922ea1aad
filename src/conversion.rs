//! Linear conversion between 8-bit codes and voltages.
//!
//! Code 255 corresponds to the reference voltage and code 0 to ground, for both the ADC and the
//! DAC.

/// Largest code of the 8-bit converters.
pub const FULL_SCALE: u8 = u8::MAX;

/// Converts an ADC code to a voltage relative to `reference_voltage`.
pub fn code_to_voltage(code: u8, reference_voltage: f32) -> f32 {
    f32::from(code) / f32::from(FULL_SCALE) * reference_voltage
}

/// Converts a voltage to the nearest DAC code.
///
/// `voltage` is clamped to `0.0..=reference_voltage`, so anything above the reference yields
/// [`FULL_SCALE`]. A non-positive reference or a NaN voltage yields 0.
pub fn voltage_to_code(voltage: f32, reference_voltage: f32) -> u8 {
    // `!(x > 0.0)` also rejects NaN.
    if !(reference_voltage > 0.0) || voltage.is_nan() {
        return 0;
    }
    let voltage = voltage.clamp(0.0, reference_voltage);
    let scaled = voltage / reference_voltage * f32::from(FULL_SCALE);
    // Non-negative here, so truncating after adding a half rounds to nearest.
    (scaled + 0.5) as u8
}
