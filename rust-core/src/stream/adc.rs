//! Raw ADC code conversion for the sensor HAT
//!
//! The vibration sensor is read through a 32-bit ADS1263 on AIN0; codes
//! arrive unconverted and are scaled against the reference voltage here.

/// Reference voltage of the HAT as wired on the test rig
pub const DEFAULT_VREF: f64 = 1.6;

const NEGATIVE_FULL_SCALE: f64 = 0x8000_0000_u32 as f64;
const POSITIVE_FULL_SCALE: f64 = 0x7fff_ffff_u32 as f64;

/// Convert a raw 32-bit code to volts
///
/// Bit 31 set means a negative reading.
pub fn raw_to_voltage(raw: u32, vref: f64) -> f64 {
    if raw >> 31 == 1 {
        -(vref * 2.0 - raw as f64 * vref / NEGATIVE_FULL_SCALE)
    } else {
        raw as f64 * vref / POSITIVE_FULL_SCALE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_codes() {
        assert_eq!(raw_to_voltage(0, DEFAULT_VREF), 0.0);
        assert!((raw_to_voltage(0x7fff_ffff, DEFAULT_VREF) - 1.6).abs() < 1e-12);
        assert!((raw_to_voltage(0x4000_0000, DEFAULT_VREF) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_negative_codes() {
        assert!((raw_to_voltage(0x8000_0000, DEFAULT_VREF) + 1.6).abs() < 1e-12);
        assert!((raw_to_voltage(0xc000_0000, DEFAULT_VREF) + 0.8).abs() < 1e-12);

        let near_zero = raw_to_voltage(0xffff_ffff, DEFAULT_VREF);
        assert!(near_zero < 0.0 && near_zero > -1e-6);
    }

    #[test]
    fn test_scales_with_reference() {
        let a = raw_to_voltage(0x2000_0000, 1.6);
        let b = raw_to_voltage(0x2000_0000, 2.5);
        assert!((b / a - 2.5 / 1.6).abs() < 1e-12);
    }
}
