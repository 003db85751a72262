//! Serial line settings and the vendor factory presets.
//!
//! Ohaus ships at 2400 7N2 and is usually reconfigured to 9600 8N1.
//! SI ships at 2400 8N1; 9600 8N1 is also common in the field.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    pub path: String,
    pub baud_rate: u32,
    /// 5..=8
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl SerialSettings {
    pub fn new(path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            path: path.into(),
            baud_rate,
            data_bits: 8,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }

    pub fn ohaus_2400_7n2(path: impl Into<String>) -> Self {
        Self {
            data_bits: 7,
            stop_bits: StopBits::Two,
            ..Self::new(path, 2400)
        }
    }

    pub fn ohaus_9600_8n1(path: impl Into<String>) -> Self {
        Self::new(path, 9600)
    }

    pub fn si_2400_8n1(path: impl Into<String>) -> Self {
        Self::new(path, 2400)
    }

    pub fn si_9600_8n1(path: impl Into<String>) -> Self {
        Self::new(path, 9600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ohaus_factory_default_is_7n2() {
        let s = SerialSettings::ohaus_2400_7n2("/dev/ttyUSB0");
        assert_eq!(s.baud_rate, 2400);
        assert_eq!(s.data_bits, 7);
        assert_eq!(s.parity, Parity::None);
        assert_eq!(s.stop_bits, StopBits::Two);
    }

    #[test]
    fn si_presets_are_8n1() {
        for s in [
            SerialSettings::si_2400_8n1("COM8"),
            SerialSettings::si_9600_8n1("COM8"),
        ] {
            assert_eq!(s.data_bits, 8);
            assert_eq!(s.stop_bits, StopBits::One);
        }
    }
}
