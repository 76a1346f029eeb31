//! Enumerated field values.
//!
//! Each enum carries a matching [`EnumDomain`] (`DOMAIN`) so the generic
//! field codec can validate wire integers without knowing the Rust type.

use std::fmt;
use std::str::FromStr;

use bkload_frame::EnumDomain;
use serde::Serialize;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        #[repr(u8)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire constants for the field codec.
            pub const DOMAIN: EnumDomain = EnumDomain {
                name: stringify!($name),
                variants: &[$((stringify!($variant), $value)),+],
            };

            /// Wire value.
            pub fn value(self) -> u64 {
                self as u64
            }

            /// Constant name.
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl TryFrom<u64> for $name {
            type Error = u64;

            fn try_from(value: u64) -> Result<Self, u64> {
                match value {
                    $($value => Ok($name::$variant),)+
                    other => Err(other),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

wire_enum! {
    /// Result code carried by the generic Status frame (0x12).
    StatusCode {
        Success = 0x80,
        IncorrectChecksum = 0x90,
        IncorrectParameter = 0xA0,
        UnrecognizedCommand = 0xB0,
        InvalidCommand = 0xC0,
    }
}

impl StatusCode {
    pub fn is_success(self) -> bool {
        self == StatusCode::Success
    }
}

wire_enum! {
    /// Regulation mode of the load.
    LimitMode {
        /// Constant current.
        CC = 0,
        /// Constant voltage.
        CV = 1,
        /// Constant power.
        CW = 2,
        /// Constant resistance.
        CR = 3,
    }
}

impl LimitMode {
    /// Engineering unit of the regulated quantity.
    pub fn unit(self) -> &'static str {
        match self {
            LimitMode::CC => "A",
            LimitMode::CV => "V",
            LimitMode::CW => "W",
            LimitMode::CR => "Ω",
        }
    }

    /// Name of the regulated quantity.
    pub fn label(self) -> &'static str {
        match self {
            LimitMode::CC => "Current",
            LimitMode::CV => "Voltage",
            LimitMode::CW => "Power",
            LimitMode::CR => "Resistance",
        }
    }
}

impl FromStr for LimitMode {
    type Err = String;

    /// Accepts the mode name (`cc`) or the quantity (`current`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cc" | "current" => Ok(LimitMode::CC),
            "cv" | "voltage" => Ok(LimitMode::CV),
            "cw" | "power" => Ok(LimitMode::CW),
            "cr" | "resistance" => Ok(LimitMode::CR),
            other => Err(format!(
                "unknown mode {other:?} (expected current, voltage, power or resistance)"
            )),
        }
    }
}

wire_enum! {
    /// How transient and list sequences advance.
    TransientOperation {
        Continuous = 0,
        Pulse = 1,
        Toggled = 2,
    }
}

wire_enum! {
    /// Where trigger events come from.
    TriggerSource {
        Immediate = 0,
        External = 1,
        Bus = 2,
    }
}

wire_enum! {
    /// Top-level load function.
    Function {
        Fixed = 0,
        Short = 1,
        Transient = 2,
        List = 3,
        Battery = 4,
    }
}

wire_enum! {
    /// List storage partitioning: files × steps per file.
    Partition {
        File1Steps1000 = 1,
        File2Steps500 = 2,
        File4Steps250 = 4,
        File8Steps120 = 8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domains_match_rust_variants() {
        for mode in LimitMode::ALL {
            assert_eq!(LimitMode::DOMAIN.name_of(mode.value()), Some(mode.name()));
        }
        for code in StatusCode::ALL {
            assert_eq!(StatusCode::try_from(code.value()), Ok(*code));
        }
        assert_eq!(Partition::DOMAIN.variants.len(), Partition::ALL.len());
    }

    #[test]
    fn status_codes_have_documented_values() {
        assert_eq!(StatusCode::Success.value(), 0x80);
        assert_eq!(StatusCode::InvalidCommand.value(), 0xC0);
        assert!(StatusCode::Success.is_success());
        assert!(!StatusCode::IncorrectParameter.is_success());
    }

    #[test]
    fn unknown_integer_is_rejected() {
        assert_eq!(StatusCode::try_from(0x81), Err(0x81));
        assert_eq!(Partition::try_from(3), Err(3));
        assert!(!Function::DOMAIN.contains(5));
    }

    #[test]
    fn limit_mode_parses_names_and_quantities() {
        assert_eq!("current".parse::<LimitMode>(), Ok(LimitMode::CC));
        assert_eq!("CV".parse::<LimitMode>(), Ok(LimitMode::CV));
        assert_eq!(" power ".parse::<LimitMode>(), Ok(LimitMode::CW));
        assert!("amps".parse::<LimitMode>().is_err());
        assert_eq!(LimitMode::CR.unit(), "Ω");
    }

    #[test]
    fn display_uses_constant_name() {
        assert_eq!(TriggerSource::Bus.to_string(), "Bus");
        assert_eq!(
            serde_json::to_string(&TransientOperation::Pulse).unwrap(),
            "\"Pulse\""
        );
    }
}
