//! Bit-packed status words carried by the Measure response.

use std::fmt;

use bkload_frame::FlagSet;
use serde::{Serialize, Serializer};

use crate::enums::LimitMode;

/// Operation state byte (8 bits, seven named).
pub static OPERATION_FLAGS: FlagSet = FlagSet {
    name: "OperationState",
    bits: 8,
    flags: &[
        "calculate_demarcation_coef",
        "waiting_for_trigger",
        "remote_control_enabled",
        "output_state",
        "local_key_enabled",
        "remote_sensing_enabled",
        "load_on_timer_enabled",
    ],
};

/// Demand state word (10 bits).
pub static DEMAND_FLAGS: FlagSet = FlagSet {
    name: "DemandState",
    bits: 10,
    flags: &[
        "voltage_reversed",
        "over_voltage",
        "over_current",
        "over_power",
        "over_temp",
        "not_connect_remote",
        "constant_current",
        "constant_voltage",
        "constant_power",
        "constant_resistance",
    ],
};

macro_rules! flag_word {
    (
        $(#[$meta:meta])*
        $word:ident($repr:ty), $flag:ident, $set:ident {
            $($(#[$vmeta:meta])* $variant:ident = $bit:literal),+ $(,)?
        }
    ) => {
        /// Single bit of the word, numbered from the LSB.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $flag {
            $($(#[$vmeta])* $variant = $bit),+
        }

        impl $flag {
            pub const ALL: &'static [$flag] = &[$($flag::$variant),+];

            fn mask(self) -> $repr {
                1 << (self as u32)
            }
        }

        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $word($repr);

        impl $word {
            /// Wrap raw bits; bits above the word's width are dropped.
            pub fn from_bits(bits: $repr) -> Self {
                Self(bits & ($set.mask() as $repr))
            }

            pub fn bits(self) -> $repr {
                self.0
            }

            pub fn contains(self, flag: $flag) -> bool {
                self.0 & flag.mask() != 0
            }

            #[must_use]
            pub fn with(self, flag: $flag) -> Self {
                Self(self.0 | flag.mask())
            }

            /// Set flags, LSB first.
            pub fn iter(self) -> impl Iterator<Item = $flag> {
                $flag::ALL.iter().copied().filter(move |f| self.contains(*f))
            }

            /// Names of the set flags, LSB first.
            pub fn names(self) -> Vec<&'static str> {
                $set.names(u32::from(self.0))
            }
        }

        impl FromIterator<$flag> for $word {
            fn from_iter<I: IntoIterator<Item = $flag>>(iter: I) -> Self {
                iter.into_iter().fold(Self::default(), $word::with)
            }
        }

        impl fmt::Display for $word {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let names = self.names();
                if names.is_empty() {
                    f.write_str("none")
                } else {
                    f.write_str(&names.join("|"))
                }
            }
        }

        impl Serialize for $word {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_seq(self.names())
            }
        }
    };
}

flag_word! {
    /// Load operation state reported by Measure.
    OperationState(u8), OperationFlag, OPERATION_FLAGS {
        CalculateDemarcationCoef = 0,
        WaitingForTrigger = 1,
        RemoteControlEnabled = 2,
        /// Load input is on.
        OutputState = 3,
        LocalKeyEnabled = 4,
        RemoteSensingEnabled = 5,
        LoadOnTimerEnabled = 6,
    }
}

flag_word! {
    /// Protection and regulation state reported by Measure.
    DemandState(u16), DemandFlag, DEMAND_FLAGS {
        VoltageReversed = 0,
        OverVoltage = 1,
        OverCurrent = 2,
        OverPower = 3,
        OverTemp = 4,
        NotConnectRemote = 5,
        ConstantCurrent = 6,
        ConstantVoltage = 7,
        ConstantPower = 8,
        ConstantResistance = 9,
    }
}

impl DemandState {
    /// Regulation mode currently in effect, if the load reports one.
    pub fn regulating(self) -> Option<LimitMode> {
        [
            (DemandFlag::ConstantCurrent, LimitMode::CC),
            (DemandFlag::ConstantVoltage, LimitMode::CV),
            (DemandFlag::ConstantPower, LimitMode::CW),
            (DemandFlag::ConstantResistance, LimitMode::CR),
        ]
        .into_iter()
        .find(|&(flag, _)| self.contains(flag))
        .map(|(_, mode)| mode)
    }

    /// True if any protection condition is raised.
    pub fn is_faulted(self) -> bool {
        self.iter().any(|flag| {
            matches!(
                flag,
                DemandFlag::VoltageReversed
                    | DemandFlag::OverVoltage
                    | DemandFlag::OverCurrent
                    | DemandFlag::OverPower
                    | DemandFlag::OverTemp
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_names_follow_bit_order() {
        assert_eq!(OPERATION_FLAGS.flags.len(), OperationFlag::ALL.len());
        assert_eq!(DEMAND_FLAGS.flags.len(), DemandFlag::ALL.len());
        for flag in DemandFlag::ALL {
            let word = DemandState::default().with(*flag);
            assert_eq!(word.names().len(), 1);
        }
    }

    #[test]
    fn operation_state_contains() {
        let state = OperationState::from_bits(0b0000_1100);
        assert!(state.contains(OperationFlag::RemoteControlEnabled));
        assert!(state.contains(OperationFlag::OutputState));
        assert!(!state.contains(OperationFlag::WaitingForTrigger));
        assert_eq!(state.to_string(), "remote_control_enabled|output_state");
    }

    #[test]
    fn demand_state_masks_reserved_bits() {
        let state = DemandState::from_bits(0xFC40);
        assert_eq!(state.bits(), 0x0040);
        assert_eq!(state.regulating(), Some(LimitMode::CC));
        assert!(!state.is_faulted());
    }

    #[test]
    fn collect_from_flags() {
        let state: DemandState = [DemandFlag::OverTemp, DemandFlag::ConstantVoltage]
            .into_iter()
            .collect();
        assert_eq!(state.bits(), (1 << 4) | (1 << 7));
        assert!(state.is_faulted());
        assert_eq!(
            state.iter().collect::<Vec<_>>(),
            vec![DemandFlag::OverTemp, DemandFlag::ConstantVoltage]
        );
    }

    #[test]
    fn empty_word_displays_none() {
        assert_eq!(OperationState::default().to_string(), "none");
        assert_eq!(
            serde_json::to_string(&OperationState::from_bits(0b1000)).unwrap(),
            r#"["output_state"]"#
        );
    }
}
