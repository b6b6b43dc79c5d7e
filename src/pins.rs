//! Port bank layout and pin assignments for the gateway module.
//!
//! Single source of truth: the reconciler, scheduler and real-time core all
//! map ports to pins through this module rather than hard-coding numbers.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Bank capacity
// ---------------------------------------------------------------------------

/// Upper bound on ports of one kind across every supported layout.
/// Fixed-capacity tables are sized from this.
pub const MAX_PORTS: usize = 4;

/// Upper bound on physical pins driven by the real-time core.
pub const MAX_PINS: usize = 4;

/// Ports on the combined DIDO bank (every port is input-capable).
pub const DIDO_PORTS: usize = 4;

/// Dedicated input ports on the DIO bank.
pub const DIO_INPUTS: usize = 2;
/// Dedicated output ports on the DIO bank.
pub const DIO_OUTPUTS: usize = 2;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Which hardware variant this module is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BankLayout {
    /// Four combined ports, configured through the `_DIDO` key dialect.
    Dido,
    /// Two inputs plus two outputs, configured through `_DI` / `_DO` keys.
    Dio,
}

impl BankLayout {
    /// Number of input-capable ports.
    pub const fn inputs(self) -> usize {
        match self {
            Self::Dido => DIDO_PORTS,
            Self::Dio => DIO_INPUTS,
        }
    }

    /// Number of dedicated output ports.
    pub const fn outputs(self) -> usize {
        match self {
            Self::Dido => 0,
            Self::Dio => DIO_OUTPUTS,
        }
    }

    /// Port token used in property keys and telemetry names for inputs.
    pub const fn input_token(self) -> &'static str {
        match self {
            Self::Dido => "DIDO",
            Self::Dio => "DI",
        }
    }

    /// Port token used in property keys and telemetry names for outputs.
    pub const fn output_token(self) -> &'static str {
        "DO"
    }

    /// Physical pin wired to input port `port`.
    pub const fn input_pin(self, port: PortIndex) -> u32 {
        port.0 as u32
    }

    /// Physical pin wired to output port `port`.
    pub const fn output_pin(self, port: PortIndex) -> u32 {
        match self {
            Self::Dido => port.0 as u32,
            Self::Dio => (DIO_INPUTS + port.0) as u32,
        }
    }
}

// ---------------------------------------------------------------------------
// Validated port index
// ---------------------------------------------------------------------------

/// Which side of the bank a port belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    Input,
    Output,
}

/// Zero-based port index, validated against the bank layout on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortIndex(usize);

impl PortIndex {
    /// Validate a zero-based index for the given side of `layout`.
    pub fn new(layout: BankLayout, kind: PortKind, index: usize) -> Option<Self> {
        let limit = match kind {
            PortKind::Input => layout.inputs(),
            PortKind::Output => layout.outputs(),
        };
        (index < limit).then_some(Self(index))
    }

    /// Validate a one-based port number as it appears in property keys.
    pub fn from_key_number(layout: BankLayout, kind: PortKind, number: u32) -> Option<Self> {
        let index = (number as usize).checked_sub(1)?;
        Self::new(layout, kind, index)
    }

    /// Zero-based index, usable for table lookup.
    pub const fn get(self) -> usize {
        self.0
    }

    /// One-based number used in keys and telemetry names.
    pub const fn number(self) -> usize {
        self.0 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_numbers_are_one_based() {
        let p = PortIndex::from_key_number(BankLayout::Dido, PortKind::Input, 1).unwrap();
        assert_eq!(p.get(), 0);
        assert_eq!(p.number(), 1);
        assert!(PortIndex::from_key_number(BankLayout::Dido, PortKind::Input, 0).is_none());
    }

    #[test]
    fn out_of_range_ports_are_rejected() {
        assert!(PortIndex::from_key_number(BankLayout::Dido, PortKind::Input, 4).is_some());
        assert!(PortIndex::from_key_number(BankLayout::Dido, PortKind::Input, 5).is_none());
        assert!(PortIndex::from_key_number(BankLayout::Dio, PortKind::Input, 3).is_none());
        assert!(PortIndex::from_key_number(BankLayout::Dido, PortKind::Output, 1).is_none());
    }

    #[test]
    fn dio_outputs_follow_inputs_on_the_pin_map() {
        let layout = BankLayout::Dio;
        let do1 = PortIndex::new(layout, PortKind::Output, 0).unwrap();
        let di2 = PortIndex::new(layout, PortKind::Input, 1).unwrap();
        assert_eq!(layout.output_pin(do1), 2);
        assert_eq!(layout.input_pin(di2), 1);
    }
}
