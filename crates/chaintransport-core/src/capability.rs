//! Backend capabilities — the named operations a backend may expose.
//!
//! A backend declares its capabilities once; the adapter probes this set at
//! construction (required operations) and before every call (optional ones).

use bitflags::bitflags;

bitflags! {
    /// Set of operations a [`TransportBackend`](crate::TransportBackend) supports.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u16 {
        const GET_ADDRESS_SUMMARY    = 1 << 0;
        const GET_TRANSACTION_BY_ID  = 1 << 1;
        const GET_UTXO               = 1 << 2;
        const SEND_RAW_TRANSACTION   = 1 << 3;
        const GET_BEST_BLOCK_HEIGHT  = 1 << 4;
        const GET_STATUS             = 1 << 5;
        const SUBSCRIBE_TO_ADDRESSES = 1 << 6;
        const SUBSCRIBE_TO_EVENT     = 1 << 7;
        const CLOSE_SOCKET           = 1 << 8;
        const GET_NETWORK            = 1 << 9;

        /// Operations every backend must expose to be considered valid.
        const REQUIRED = Self::GET_ADDRESS_SUMMARY.bits()
            | Self::GET_TRANSACTION_BY_ID.bits()
            | Self::GET_UTXO.bits()
            | Self::SEND_RAW_TRANSACTION.bits();
    }
}

/// Wire-level method name for every single capability, in declaration order.
const METHOD_NAMES: &[(Capabilities, &str)] = &[
    (Capabilities::GET_ADDRESS_SUMMARY, "getAddressSummary"),
    (Capabilities::GET_TRANSACTION_BY_ID, "getTransactionById"),
    (Capabilities::GET_UTXO, "getUTXO"),
    (Capabilities::SEND_RAW_TRANSACTION, "sendRawTransaction"),
    (Capabilities::GET_BEST_BLOCK_HEIGHT, "getBestBlockHeight"),
    (Capabilities::GET_STATUS, "getStatus"),
    (Capabilities::SUBSCRIBE_TO_ADDRESSES, "subscribeToAddresses"),
    (Capabilities::SUBSCRIBE_TO_EVENT, "subscribeToEvent"),
    (Capabilities::CLOSE_SOCKET, "closeSocket"),
    (Capabilities::GET_NETWORK, "getNetwork"),
];

impl Capabilities {
    /// Look up the single capability behind a method name (`"getUTXO"` etc.).
    pub fn from_method(name: &str) -> Option<Self> {
        METHOD_NAMES
            .iter()
            .find(|(_, method)| *method == name)
            .map(|(cap, _)| *cap)
    }

    /// Method name of a single capability; `None` for empty or combined sets.
    pub fn method_name(self) -> Option<&'static str> {
        METHOD_NAMES
            .iter()
            .find(|(cap, _)| *cap == self)
            .map(|(_, method)| *method)
    }

    /// Method names of all required capabilities absent from `self`.
    pub fn missing_required(self) -> Vec<&'static str> {
        let missing = Self::REQUIRED.difference(self);
        METHOD_NAMES
            .iter()
            .filter(|(cap, _)| missing.contains(*cap))
            .map(|(_, method)| *method)
            .collect()
    }

    /// Returns `true` if every required capability is present.
    pub fn is_complete(self) -> bool {
        self.contains(Self::REQUIRED)
    }
}

impl std::fmt::Display for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = METHOD_NAMES
            .iter()
            .filter(|(cap, _)| self.contains(*cap))
            .map(|(_, method)| *method)
            .collect();
        write!(f, "[{}]", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_round_trip() {
        for (cap, name) in METHOD_NAMES {
            assert_eq!(Capabilities::from_method(name), Some(*cap));
            assert_eq!(cap.method_name(), Some(*name));
        }
        assert!(Capabilities::from_method("").is_none());
        assert!(Capabilities::from_method("getutxo").is_none());
    }

    #[test]
    fn combined_set_has_no_method_name() {
        assert!(Capabilities::REQUIRED.method_name().is_none());
        assert!(Capabilities::empty().method_name().is_none());
    }

    #[test]
    fn missing_required_lists_each_absent_operation() {
        let caps = Capabilities::GET_UTXO | Capabilities::GET_STATUS;
        assert_eq!(
            caps.missing_required(),
            vec!["getAddressSummary", "getTransactionById", "sendRawTransaction"]
        );
        assert!(!caps.is_complete());
        assert!(Capabilities::REQUIRED.missing_required().is_empty());
        assert!(Capabilities::all().is_complete());
    }

    #[test]
    fn display_lists_methods() {
        let caps = Capabilities::GET_UTXO | Capabilities::CLOSE_SOCKET;
        assert_eq!(caps.to_string(), "[getUTXO, closeSocket]");
    }
}
