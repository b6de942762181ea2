//! # Module Events
//!
//! Events emitted by the recovery module and the signature validator for
//! off-chain observers and indexers. Each module owns an [`EventLog`] and
//! appends to it only after a mutating call has fully succeeded, so a
//! failed call never leaves an event behind.

use serde::{Deserialize, Serialize};

use crate::identity::{Address, Bytes32, Identifier};
use crate::temporal::Timestamp;

/// An observable state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "PascalCase")]
pub enum ModuleEvent {
    /// A Safe bound a guardian identifier to itself.
    SafeRegistered {
        account: Address,
        identifier: Identifier,
    },
    /// A guardian proof replaced one of a Safe's owners.
    OwnerRecovered {
        account: Address,
        old_owner: Address,
        new_owner: Address,
        recoverer: Identifier,
    },
    /// An identifier was added to the validator allow-list.
    SignerAuthorized { identifier: Identifier },
    /// An identifier was removed from the validator allow-list.
    SignerRevoked { identifier: Identifier },
    /// A proof was accepted by the stateful validation path.
    SignatureValidated { hash: Bytes32, identifier: Identifier },
    /// The validator administrator changed.
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
}

impl ModuleEvent {
    /// Event name as observers see it.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SafeRegistered { .. } => "SafeRegistered",
            Self::OwnerRecovered { .. } => "OwnerRecovered",
            Self::SignerAuthorized { .. } => "SignerAuthorized",
            Self::SignerRevoked { .. } => "SignerRevoked",
            Self::SignatureValidated { .. } => "SignatureValidated",
            Self::OwnershipTransferred { .. } => "OwnershipTransferred",
        }
    }
}

/// An event with the time it was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub event: ModuleEvent,
}

/// Ordered, append-only log of emitted events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event stamped with the current time.
    pub fn emit(&mut self, event: ModuleEvent) {
        self.records.push(EventRecord {
            timestamp: Timestamp::now(),
            event,
        });
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Events without timestamps, in emission order.
    pub fn events(&self) -> impl Iterator<Item = &ModuleEvent> {
        self.records.iter().map(|r| &r.event)
    }

    /// The most recent event, if any.
    pub fn last(&self) -> Option<&ModuleEvent> {
        self.records.last().map(|r| &r.event)
    }

    /// Drain every recorded event.
    pub fn take(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_preserves_order_and_drains() {
        let mut log = EventLog::new();
        log.emit(ModuleEvent::SignerAuthorized {
            identifier: Identifier::new([1; 32]),
        });
        log.emit(ModuleEvent::SignerRevoked {
            identifier: Identifier::new([1; 32]),
        });
        assert_eq!(log.len(), 2);
        assert_eq!(log.last().map(ModuleEvent::name), Some("SignerRevoked"));

        let drained = log.take();
        assert_eq!(drained[0].event.name(), "SignerAuthorized");
        assert!(log.is_empty());
    }

    #[test]
    fn serializes_with_event_tag() {
        let event = ModuleEvent::SafeRegistered {
            account: Address::from_low_u64(9),
            identifier: Identifier::ZERO,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "SafeRegistered");
        assert_eq!(json["account"], Address::from_low_u64(9).to_hex());
    }
}
