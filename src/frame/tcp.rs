// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::*;

pub type TransactionId = u16;
pub type ProtocolId = u16;

/// Caller supplied part of the MBAP header.
///
/// The length field is always derived from the PDU.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    pub transaction_id: TransactionId,
    pub protocol_id: ProtocolId,
    pub unit_id: UnitId,
}

impl Header {
    /// Header with transaction and protocol id `0`.
    #[must_use]
    pub const fn new(unit_id: UnitId) -> Self {
        Self {
            transaction_id: 0,
            protocol_id: 0,
            unit_id,
        }
    }

    #[must_use]
    pub const fn with_transaction_id(self, transaction_id: TransactionId) -> Self {
        Self {
            transaction_id,
            ..self
        }
    }
}

impl From<UnitId> for Header {
    fn from(unit_id: UnitId) -> Self {
        Self::new(unit_id)
    }
}
