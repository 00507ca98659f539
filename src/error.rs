// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt;

/// modbus-rr Error
///
/// Every check of the response validation chain has its own variant,
/// so callers can tell link corruption (`Crc`, `Length`) apart from
/// protocol errors (`Function`, `Count`).
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Response unit id differs from the request unit id (request, response)
    ChannelMismatch(u8, u8),
    /// Response function code differs from the request (request, response)
    FunctionMismatch(u8, u8),
    /// TCP transaction id differs (request, response)
    TransactionIdMismatch(u16, u16),
    /// TCP length field differs from the PDU size (length field, PDU size)
    LengthMismatch(usize, usize),
    /// Invalid RTU CRC (received, calculated)
    CrcMismatch(u16, u16),
    /// Requested and returned item count differ (requested, returned)
    CountMismatch(u16, u16),
    /// Returned payload length differs from the item size (expected, actual)
    ReadLengthMismatch(u8, u8),
    /// A set response is not an echo of its request
    EchoMismatch,
    /// Item declaration is inconsistent with its byte size
    DescriptorConfiguration { count: u16, size: usize },
    /// Invalid coil value
    CoilValue(u16),
    /// Invalid buffer size
    BufferSize,
    /// The session already received its response
    Sealed,
    /// No response was received yet
    NoResponse,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Error::*;

        match self {
            ChannelMismatch(req, rsp) => {
                write!(f, "Unit id mismatch: request = {req}, response = {rsp}")
            }
            FunctionMismatch(req, rsp) => write!(
                f,
                "Function code mismatch: request = 0x{req:0>2X}, response = 0x{rsp:0>2X}"
            ),
            TransactionIdMismatch(req, rsp) => write!(
                f,
                "Transaction id mismatch: request = {req}, response = {rsp}"
            ),
            LengthMismatch(length_field, pdu_len) => write!(
                f,
                "Length Mismatch: Length Field: {length_field}, PDU Len: {pdu_len}"
            ),
            CrcMismatch(received, calculated) => write!(
                f,
                "Invalid CRC: received = 0x{received:0>4X}, calculated = 0x{calculated:0>4X}"
            ),
            CountMismatch(requested, returned) => write!(
                f,
                "Count mismatch: requested = {requested}, returned = {returned}"
            ),
            ReadLengthMismatch(expected, actual) => write!(
                f,
                "Read length mismatch: expected = {expected}, actual = {actual}"
            ),
            EchoMismatch => write!(f, "Response is not an echo of the request"),
            DescriptorConfiguration { count, size } => write!(
                f,
                "Invalid item declaration: count = {count}, byte size = {size}"
            ),
            CoilValue(v) => write!(f, "Invalid coil value: 0x{v:0>4X}"),
            BufferSize => write!(f, "Invalid buffer size"),
            Sealed => write!(f, "Response already received"),
            NoResponse => write!(f, "No response received"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
