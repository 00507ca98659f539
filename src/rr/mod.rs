// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request/response sessions.
//!
//! A session ([`Rr`]) owns the raw request and response of exactly one
//! exchange. It is built with a complete request, receives the response
//! bytes from whatever transport the caller uses and validates them:
//!
//! 1. the envelope (TCP transaction id and length, RTU CRC),
//! 2. the PDU identity (unit id and function code),
//! 3. the data shape of the operation.
//!
//! The first failing check is reported and the session is done.

use core::marker::PhantomData;

use crate::{
    codec::{self, Encapsulation, PDU_HEADER_LEN},
    endian::Be16,
    error::Error,
    frame::{FunctionCode, UnitId},
};

mod read;
mod set;
mod write;

pub use self::{read::*, set::*, write::*};

#[cfg(feature = "rtu")]
use crate::{codec::rtu::Rtu, endian::Le16};
#[cfg(feature = "tcp")]
use crate::codec::tcp::{ProtocolId, Tcp, TransactionId};

type Result<T> = core::result::Result<T, Error>;

/// Capacity of the request and response buffers.
pub const MAX_ADU_LEN: usize = 260;

#[derive(Debug, Clone)]
struct Buffer {
    data: [u8; MAX_ADU_LEN],
    len: usize,
}

impl Buffer {
    const fn empty() -> Self {
        Self {
            data: [0; MAX_ADU_LEN],
            len: 0,
        }
    }

    fn with_len(len: usize) -> Result<Self> {
        if len > MAX_ADU_LEN {
            return Err(Error::BufferSize);
        }
        let mut buf = Self::empty();
        buf.len = len;
        Ok(buf)
    }

    fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data[..self.len]
    }
}

/// Progress of a session.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// The request is ready to be sent.
    Built,
    /// Response bytes were received but not checked yet.
    ResponseReceived,
    /// All checks passed.
    Validated,
    /// A check failed.
    Rejected(Error),
}

impl State {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Validated | Self::Rejected(_))
    }
}

/// The raw ADUs of an exchange and the data parts of their PDUs.
#[derive(Debug, Clone, Copy)]
pub struct Exchange<'a> {
    pub request: &'a [u8],
    pub response: &'a [u8],
    /// Request PDU without unit id and function code.
    pub request_data: &'a [u8],
    /// Response PDU without unit id and function code.
    pub response_data: &'a [u8],
}

/// What a session does: its request data and the data-shape check of
/// the response.
pub trait Operation {
    fn function(&self) -> FunctionCode;

    /// Size of the request data following the function code.
    fn request_data_len(&self) -> usize;

    /// Size of the expected response data following the function code.
    fn response_data_len(&self) -> usize;

    /// `data` is exactly [`Operation::request_data_len`] bytes long.
    fn encode_request(&self, data: &mut [u8]) -> Result<()>;

    /// Runs after envelope and identity checks passed.
    fn check_response(&self, exchange: &Exchange<'_>) -> Result<()>;
}

/// A request/response session of operation `O` framed by `E`.
#[derive(Debug, Clone)]
pub struct Rr<E: Encapsulation, O> {
    op: O,
    request: Buffer,
    response: Buffer,
    response_len: usize,
    state: State,
    encapsulation: PhantomData<E>,
}

impl<E: Encapsulation, O: Operation> Rr<E, O> {
    pub(crate) fn build(hdr: E::Header, op: O) -> Result<Self> {
        let mut request =
            Buffer::with_len(E::adu_len(PDU_HEADER_LEN + op.request_data_len()))?;
        let pdu = codec::pdu_mut::<E>(request.as_mut_slice())?;
        pdu[0] = E::unit(&hdr);
        pdu[1] = op.function().value();
        op.encode_request(&mut pdu[PDU_HEADER_LEN..])?;
        E::seal(&hdr, request.as_mut_slice())?;

        let response_len = E::adu_len(PDU_HEADER_LEN + op.response_data_len());
        if response_len > MAX_ADU_LEN {
            return Err(Error::BufferSize);
        }
        #[cfg(feature = "log")]
        log::debug!("Built request {:02X?}", request.as_slice());
        Ok(Self {
            op,
            request,
            response: Buffer::empty(),
            response_len,
            state: State::Built,
            encapsulation: PhantomData,
        })
    }

    /// The request, ready to be transmitted verbatim.
    #[must_use]
    pub fn request_bytes(&self) -> &[u8] {
        self.request.as_slice()
    }

    /// Number of bytes a regular response occupies.
    #[must_use]
    pub const fn response_len(&self) -> usize {
        self.response_len
    }

    /// The received response; empty until [`Rr::fill_response`].
    #[must_use]
    pub fn response_bytes(&self) -> &[u8] {
        self.response.as_slice()
    }

    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    #[must_use]
    pub const fn operation(&self) -> &O {
        &self.op
    }

    #[must_use]
    pub fn unit_id(&self) -> UnitId {
        self.request_pdu()[0]
    }

    pub fn set_unit_id(&mut self, unit_id: UnitId) -> Result<()> {
        self.edit_adu(|adu| {
            codec::pdu_mut::<E>(adu)?[0] = unit_id;
            Ok(())
        })
    }

    #[must_use]
    pub fn function_code(&self) -> FunctionCode {
        FunctionCode::new(self.request_pdu()[1])
    }

    /// Store the bytes received from the transport.
    ///
    /// `bytes` must be exactly [`Rr::response_len`] long.
    pub fn fill_response(&mut self, bytes: &[u8]) -> Result<()> {
        if self.state != State::Built {
            return Err(Error::Sealed);
        }
        if bytes.len() != self.response_len {
            return Err(Error::BufferSize);
        }
        let mut response = Buffer::with_len(bytes.len())?;
        response.as_mut_slice().copy_from_slice(bytes);
        self.response = response;
        self.state = State::ResponseReceived;
        Ok(())
    }

    /// Run the validation chain once; later calls return the same outcome.
    ///
    /// Fails with [`Error::NoResponse`] before [`Rr::fill_response`].
    pub fn validate_response(&mut self) -> Result<()> {
        match self.state {
            State::Built => Err(Error::NoResponse),
            State::Validated => Ok(()),
            State::Rejected(err) => Err(err),
            State::ResponseReceived => {
                let result = self.check_response();
                self.state = match result {
                    Ok(()) => State::Validated,
                    Err(err) => State::Rejected(err),
                };
                #[cfg(feature = "log")]
                match result {
                    Ok(()) => log::debug!("Validated response {:02X?}", self.response_bytes()),
                    Err(err) => log::warn!(
                        "Rejected response {:02X?}: {err}",
                        self.response_bytes()
                    ),
                }
                result
            }
        }
    }

    fn check_response(&self) -> Result<()> {
        let request = self.request.as_slice();
        let response = self.response.as_slice();
        E::check_envelope(request, response)?;
        codec::check_identity::<E>(request, response)?;
        let exchange = Exchange {
            request,
            response,
            request_data: &codec::pdu::<E>(request)?[PDU_HEADER_LEN..],
            response_data: &codec::pdu::<E>(response)?[PDU_HEADER_LEN..],
        };
        self.op.check_response(&exchange)
    }

    fn request_pdu(&self) -> &[u8] {
        let adu = self.request.as_slice();
        &adu[E::HEADER_LEN..adu.len() - E::TRAILER_LEN]
    }

    pub(crate) fn request_data(&self) -> &[u8] {
        &self.request_pdu()[PDU_HEADER_LEN..]
    }

    /// Response data, if a response was received.
    pub(crate) fn response_data(&self) -> Option<&[u8]> {
        if self.state == State::Built {
            return None;
        }
        codec::pdu::<E>(self.response.as_slice())
            .ok()
            .map(|pdu| &pdu[PDU_HEADER_LEN..])
    }

    /// Response data of a validated session.
    pub(crate) fn validated_response_data(&self) -> Option<&[u8]> {
        if self.state != State::Validated {
            return None;
        }
        self.response_data()
    }

    /// Modify the request ADU; fields derived from the PDU are refreshed.
    pub(crate) fn edit_adu(&mut self, f: impl FnOnce(&mut [u8]) -> Result<()>) -> Result<()> {
        if self.state != State::Built {
            return Err(Error::Sealed);
        }
        f(self.request.as_mut_slice())?;
        E::reseal(self.request.as_mut_slice())
    }

    /// Modify the operation and the request data together.
    pub(crate) fn edit_request(
        &mut self,
        f: impl FnOnce(&mut O, &mut [u8]) -> Result<()>,
    ) -> Result<()> {
        if self.state != State::Built {
            return Err(Error::Sealed);
        }
        let pdu = codec::pdu_mut::<E>(self.request.as_mut_slice())?;
        f(&mut self.op, &mut pdu[PDU_HEADER_LEN..])?;
        E::reseal(self.request.as_mut_slice())
    }

    /// Big-endian word at `offset` of the request data.
    pub(crate) fn request_word(&self, offset: usize) -> u16 {
        let data = self.request_data();
        Be16::from_bytes([data[offset], data[offset + 1]]).get()
    }

    pub(crate) fn set_request_word(&mut self, offset: usize, value: u16) -> Result<()> {
        self.edit_request(|_, data| Be16::new(value).write(&mut data[offset..]))
    }

    /// Big-endian word at `offset` of a validated response's data.
    pub(crate) fn response_word(&self, offset: usize) -> Option<u16> {
        let data = self.validated_response_data()?;
        Be16::read(data.get(offset..)?).ok().map(Be16::get)
    }
}

#[cfg(feature = "tcp")]
impl<O: Operation> Rr<Tcp, O> {
    #[must_use]
    pub fn transaction_id(&self) -> TransactionId {
        let adu = self.request_bytes();
        Be16::from_bytes([adu[0], adu[1]]).get()
    }

    pub fn set_transaction_id(&mut self, transaction_id: TransactionId) -> Result<()> {
        self.edit_adu(|adu| Be16::new(transaction_id).write(adu))
    }

    #[must_use]
    pub fn protocol_id(&self) -> ProtocolId {
        let adu = self.request_bytes();
        Be16::from_bytes([adu[2], adu[3]]).get()
    }

    pub fn set_protocol_id(&mut self, protocol_id: ProtocolId) -> Result<()> {
        self.edit_adu(|adu| Be16::new(protocol_id).write(&mut adu[2..]))
    }

    /// Transaction id of the received response.
    #[must_use]
    pub fn response_transaction_id(&self) -> Option<TransactionId> {
        Be16::read(self.response_bytes()).ok().map(Be16::get)
    }
}

#[cfg(feature = "rtu")]
impl<O: Operation> Rr<Rtu, O> {
    /// CRC of the request.
    #[must_use]
    pub fn crc(&self) -> u16 {
        let adu = self.request_bytes();
        Le16::from_bytes([adu[adu.len() - 2], adu[adu.len() - 1]]).get()
    }

    /// CRC trailer of the received response.
    #[must_use]
    pub fn response_crc(&self) -> Option<u16> {
        let adu = self.response_bytes();
        Le16::read(adu.get(adu.len().checked_sub(2)?..)?)
            .ok()
            .map(Le16::get)
    }
}
