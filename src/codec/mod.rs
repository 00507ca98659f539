// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt;

use crate::{error::*, frame::*};

#[cfg(feature = "rtu")]
pub mod rtu;
#[cfg(feature = "tcp")]
pub mod tcp;

type Result<T> = core::result::Result<T, Error>;

/// Unit id and function code.
pub(crate) const PDU_HEADER_LEN: usize = 2;

/// A physical framing around a PDU (`unit id`, `function code`, `data`).
///
/// An ADU buffer is laid out as `[header][PDU][trailer]`.
pub trait Encapsulation {
    /// Caller supplied framing parameters.
    type Header: Copy + fmt::Debug;

    /// Number of bytes in front of the PDU.
    const HEADER_LEN: usize;

    /// Number of bytes after the PDU.
    const TRAILER_LEN: usize;

    fn unit(hdr: &Self::Header) -> UnitId;

    /// Write header and trailer of an ADU whose PDU is already in place.
    fn seal(hdr: &Self::Header, adu: &mut [u8]) -> Result<()>;

    /// Recompute the fields that are derived from the PDU.
    fn reseal(adu: &mut [u8]) -> Result<()>;

    /// Check the response framing against the request framing.
    fn check_envelope(request: &[u8], response: &[u8]) -> Result<()>;

    /// ADU size for a PDU of `pdu_len` bytes.
    #[must_use]
    fn adu_len(pdu_len: usize) -> usize {
        Self::HEADER_LEN + pdu_len + Self::TRAILER_LEN
    }
}

/// The PDU inside an ADU.
pub(crate) fn pdu<E: Encapsulation>(adu: &[u8]) -> Result<&[u8]> {
    if adu.len() < E::adu_len(PDU_HEADER_LEN) {
        return Err(Error::BufferSize);
    }
    Ok(&adu[E::HEADER_LEN..adu.len() - E::TRAILER_LEN])
}

pub(crate) fn pdu_mut<E: Encapsulation>(adu: &mut [u8]) -> Result<&mut [u8]> {
    if adu.len() < E::adu_len(PDU_HEADER_LEN) {
        return Err(Error::BufferSize);
    }
    let end = adu.len() - E::TRAILER_LEN;
    Ok(&mut adu[E::HEADER_LEN..end])
}

/// Unit id of the PDU inside an ADU.
pub fn unit_id<E: Encapsulation>(adu: &[u8]) -> Result<UnitId> {
    pdu::<E>(adu).map(|pdu| pdu[0])
}

/// Raw function code of the PDU inside an ADU.
pub fn function_code<E: Encapsulation>(adu: &[u8]) -> Result<u8> {
    pdu::<E>(adu).map(|pdu| pdu[1])
}

/// Unit id and function code of the response must match the request.
pub(crate) fn check_identity<E: Encapsulation>(request: &[u8], response: &[u8]) -> Result<()> {
    let (req_unit, rsp_unit) = (unit_id::<E>(request)?, unit_id::<E>(response)?);
    if req_unit != rsp_unit {
        return Err(Error::ChannelMismatch(req_unit, rsp_unit));
    }
    let (req_fn, rsp_fn) = (function_code::<E>(request)?, function_code::<E>(response)?);
    if req_fn != rsp_fn {
        return Err(Error::FunctionMismatch(req_fn, rsp_fn));
    }
    Ok(())
}

/// Build an ADU from its parts, e.g. to emulate a server.
pub(crate) fn encode_adu<E: Encapsulation>(
    hdr: &E::Header,
    fn_code: u8,
    data: &[u8],
    buf: &mut [u8],
) -> Result<usize> {
    let size = E::adu_len(PDU_HEADER_LEN + data.len());
    if buf.len() < size {
        return Err(Error::BufferSize);
    }
    let adu = &mut buf[..size];
    let pdu = pdu_mut::<E>(adu)?;
    pdu[0] = E::unit(hdr);
    pdu[1] = fn_code;
    pdu[PDU_HEADER_LEN..].copy_from_slice(data);
    E::seal(hdr, adu)?;
    Ok(size)
}
