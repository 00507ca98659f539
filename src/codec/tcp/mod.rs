// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus TCP

use super::*;
use crate::endian::Be16;

pub use crate::frame::tcp::*;

// [MODBUS MESSAGING ON TCP/IP IMPLEMENTATION GUIDE V1.0b](http://modbus.org/docs/Modbus_Messaging_Implementation_Guide_V1_0b.pdf), page 18
// "a MODBUS request needs a maximum of 256 bytes + the MBAP header size"
pub const MAX_FRAME_LEN: usize = 260;

/// Transaction id, protocol id and length of an MBAP header.
///
/// The unit id, the last MBAP byte, is counted as part of the PDU.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mbap {
    pub transaction_id: Be16,
    pub protocol_id: Be16,
    /// Number of bytes following the length field.
    pub length: Be16,
}

impl Mbap {
    pub const LEN: usize = 6;

    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.len() < Self::LEN {
            return Err(Error::BufferSize);
        }
        self.transaction_id.write(&mut buf[0..])?;
        self.protocol_id.write(&mut buf[2..])?;
        self.length.write(&mut buf[4..])?;
        Ok(Self::LEN)
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < Self::LEN {
            return Err(Error::BufferSize);
        }
        Ok(Self {
            transaction_id: Be16::read(&buf[0..])?,
            protocol_id: Be16::read(&buf[2..])?,
            length: Be16::read(&buf[4..])?,
        })
    }
}

/// Modbus TCP encapsulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tcp;

impl Encapsulation for Tcp {
    type Header = Header;

    const HEADER_LEN: usize = Mbap::LEN;
    const TRAILER_LEN: usize = 0;

    fn unit(hdr: &Header) -> UnitId {
        hdr.unit_id
    }

    fn seal(hdr: &Header, adu: &mut [u8]) -> Result<()> {
        let pdu_len = pdu::<Self>(adu)?.len();
        Mbap {
            transaction_id: hdr.transaction_id.into(),
            protocol_id: hdr.protocol_id.into(),
            length: length_field(pdu_len)?,
        }
        .encode(adu)?;
        Ok(())
    }

    fn reseal(adu: &mut [u8]) -> Result<()> {
        let pdu_len = pdu::<Self>(adu)?.len();
        length_field(pdu_len)?.write(&mut adu[4..])
    }

    fn check_envelope(request: &[u8], response: &[u8]) -> Result<()> {
        let req = Mbap::decode(request)?;
        let rsp = Mbap::decode(response)?;
        if req.transaction_id != rsp.transaction_id {
            return Err(Error::TransactionIdMismatch(
                req.transaction_id.get(),
                rsp.transaction_id.get(),
            ));
        }
        let pdu_len = pdu::<Self>(response)?.len();
        let length = usize::from(rsp.length.get());
        if length != pdu_len {
            return Err(Error::LengthMismatch(length, pdu_len));
        }
        Ok(())
    }
}

fn length_field(pdu_len: usize) -> Result<Be16> {
    u16::try_from(pdu_len)
        .map(Be16::new)
        .map_err(|_| Error::BufferSize)
}

/// An extracted TCP PDU frame.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame<'a> {
    pub hdr: Header,
    pub function: FunctionCode,
    pub data: &'a [u8],
}

/// Encode a complete TCP ADU.
pub fn encode_adu(hdr: Header, fn_code: u8, data: &[u8], buf: &mut [u8]) -> Result<usize> {
    super::encode_adu::<Tcp>(&hdr, fn_code, data, buf)
}

/// Decode a complete TCP ADU whose length field covers the whole buffer.
pub fn decode_adu(buf: &[u8]) -> Result<DecodedFrame<'_>> {
    let mbap = Mbap::decode(buf)?;
    let pdu = pdu::<Tcp>(buf)?;
    let length = usize::from(mbap.length.get());
    if length != pdu.len() {
        return Err(Error::LengthMismatch(length, pdu.len()));
    }
    Ok(DecodedFrame {
        hdr: Header {
            transaction_id: mbap.transaction_id.get(),
            protocol_id: mbap.protocol_id.get(),
            unit_id: pdu[0],
        },
        function: FunctionCode::new(pdu[1]),
        data: &pdu[PDU_HEADER_LEN..],
    })
}
