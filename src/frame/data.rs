// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payload shapes that follow the function code inside a PDU.
//!
//! Every shape is (de)serialized with fixed offsets; nothing relies on
//! the in-memory layout of the Rust types.

use super::*;
use crate::{
    endian::Be16,
    util::{bool_to_u16_coil, u16_coil_to_bool},
};

/// Read `count` units starting at `address`.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRequest {
    pub address: Be16,
    pub count: Be16,
}

impl ReadRequest {
    pub const LEN: usize = 4;

    #[must_use]
    pub fn new(address: Address, count: Quantity) -> Self {
        Self {
            address: address.into(),
            count: count.into(),
        }
    }

    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, Error> {
        if buf.len() < Self::LEN {
            return Err(Error::BufferSize);
        }
        self.address.write(&mut buf[0..])?;
        self.count.write(&mut buf[2..])?;
        Ok(Self::LEN)
    }

    pub fn decode(buf: &[u8]) -> Result<Self, Error> {
        if buf.len() < Self::LEN {
            return Err(Error::BufferSize);
        }
        Ok(Self {
            address: Be16::read(&buf[0..])?,
            count: Be16::read(&buf[2..])?,
        })
    }
}

/// Byte count followed by the returned payload.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadResponse<'r> {
    pub len: u8,
    pub payload: &'r [u8],
}

impl<'r> ReadResponse<'r> {
    /// Size of the fixed part in front of the payload.
    pub const HEADER_LEN: usize = 1;

    /// The payload is everything after the byte count, regardless of
    /// what the byte count claims.
    pub fn decode(buf: &'r [u8]) -> Result<Self, Error> {
        let (&len, payload) = buf.split_first().ok_or(Error::BufferSize)?;
        Ok(Self { len, payload })
    }

    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, Error> {
        let size = Self::HEADER_LEN + self.payload.len();
        if buf.len() < size {
            return Err(Error::BufferSize);
        }
        buf[0] = self.len;
        buf[1..size].copy_from_slice(self.payload);
        Ok(size)
    }
}

/// Write `count` units of `payload` starting at `address`.
///
/// `len` is the byte count on the wire; a payload shorter than `len`
/// is padded with zeros.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteRequest<'r> {
    pub address: Be16,
    pub count: Be16,
    pub len: u8,
    pub payload: &'r [u8],
}

impl<'r> WriteRequest<'r> {
    /// Size of the fixed part in front of the payload.
    pub const HEADER_LEN: usize = 5;

    #[must_use]
    pub const fn encoded_len(&self) -> usize {
        Self::HEADER_LEN + self.len as usize
    }

    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, Error> {
        let size = self.encoded_len();
        if buf.len() < size || self.payload.len() > self.len as usize {
            return Err(Error::BufferSize);
        }
        self.address.write(&mut buf[0..])?;
        self.count.write(&mut buf[2..])?;
        buf[4] = self.len;
        let (payload, padding) = buf[Self::HEADER_LEN..size].split_at_mut(self.payload.len());
        payload.copy_from_slice(self.payload);
        padding.fill(0);
        Ok(size)
    }

    pub fn decode(buf: &'r [u8]) -> Result<Self, Error> {
        if buf.len() < Self::HEADER_LEN {
            return Err(Error::BufferSize);
        }
        Ok(Self {
            address: Be16::read(&buf[0..])?,
            count: Be16::read(&buf[2..])?,
            len: buf[4],
            payload: &buf[Self::HEADER_LEN..],
        })
    }
}

/// Echo of the written range.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteResponse {
    pub address: Be16,
    pub count: Be16,
}

impl WriteResponse {
    pub const LEN: usize = 4;

    #[must_use]
    pub fn new(address: Address, count: Quantity) -> Self {
        Self {
            address: address.into(),
            count: count.into(),
        }
    }

    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, Error> {
        ReadRequest {
            address: self.address,
            count: self.count,
        }
        .encode(buf)
    }

    pub fn decode(buf: &[u8]) -> Result<Self, Error> {
        let ReadRequest { address, count } = ReadRequest::decode(buf)?;
        Ok(Self { address, count })
    }
}

/// The 16 bit value of a single register or coil write.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetValue {
    Register(u16),
    /// Encoded as `0xFF00` (on) or `0x0000` (off).
    Coil(bool),
}

impl SetValue {
    /// The raw 16 bit field.
    #[must_use]
    pub const fn to_raw(self) -> u16 {
        match self {
            Self::Register(v) => v,
            Self::Coil(on) => bool_to_u16_coil(on),
        }
    }

    /// Interpret `raw` the same way as `self` (register or coil).
    pub const fn decode_like(self, raw: u16) -> Result<Self, Error> {
        match self {
            Self::Register(_) => Ok(Self::Register(raw)),
            Self::Coil(_) => match u16_coil_to_bool(raw) {
                Ok(on) => Ok(Self::Coil(on)),
                Err(err) => Err(err),
            },
        }
    }

    #[must_use]
    pub const fn is_coil(self) -> bool {
        matches!(self, Self::Coil(_))
    }
}

impl From<bool> for SetValue {
    fn from(on: bool) -> Self {
        Self::Coil(on)
    }
}

impl From<u16> for SetValue {
    fn from(value: u16) -> Self {
        Self::Register(value)
    }
}

/// Single register or coil write; the server echoes it verbatim.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetRequest {
    pub address: Be16,
    pub value: SetValue,
}

/// Same shape as the request.
pub type SetResponse = SetRequest;

impl SetRequest {
    pub const LEN: usize = 4;

    #[must_use]
    pub fn new(address: Address, value: SetValue) -> Self {
        Self {
            address: address.into(),
            value,
        }
    }

    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, Error> {
        if buf.len() < Self::LEN {
            return Err(Error::BufferSize);
        }
        self.address.write(&mut buf[0..])?;
        Be16::new(self.value.to_raw()).write(&mut buf[2..])?;
        Ok(Self::LEN)
    }

    /// Decode with the value interpreted like `like`.
    pub fn decode(buf: &[u8], like: SetValue) -> Result<Self, Error> {
        if buf.len() < Self::LEN {
            return Err(Error::BufferSize);
        }
        let address = Be16::read(&buf[0..])?;
        let value = like.decode_like(Be16::read(&buf[2..])?.get())?;
        Ok(Self { address, value })
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn encode_read_request() {
        let buf = &mut [0; 5];
        assert_eq!(ReadRequest::new(0x1234, 10).encode(buf).unwrap(), 4);
        assert_eq!(buf, &[0x12, 0x34, 0x00, 0x0A, 0x00]);
        assert_eq!(
            ReadRequest::new(0, 1).encode(&mut [0; 3]).err().unwrap(),
            Error::BufferSize
        );
    }

    #[test]
    fn decode_read_response_keeps_declared_len() {
        let rsp = ReadResponse::decode(&[0x03, 0xAA, 0xBB, 0xCC, 0xDD]).unwrap();
        assert_eq!(rsp.len, 3);
        assert_eq!(rsp.payload, &[0xAA, 0xBB, 0xCC, 0xDD]);
        assert!(ReadResponse::decode(&[]).is_err());
    }

    #[test]
    fn encode_write_request_with_padding() {
        let buf = &mut [0xEE; 9];
        let req = WriteRequest {
            address: Be16::new(0x0010),
            count: Be16::new(2),
            len: 4,
            payload: &[0x01, 0x02, 0x03],
        };
        assert_eq!(req.encode(buf).unwrap(), 9);
        assert_eq!(buf, &[0x00, 0x10, 0x00, 0x02, 0x04, 0x01, 0x02, 0x03, 0x00]);

        let decoded = WriteRequest::decode(buf).unwrap();
        assert_eq!(decoded.address.get(), 0x0010);
        assert_eq!(decoded.count.get(), 2);
        assert_eq!(decoded.len, 4);
        assert_eq!(decoded.payload, &[0x01, 0x02, 0x03, 0x00]);
    }

    #[test]
    fn write_request_payload_longer_than_len() {
        let req = WriteRequest {
            address: Be16::new(0),
            count: Be16::new(1),
            len: 1,
            payload: &[1, 2],
        };
        assert_eq!(req.encode(&mut [0; 16]).err().unwrap(), Error::BufferSize);
    }

    #[test]
    fn write_response_layout() {
        let buf = &mut [0; 4];
        WriteResponse::new(0x0102, 0x0304).encode(buf).unwrap();
        assert_eq!(buf, &[1, 2, 3, 4]);
        assert_eq!(
            WriteResponse::decode(buf).unwrap(),
            WriteResponse::new(0x0102, 0x0304)
        );
    }

    #[test]
    fn set_coil_encoding() {
        let buf = &mut [0; 4];
        SetRequest::new(5, SetValue::Coil(true)).encode(buf).unwrap();
        assert_eq!(buf, &[0x00, 0x05, 0xFF, 0x00]);
        SetRequest::new(5, false.into()).encode(buf).unwrap();
        assert_eq!(buf, &[0x00, 0x05, 0x00, 0x00]);
        SetRequest::new(5, 0xABCD_u16.into()).encode(buf).unwrap();
        assert_eq!(buf, &[0x00, 0x05, 0xAB, 0xCD]);
    }

    #[test]
    fn set_decode_rejects_malformed_coil() {
        let rsp = SetRequest::decode(&[0x00, 0x05, 0xFF, 0x00], SetValue::Coil(false)).unwrap();
        assert_eq!(rsp.value, SetValue::Coil(true));
        assert_eq!(
            SetRequest::decode(&[0x00, 0x05, 0x00, 0xFF], SetValue::Coil(false))
                .err()
                .unwrap(),
            Error::CoilValue(0x00FF)
        );
        let rsp = SetRequest::decode(&[0x00, 0x05, 0x00, 0xFF], SetValue::Register(0)).unwrap();
        assert_eq!(rsp.value, SetValue::Register(0x00FF));
    }
}
