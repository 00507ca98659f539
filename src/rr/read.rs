// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::{fmt, marker::PhantomData};

use super::*;
use crate::frame::{Address, Descriptor, Item, ItemKind, Quantity, ReadRequest, ReadResponse};

#[cfg(feature = "rtu")]
pub type RtuRead<T> = Rr<Rtu, Read<T>>;
#[cfg(feature = "tcp")]
pub type TcpRead<T> = Rr<Tcp, Read<T>>;

/// Read the item `T`.
pub struct Read<T> {
    descriptor: Descriptor,
    item: PhantomData<fn() -> T>,
}

impl<T: Item> Read<T> {
    pub fn new() -> Result<Self> {
        Ok(Self {
            descriptor: T::descriptor()?,
            item: PhantomData,
        })
    }
}

impl<T> Read<T> {
    #[must_use]
    pub const fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }
}

impl<T> Clone for Read<T> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor,
            item: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Read<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Read")
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

impl<T: Item> Operation for Read<T> {
    fn function(&self) -> FunctionCode {
        self.descriptor.function
    }

    fn request_data_len(&self) -> usize {
        ReadRequest::LEN
    }

    fn response_data_len(&self) -> usize {
        ReadResponse::HEADER_LEN + usize::from(self.descriptor.wire_len())
    }

    fn encode_request(&self, data: &mut [u8]) -> Result<()> {
        self.descriptor.read_request().encode(data).map(|_| ())
    }

    fn check_response(&self, exchange: &Exchange<'_>) -> Result<()> {
        check_read(
            self.descriptor.kind,
            &ReadRequest::decode(exchange.request_data)?,
            &ReadResponse::decode(exchange.response_data)?,
            self.descriptor.wire_len(),
        )
    }
}

/// Data-shape check of a read.
///
/// The count implied by the response byte count must match the
/// requested count and the byte count must match the item.
pub fn check_read(
    kind: ItemKind,
    request: &ReadRequest,
    response: &ReadResponse<'_>,
    expected_len: u8,
) -> Result<()> {
    let requested = request.count.get();
    let returned = kind.returned_count(requested, response.len);
    if requested != returned {
        return Err(Error::CountMismatch(requested, returned));
    }
    if response.len != expected_len {
        return Err(Error::ReadLengthMismatch(expected_len, response.len));
    }
    Ok(())
}

impl<E: Encapsulation, T: Item> Rr<E, Read<T>> {
    pub fn new(hdr: impl Into<E::Header>) -> Result<Self> {
        Self::build(hdr.into(), Read::new()?)
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.request_word(0)
    }

    pub fn set_address(&mut self, address: Address) -> Result<()> {
        self.set_request_word(0, address)
    }

    #[must_use]
    pub fn count(&self) -> Quantity {
        self.request_word(2)
    }

    pub fn set_count(&mut self, count: Quantity) -> Result<()> {
        self.set_request_word(2, count)
    }

    /// Byte count field of a received response.
    #[must_use]
    pub fn response_len_field(&self) -> Option<u8> {
        self.response_data().map(|data| data[0])
    }

    /// The item of a validated response.
    #[must_use]
    pub fn payload(&self) -> Option<T> {
        let data = self.validated_response_data()?;
        let start = ReadResponse::HEADER_LEN;
        Some(T::decode(&data[start..start + T::SIZE]))
    }
}
