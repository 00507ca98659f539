// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::{fmt, marker::PhantomData};

use super::*;
use crate::frame::{
    Address, Descriptor, Item, MAX_ITEM_LEN, Quantity, WriteRequest, WriteResponse,
};

#[cfg(feature = "rtu")]
pub type RtuWrite<T> = Rr<Rtu, Write<T>>;
#[cfg(feature = "tcp")]
pub type TcpWrite<T> = Rr<Tcp, Write<T>>;

/// Write the item `T`.
pub struct Write<T> {
    descriptor: Descriptor,
    payload: [u8; MAX_ITEM_LEN],
    item: PhantomData<fn(&T)>,
}

impl<T: Item> Write<T> {
    pub fn new(item: &T) -> Result<Self> {
        let mut write = Self {
            descriptor: T::descriptor()?,
            payload: [0; MAX_ITEM_LEN],
            item: PhantomData,
        };
        item.encode(&mut write.payload[..T::SIZE]);
        Ok(write)
    }

    fn encoded(&self) -> &[u8] {
        &self.payload[..T::SIZE]
    }
}

impl<T> Write<T> {
    #[must_use]
    pub const fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }
}

impl<T> Clone for Write<T> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor,
            payload: self.payload,
            item: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Write<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Write")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl<T: Item> Operation for Write<T> {
    fn function(&self) -> FunctionCode {
        self.descriptor.function
    }

    fn request_data_len(&self) -> usize {
        WriteRequest::HEADER_LEN + usize::from(self.descriptor.wire_len())
    }

    fn response_data_len(&self) -> usize {
        WriteResponse::LEN
    }

    fn encode_request(&self, data: &mut [u8]) -> Result<()> {
        self.descriptor
            .write_request(self.encoded())
            .encode(data)
            .map(|_| ())
    }

    fn check_response(&self, exchange: &Exchange<'_>) -> Result<()> {
        check_write(
            &WriteRequest::decode(exchange.request_data)?,
            &WriteResponse::decode(exchange.response_data)?,
        )
    }
}

/// The server confirms how many units it wrote.
pub fn check_write(request: &WriteRequest<'_>, response: &WriteResponse) -> Result<()> {
    let (requested, written) = (request.count.get(), response.count.get());
    if requested != written {
        return Err(Error::CountMismatch(requested, written));
    }
    Ok(())
}

impl<E: Encapsulation, T: Item> Rr<E, Write<T>> {
    pub fn new(hdr: impl Into<E::Header>, item: &T) -> Result<Self> {
        Self::build(hdr.into(), Write::new(item)?)
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

    /// The item as currently encoded in the request.
    #[must_use]
    pub fn payload(&self) -> T {
        T::decode(self.operation().encoded())
    }

    pub fn set_payload(&mut self, item: &T) -> Result<()> {
        self.edit_request(|op, data| {
            item.encode(&mut op.payload[..T::SIZE]);
            let start = WriteRequest::HEADER_LEN;
            data[start..start + T::SIZE].copy_from_slice(op.encoded());
            Ok(())
        })
    }

    /// Start address echoed by a validated response.
    #[must_use]
    pub fn response_address(&self) -> Option<Address> {
        self.response_word(0)
    }

    /// Count echoed by a validated response.
    #[must_use]
    pub fn response_count(&self) -> Option<Quantity> {
        self.response_word(2)
    }
}
