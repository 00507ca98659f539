// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::*;
use crate::util::{packed_coils_len, registers_len};

/// Whether an item is transferred as 16 bit registers or as packed bits.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// The count is derived from the byte size.
    Registers,
    /// `count` bits packed into `ceil(count / 8)` bytes.
    Bits { count: Quantity },
}

impl ItemKind {
    /// Number of bytes on the wire for `count` units.
    #[must_use]
    pub const fn wire_len(self, count: Quantity) -> usize {
        match self {
            Self::Registers => count as usize * 2,
            Self::Bits { .. } => packed_coils_len(count as usize),
        }
    }

    /// The item count a response with byte count `len` carries.
    ///
    /// Packed bits are padded to whole bytes, so any count that needs
    /// exactly `len` bytes is accepted as `requested`.
    #[must_use]
    pub const fn returned_count(self, requested: Quantity, len: u8) -> Quantity {
        match self {
            Self::Registers => (len as u16).div_ceil(2),
            Self::Bits { .. } => {
                if packed_coils_len(requested as usize) == len as usize {
                    requested
                } else {
                    len as u16 * 8
                }
            }
        }
    }
}

/// Static wire metadata of an [`Item`].
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub function: FunctionCode,
    pub address: Address,
    pub count: Quantity,
    /// Byte size of the item.
    pub encoded_len: u8,
    pub kind: ItemKind,
}

impl Descriptor {
    pub const fn new(
        function: FunctionCode,
        address: Address,
        kind: ItemKind,
        size: usize,
    ) -> Result<Self, Error> {
        match kind {
            ItemKind::Registers => Self::registers(function, address, size),
            ItemKind::Bits { count } => Self::bits(function, address, count, size),
        }
    }

    /// Register item of `size` bytes.
    ///
    /// An odd size occupies one more byte on the wire.
    pub const fn registers(
        function: FunctionCode,
        address: Address,
        size: usize,
    ) -> Result<Self, Error> {
        let count = registers_len(size);
        if size == 0 || count * 2 > MAX_ITEM_LEN {
            return Err(Error::DescriptorConfiguration {
                count: if count > u16::MAX as usize {
                    u16::MAX
                } else {
                    count as u16
                },
                size,
            });
        }
        Ok(Self {
            function,
            address,
            count: count as u16,
            encoded_len: size as u8,
            kind: ItemKind::Registers,
        })
    }

    /// Bit item of `count` bits that must occupy exactly `size` bytes.
    pub const fn bits(
        function: FunctionCode,
        address: Address,
        count: Quantity,
        size: usize,
    ) -> Result<Self, Error> {
        if count == 0 || size > MAX_ITEM_LEN || packed_coils_len(count as usize) != size {
            return Err(Error::DescriptorConfiguration { count, size });
        }
        Ok(Self {
            function,
            address,
            count,
            encoded_len: size as u8,
            kind: ItemKind::Bits { count },
        })
    }

    /// Byte count on the wire, including register padding.
    #[must_use]
    pub const fn wire_len(&self) -> u8 {
        self.kind.wire_len(self.count) as u8
    }

    #[must_use]
    pub fn read_request(&self) -> ReadRequest {
        ReadRequest::new(self.address, self.count)
    }

    /// `payload` holds the encoded item; padding is added on encoding.
    #[must_use]
    pub fn write_request<'p>(&self, payload: &'p [u8]) -> WriteRequest<'p> {
        WriteRequest {
            address: self.address.into(),
            count: self.count.into(),
            len: self.wire_len(),
            payload,
        }
    }
}

/// A logical payload with a fixed location and size on a Modbus server.
///
/// The crate sizes and places the bytes; the implementor decides what
/// they mean.
///
/// ```
/// use modbus_rr::{FunctionCode, Item, ItemKind};
///
/// struct Voltage(u32);
///
/// impl Item for Voltage {
///     const FUNCTION: FunctionCode = FunctionCode::ReadHoldingRegisters;
///     const ADDRESS: u16 = 0x0100;
///     const KIND: ItemKind = ItemKind::Registers;
///     const SIZE: usize = 4;
///
///     fn encode(&self, buf: &mut [u8]) {
///         buf.copy_from_slice(&self.0.to_be_bytes());
///     }
///
///     fn decode(buf: &[u8]) -> Self {
///         Self(u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]))
///     }
/// }
///
/// let descriptor = Voltage::descriptor().unwrap();
/// assert_eq!(descriptor.count, 2);
/// ```
pub trait Item: Sized {
    const FUNCTION: FunctionCode;
    const ADDRESS: Address;
    const KIND: ItemKind;
    /// Byte size of the encoded item.
    const SIZE: usize;

    const DESCRIPTOR: Result<Descriptor, Error> =
        Descriptor::new(Self::FUNCTION, Self::ADDRESS, Self::KIND, Self::SIZE);

    /// `buf` is exactly [`Self::SIZE`] bytes long.
    fn encode(&self, buf: &mut [u8]);

    /// `buf` is exactly [`Self::SIZE`] bytes long.
    fn decode(buf: &[u8]) -> Self;

    fn descriptor() -> Result<Descriptor, Error> {
        Self::DESCRIPTOR
    }
}
