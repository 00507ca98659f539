// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integers with a fixed wire byte order.

use core::{fmt, marker::PhantomData};

pub use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::Error;

/// An unsigned integer that can be stored in an [`Endian`] wrapper.
pub trait Word: Copy + Eq + fmt::Debug + fmt::Display + private::Sealed {
    /// Number of bytes on the wire.
    const SIZE: usize;

    /// Raw storage.
    type Bytes: Copy + Default + AsRef<[u8]> + AsMut<[u8]>;

    /// Read from the first [`Self::SIZE`] bytes of `buf` in order `O`.
    fn read<O: ByteOrder>(buf: &[u8]) -> Self;

    /// Write to the first [`Self::SIZE`] bytes of `buf` in order `O`.
    fn write<O: ByteOrder>(self, buf: &mut [u8]);
}

mod private {
    pub trait Sealed {}
}

macro_rules! impl_word {
    ($ty:ty, $size:literal, $read:ident, $write:ident) => {
        impl private::Sealed for $ty {}

        impl Word for $ty {
            const SIZE: usize = $size;
            type Bytes = [u8; $size];

            fn read<O: ByteOrder>(buf: &[u8]) -> Self {
                O::$read(buf)
            }

            fn write<O: ByteOrder>(self, buf: &mut [u8]) {
                O::$write(buf, self);
            }
        }

        impl<O: ByteOrder> From<Endian<$ty, O>> for $ty {
            fn from(value: Endian<$ty, O>) -> Self {
                value.get()
            }
        }
    };
}

impl_word!(u16, 2, read_u16, write_u16);
impl_word!(u32, 4, read_u32, write_u32);
impl_word!(u64, 8, read_u64, write_u64);

/// A `T` held as its wire bytes in byte order `O`.
///
/// The stored bytes never change their order; only [`Endian::get`]
/// interprets them, so the host byte order has no influence.
pub struct Endian<T: Word, O: ByteOrder> {
    bytes: T::Bytes,
    order: PhantomData<O>,
}

/// Big-endian `u16`, the order of all Modbus register fields.
pub type Be16 = Endian<u16, BigEndian>;
/// Little-endian `u16`, only used for the RTU CRC trailer.
pub type Le16 = Endian<u16, LittleEndian>;
pub type Be32 = Endian<u32, BigEndian>;
pub type Le32 = Endian<u32, LittleEndian>;

impl<T: Word, O: ByteOrder> Endian<T, O> {
    #[must_use]
    pub fn new(value: T) -> Self {
        let mut bytes = T::Bytes::default();
        value.write::<O>(bytes.as_mut());
        Self::from_bytes(bytes)
    }

    /// Wrap bytes that are already in wire order.
    #[must_use]
    pub const fn from_bytes(bytes: T::Bytes) -> Self {
        Self {
            bytes,
            order: PhantomData,
        }
    }

    /// Native value.
    #[must_use]
    pub fn get(self) -> T {
        T::read::<O>(self.bytes.as_ref())
    }

    #[must_use]
    pub fn to_bytes(self) -> T::Bytes {
        self.bytes
    }

    /// Read from the start of `buf`.
    pub fn read(buf: &[u8]) -> Result<Self, Error> {
        let src = buf.get(..T::SIZE).ok_or(Error::BufferSize)?;
        let mut bytes = T::Bytes::default();
        bytes.as_mut().copy_from_slice(src);
        Ok(Self::from_bytes(bytes))
    }

    /// Write to the start of `buf`.
    pub fn write(self, buf: &mut [u8]) -> Result<(), Error> {
        let dst = buf.get_mut(..T::SIZE).ok_or(Error::BufferSize)?;
        dst.copy_from_slice(self.bytes.as_ref());
        Ok(())
    }
}

impl<T: Word, O: ByteOrder> From<T> for Endian<T, O> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Word, O: ByteOrder> Clone for Endian<T, O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Word, O: ByteOrder> Copy for Endian<T, O> {}

impl<T: Word, O: ByteOrder> Default for Endian<T, O> {
    fn default() -> Self {
        Self::from_bytes(T::Bytes::default())
    }
}

impl<T: Word, O: ByteOrder> PartialEq for Endian<T, O> {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl<T: Word, O: ByteOrder> Eq for Endian<T, O> {}

impl<T: Word, O: ByteOrder> PartialEq<T> for Endian<T, O> {
    fn eq(&self, other: &T) -> bool {
        self.get() == *other
    }
}

impl<T: Word, O: ByteOrder> fmt::Debug for Endian<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:02X?})", self.get(), self.bytes.as_ref())
    }
}

impl<T: Word, O: ByteOrder> fmt::Display for Endian<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.get(), f)
    }
}

#[cfg(all(feature = "defmt", target_os = "none"))]
impl<T: Word, O: ByteOrder> defmt::Format for Endian<T, O> {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=[u8]}", self.bytes.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::format;

    #[test]
    fn round_trip_all_u16() {
        for v in 0..=u16::MAX {
            assert_eq!(Be16::new(v).get(), v);
            assert_eq!(Le16::new(v).get(), v);
        }
    }

    #[test]
    fn stored_byte_order() {
        assert_eq!(Be16::new(0x1234).to_bytes(), [0x12, 0x34]);
        assert_eq!(Le16::new(0x1234).to_bytes(), [0x34, 0x12]);
        assert_eq!(Be32::new(0x0102_0304).to_bytes(), [1, 2, 3, 4]);
        assert_eq!(Le32::new(0x0102_0304).to_bytes(), [4, 3, 2, 1]);
    }

    #[test]
    fn equality_compares_values() {
        assert_eq!(Be16::new(7), Be16::from_bytes([0x00, 0x07]));
        assert_ne!(Be16::new(7), Be16::new(0x0700));
        assert_eq!(Le16::new(0xABCD), 0xABCD_u16);
        let v: u16 = Be16::new(42).into();
        assert_eq!(v, 42);
    }

    #[test]
    fn read_and_write_slices() {
        let mut buf = [0u8; 3];
        Be16::new(0xBEEF).write(&mut buf[1..]).unwrap();
        assert_eq!(buf, [0x00, 0xBE, 0xEF]);
        assert_eq!(Be16::read(&buf[1..]).unwrap().get(), 0xBEEF);
        assert_eq!(Be16::read(&buf[2..]).err().unwrap(), Error::BufferSize);
        assert_eq!(
            Le16::new(1).write(&mut buf[..1]).err().unwrap(),
            Error::BufferSize
        );
    }

    #[test]
    fn debug_shows_raw_bytes() {
        assert_eq!(format!("{:?}", Be16::new(0x0102)), "258([01, 02])");
        assert_eq!(format!("{}", Le16::new(0x0102)), "258");
    }
}
