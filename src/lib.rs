// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

#![doc = include_str!("../README.md")]
#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

mod codec;
mod endian;
mod error;
mod frame;
mod rr;
mod util;

#[cfg(feature = "rtu")]
pub use codec::rtu;
#[cfg(feature = "tcp")]
pub use codec::tcp;
pub use codec::{Encapsulation, function_code, unit_id};
pub use endian::*;
pub use error::*;
pub use frame::*;
pub use rr::*;
pub use util::{bool_to_u16_coil, packed_coils_len, u16_coil_to_bool};
