// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU

use super::*;
use crate::endian::Le16;

pub use crate::frame::rtu::*;

// [MODBUS over Serial Line Specification and Implementation Guide V1.02](http://modbus.org/docs/Modbus_over_serial_line_V1_02.pdf), page 13
// "The maximum size of a MODBUS RTU frame is 256 bytes."
pub const MAX_FRAME_LEN: usize = 256;

/// Modbus RTU encapsulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rtu;

impl Encapsulation for Rtu {
    type Header = Header;

    const HEADER_LEN: usize = 0;
    const TRAILER_LEN: usize = 2;

    fn unit(hdr: &Header) -> UnitId {
        hdr.slave
    }

    fn seal(_: &Header, adu: &mut [u8]) -> Result<()> {
        Self::reseal(adu)
    }

    fn reseal(adu: &mut [u8]) -> Result<()> {
        let crc = crc16(pdu::<Self>(adu)?);
        let trailer = adu.len() - Self::TRAILER_LEN;
        Le16::new(crc).write(&mut adu[trailer..])
    }

    fn check_envelope(_: &[u8], response: &[u8]) -> Result<()> {
        let pdu = pdu::<Self>(response)?;
        let received = Le16::read(&response[pdu.len()..])?.get();
        let calculated = crc16(pdu);
        if received != calculated {
            return Err(Error::CrcMismatch(received, calculated));
        }
        Ok(())
    }
}

/// Calculate the CRC (Cyclic Redundancy Check) sum.
///
/// The result is the register value; on the wire it is sent low byte
/// first.
#[must_use]
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = 0xFFFF;
    for x in data {
        crc ^= u16::from(*x);
        for _ in 0..8 {
            // if we followed clippy's suggestion to move out the crc >>= 1, the condition may not be met any more
            // the recommended action therefore makes no sense and it is better to allow this lint
            #[allow(clippy::branches_sharing_code)]
            if (crc & 0x0001) != 0 {
                crc >>= 1;
                crc ^= 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// An extracted RTU PDU frame.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame<'a> {
    pub slave: SlaveId,
    pub function: FunctionCode,
    pub data: &'a [u8],
}

/// Encode a complete RTU ADU.
pub fn encode_adu(hdr: Header, fn_code: u8, data: &[u8], buf: &mut [u8]) -> Result<usize> {
    super::encode_adu::<Rtu>(&hdr, fn_code, data, buf)
}

/// Decode a complete RTU ADU and verify its CRC.
pub fn decode_adu(buf: &[u8]) -> Result<DecodedFrame<'_>> {
    Rtu::check_envelope(&[], buf)?;
    let pdu = pdu::<Rtu>(buf)?;
    Ok(DecodedFrame {
        slave: pdu[0],
        function: FunctionCode::new(pdu[1]),
        data: &pdu[PDU_HEADER_LEN..],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_crc16() {
        let msg = &[0x01, 0x03, 0x08, 0x2B, 0x00, 0x02];
        assert_eq!(crc16(msg), 0x63B6);

        let msg = &[0x01, 0x03, 0x04, 0x00, 0x20, 0x00, 0x00];
        assert_eq!(crc16(msg), 0xF9FB);

        // read two holding registers at address 0 from unit 1
        let msg = &[0x01, 0x03, 0x00, 0x00, 0x00, 0x02];
        assert_eq!(crc16(msg), 0x0BC4);
    }

    #[test]
    fn crc_is_sent_low_byte_first() {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let sz = encode_adu(Header { slave: 0x01 }, 0x03, &[0x00, 0x00, 0x00, 0x02], &mut buf)
            .unwrap();
        assert_eq!(
            &buf[..sz],
            &[0x01, 0x03, 0x00, 0x00, 0x00, 0x02, 0xC4, 0x0B]
        );
    }

    #[test]
    fn encode_write_single_coil_adu() {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let sz = encode_adu(Header { slave: 0x01 }, 0x05, &[0x00, 0x05, 0xFF, 0x00], &mut buf)
            .unwrap();
        assert_eq!(
            &buf[..sz],
            &[
                0x01, // slave address
                0x05, // function code
                0x00, // addr
                0x05, // addr
                0xFF, // value
                0x00, // value
                0x9C, // crc
                0x3B, // crc
            ]
        );
    }

    #[test]
    fn decode_rtu_response() {
        let buf = &[0x01, 0x03, 0x04, 0x00, 0x20, 0x00, 0x00, 0xFB, 0xF9];
        let DecodedFrame {
            slave,
            function,
            data,
        } = decode_adu(buf).unwrap();
        assert_eq!(slave, 0x01);
        assert_eq!(function, FunctionCode::ReadHoldingRegisters);
        assert_eq!(data, &[0x04, 0x00, 0x20, 0x00, 0x00]);
    }

    #[test]
    fn decode_bad_crc() {
        let buf = &[0x01, 0x03, 0x04, 0x00, 0x20, 0x00, 0x00, 0xF9, 0xFB];
        assert_eq!(
            decode_adu(buf).err().unwrap(),
            Error::CrcMismatch(0xFBF9, 0xF9FB)
        );
        assert_eq!(decode_adu(&buf[..3]).err().unwrap(), Error::BufferSize);
    }
}
