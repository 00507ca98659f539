// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::*;
use crate::frame::{Address, SetRequest, SetValue};

#[cfg(feature = "rtu")]
pub type RtuSet = Rr<Rtu, Set>;
#[cfg(feature = "tcp")]
pub type TcpSet = Rr<Tcp, Set>;

/// Write a single register or coil.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Set {
    function: FunctionCode,
    request: SetRequest,
}

impl Set {
    pub fn new(function: FunctionCode, address: Address, value: impl Into<SetValue>) -> Self {
        Self {
            function,
            request: SetRequest::new(address, value.into()),
        }
    }

    #[must_use]
    pub const fn request(&self) -> &SetRequest {
        &self.request
    }
}

impl Operation for Set {
    fn function(&self) -> FunctionCode {
        self.function
    }

    fn request_data_len(&self) -> usize {
        SetRequest::LEN
    }

    fn response_data_len(&self) -> usize {
        SetRequest::LEN
    }

    fn encode_request(&self, data: &mut [u8]) -> Result<()> {
        self.request.encode(data).map(|_| ())
    }

    fn check_response(&self, exchange: &Exchange<'_>) -> Result<()> {
        check_set(exchange.request, exchange.response)
    }
}

/// A single write is answered with an exact echo of the request ADU,
/// framing included.
pub fn check_set(request: &[u8], response: &[u8]) -> Result<()> {
    if request != response {
        return Err(Error::EchoMismatch);
    }
    Ok(())
}

impl<E: Encapsulation> Rr<E, Set> {
    pub fn new(
        hdr: impl Into<E::Header>,
        function: FunctionCode,
        address: Address,
        value: impl Into<SetValue>,
    ) -> Result<Self> {
        Self::build(hdr.into(), Set::new(function, address, value))
    }

    /// Switch a single coil.
    pub fn coil(hdr: impl Into<E::Header>, address: Address, on: bool) -> Result<Self> {
        Self::new(hdr, FunctionCode::WriteSingleCoil, address, on)
    }

    /// Write a single holding register.
    pub fn register(hdr: impl Into<E::Header>, address: Address, value: u16) -> Result<Self> {
        Self::new(hdr, FunctionCode::WriteSingleRegister, address, value)
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.request_word(0)
    }

    pub fn set_address(&mut self, address: Address) -> Result<()> {
        self.edit_request(|op, data| {
            op.request.address = address.into();
            op.request.encode(data).map(|_| ())
        })
    }

    #[must_use]
    pub fn value(&self) -> SetValue {
        self.operation().request.value
    }

    /// The coil or register kind of the session is fixed; `value` is
    /// interpreted accordingly.
    pub fn set_value(&mut self, value: impl Into<SetValue>) -> Result<()> {
        let raw = value.into().to_raw();
        self.edit_request(|op, data| {
            op.request.value = op.request.value.decode_like(raw)?;
            op.request.encode(data).map(|_| ())
        })
    }

    /// The raw 16 bit value field of the request.
    #[must_use]
    pub fn raw_value(&self) -> u16 {
        self.request_word(2)
    }

    /// The value echoed by the server.
    pub fn response_value(&self) -> Result<SetValue> {
        let data = self.response_data().ok_or(Error::NoResponse)?;
        SetRequest::decode(data, self.value()).map(|rsp| rsp.value)
    }
}

#[cfg(all(test, feature = "tcp", feature = "rtu"))]
mod tests {
    use super::*;
    use crate::codec::{rtu, tcp};

    #[test]
    fn tcp_coil_request() {
        let rr = TcpSet::coil(tcp::Header::new(1), 5, true).unwrap();
        assert_eq!(
            rr.request_bytes(),
            &[
                0x00, // transaction id
                0x00, // transaction id
                0x00, // protocol id
                0x00, // protocol id
                0x00, // length
                0x06, // length
                0x01, // unit id
                0x05, // function code
                0x00, // addr
                0x05, // addr
                0xFF, // value
                0x00, // value
            ]
        );
        assert_eq!(rr.value(), SetValue::Coil(true));
        assert_eq!(rr.raw_value(), 0xFF00);
        assert_eq!(rr.response_len(), 12);
    }

    #[test]
    fn tcp_echo_is_valid() {
        let mut rr = TcpSet::register(tcp::Header::new(3).with_transaction_id(42), 0x0100, 0xBEEF)
            .unwrap();
        let echo = *<&[u8; 12]>::try_from(rr.request_bytes()).unwrap();
        rr.fill_response(&echo).unwrap();
        assert_eq!(rr.response_value(), Ok(SetValue::Register(0xBEEF)));
        assert!(rr.validate_response().is_ok());
    }

    #[test]
    fn tcp_echo_mismatch() {
        for i in 0..12 {
            let mut rr = TcpSet::register(tcp::Header::new(1), 0x0100, 0xBEEF).unwrap();
            let mut echo = *<&[u8; 12]>::try_from(rr.request_bytes()).unwrap();
            echo[i] ^= 0x01;
            rr.fill_response(&echo).unwrap();
            let err = rr.validate_response().err().unwrap();
            match i {
                0 => assert_eq!(err, Error::TransactionIdMismatch(0x0000, 0x0100)),
                1 => assert_eq!(err, Error::TransactionIdMismatch(0x0000, 0x0001)),
                4 => assert_eq!(err, Error::LengthMismatch(0x0106, 6)),
                5 => assert_eq!(err, Error::LengthMismatch(0x0007, 6)),
                6 => assert_eq!(err, Error::ChannelMismatch(0x01, 0x00)),
                7 => assert_eq!(err, Error::FunctionMismatch(0x06, 0x07)),
                // protocol id and data
                _ => assert_eq!(err, Error::EchoMismatch),
            }
        }
    }

    #[test]
    fn tcp_protocol_id_must_be_echoed() {
        let mut rr = TcpSet::coil(tcp::Header::new(1), 5, true).unwrap();
        let mut echo = *<&[u8; 12]>::try_from(rr.request_bytes()).unwrap();
        echo[3] ^= 0x01;
        rr.fill_response(&echo).unwrap();
        assert_eq!(rr.validate_response().err().unwrap(), Error::EchoMismatch);
    }

    #[test]
    fn rtu_echo_mismatch() {
        let valid = [0x01, 0x05, 0x00, 0x05, 0xFF, 0x00, 0x9C, 0x3B];
        for i in 0..valid.len() {
            let mut rr = RtuSet::coil(rtu::Header { slave: 1 }, 5, true).unwrap();
            let mut echo = valid;
            echo[i] ^= 0x01;
            rr.fill_response(&echo).unwrap();
            assert!(matches!(
                rr.validate_response(),
                Err(Error::CrcMismatch(_, _))
            ));
        }
    }

    #[test]
    fn check_set_compares_whole_frames() {
        let request = [0x00, 0x00, 0x00, 0x00, 0x00, 0x06, 0x01, 0x05, 0x00, 0x05, 0xFF, 0x00];
        assert!(check_set(&request, &request).is_ok());
        let mut response = request;
        response[2] = 0x01;
        assert_eq!(check_set(&request, &response), Err(Error::EchoMismatch));
        assert_eq!(check_set(&request, &request[..11]), Err(Error::EchoMismatch));
    }

    #[test]
    fn malformed_coil_echo() {
        let mut rr = TcpSet::coil(tcp::Header::new(1), 5, true).unwrap();
        let mut echo = *<&[u8; 12]>::try_from(rr.request_bytes()).unwrap();
        echo[10] = 0x12;
        echo[11] = 0x34;
        rr.fill_response(&echo).unwrap();
        assert_eq!(rr.response_value(), Err(Error::CoilValue(0x1234)));
        assert_eq!(rr.validate_response().err().unwrap(), Error::EchoMismatch);
    }

    #[test]
    fn response_value_requires_response() {
        let rr = TcpSet::coil(tcp::Header::new(1), 5, false).unwrap();
        assert_eq!(rr.response_value(), Err(Error::NoResponse));
    }

    #[test]
    fn change_request_before_sending() {
        let mut rr = TcpSet::coil(tcp::Header::new(1), 5, true).unwrap();
        rr.set_address(0x0A00).unwrap();
        rr.set_value(false).unwrap();
        assert_eq!(rr.address(), 0x0A00);
        assert_eq!(rr.value(), SetValue::Coil(false));
        assert_eq!(&rr.request_bytes()[8..], &[0x0A, 0x00, 0x00, 0x00]);

        assert_eq!(rr.set_value(0x1234_u16).err().unwrap(), Error::CoilValue(0x1234));
        assert_eq!(rr.set_value(0xFF00_u16), Ok(()));
        assert_eq!(rr.value(), SetValue::Coil(true));

        let mut rr = TcpSet::register(tcp::Header::new(1), 5, 1).unwrap();
        rr.set_value(0x00FF_u16).unwrap();
        assert_eq!(rr.value(), SetValue::Register(0x00FF));
        assert_eq!(rr.raw_value(), 0x00FF);
    }

    #[test]
    fn rtu_coil_echo() {
        let mut rr = RtuSet::coil(rtu::Header { slave: 1 }, 5, true).unwrap();
        assert_eq!(
            rr.request_bytes(),
            &[0x01, 0x05, 0x00, 0x05, 0xFF, 0x00, 0x9C, 0x3B]
        );
        rr.fill_response(&[0x01, 0x05, 0x00, 0x05, 0xFF, 0x00, 0x9C, 0x3B])
            .unwrap();
        assert!(rr.validate_response().is_ok());

        let mut rr = RtuSet::coil(rtu::Header { slave: 1 }, 5, true).unwrap();
        let mut buf = [0; MAX_ADU_LEN];
        let len = rtu::encode_adu(rtu::Header { slave: 1 }, 0x05, &[0x00, 0x05, 0x00, 0x00], &mut buf)
            .unwrap();
        rr.fill_response(&buf[..len]).unwrap();
        assert_eq!(rr.response_value(), Ok(SetValue::Coil(false)));
        assert_eq!(rr.validate_response().err().unwrap(), Error::EchoMismatch);
    }

    #[test]
    fn rtu_set_address_refreshes_crc() {
        let mut rr = RtuSet::coil(rtu::Header { slave: 1 }, 0, true).unwrap();
        rr.set_address(5).unwrap();
        assert_eq!(rr.crc(), 0x3B9C);
        rr.fill_response(&[0x01, 0x05, 0x00, 0x05, 0xFF, 0x00, 0x9C, 0x3B])
            .unwrap();
        assert_eq!(rr.set_address(6).err().unwrap(), Error::Sealed);
        assert!(rr.validate_response().is_ok());
    }
}
