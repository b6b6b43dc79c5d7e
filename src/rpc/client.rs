//! Link client: the control-core side of the cross-core protocol.
//!
//! Implements [`PortBank`] on top of any [`Transport`]. Each call encodes one
//! request, writes it, reads back exactly one response and checks its
//! return code. There is no retry; a missing response is `LinkError::Timeout`
//! and the caller skips that pin for the tick.

use heapless::Vec;
use log::warn;

use crate::app::ports::PortBank;
use crate::error::{LinkError, Result};
use crate::pins::MAX_PINS;
use crate::port::{CounterConfig, DriveConfig};

use super::codec::{self, MAX_MESSAGE_SIZE, Request};
use super::transport::Transport;

pub struct LinkClient<T: Transport> {
    transport: T,
    tx: [u8; MAX_MESSAGE_SIZE],
    rx: [u8; MAX_MESSAGE_SIZE],
}

impl<T: Transport> LinkClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            tx: [0; MAX_MESSAGE_SIZE],
            rx: [0; MAX_MESSAGE_SIZE],
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// One request/response round trip. Returns the response body.
    fn transact(&mut self, request: &Request) -> Result<&[u8]> {
        let len = codec::encode_request(request, &mut self.tx).ok_or(LinkError::BadLength)?;

        let written = self.transport.write(&self.tx[..len]).map_err(|e| {
            warn!("link write failed: {:?}", e);
            LinkError::Transport
        })?;
        if written != len {
            return Err(LinkError::Transport.into());
        }
        self.transport.flush().map_err(|e| {
            warn!("link flush failed: {:?}", e);
            LinkError::Transport
        })?;

        let n = self.transport.read(&mut self.rx).map_err(|e| {
            warn!("link read failed: {:?}", e);
            LinkError::Transport
        })?;
        if n == 0 {
            return Err(LinkError::Timeout.into());
        }

        let body = codec::decode_response(&self.rx[..n]).inspect_err(|e| {
            warn!("link request {:?} failed: {}", request.code(), e);
        })?;
        Ok(body)
    }

    fn expect_empty(&mut self, request: &Request) -> Result<()> {
        self.transact(request).map(|_| ())
    }
}

impl<T: Transport> PortBank for LinkClient<T> {
    fn configure_counter(&mut self, pin: u32, config: &CounterConfig) -> Result<()> {
        self.expect_empty(&Request::SetConfig { pin, config: *config })
    }

    fn reset_count(&mut self, pin: u32, init: u32) -> Result<()> {
        self.expect_empty(&Request::ResetCount { pin, init })
    }

    fn read_count(&mut self, pin: u32) -> Result<u32> {
        let body = self.transact(&Request::ReadCount { pin })?;
        Ok(codec::body_value(body)?)
    }

    fn read_on_time(&mut self, pin: u32) -> Result<u32> {
        let body = self.transact(&Request::ReadOnTime { pin })?;
        Ok(codec::body_value(body)?)
    }

    fn read_level(&mut self, pin: u32) -> Result<bool> {
        let body = self.transact(&Request::ReadPinLevel { pin })?;
        let levels = codec::body_levels(body)?;
        match levels.as_slice() {
            [level] => Ok(*level),
            _ => Err(LinkError::BadLength.into()),
        }
    }

    fn read_levels(&mut self) -> Result<Vec<bool, MAX_PINS>> {
        let body = self.transact(&Request::ReadAllLevels)?;
        Ok(codec::body_levels(body)?)
    }

    fn write_level(&mut self, pin: u32, level: bool) -> Result<()> {
        self.expect_empty(&Request::WritePinLevel { pin, level })
    }

    fn configure_output(&mut self, pin: u32, config: &DriveConfig) -> Result<()> {
        self.expect_empty(&Request::SetOutputConfig { pin, config: *config })
    }

    fn read_version(&mut self) -> Result<String> {
        let body = self.transact(&Request::ReadVersion)?;
        Ok(codec::body_version(body)?.into())
    }
}
