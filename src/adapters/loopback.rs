//! In-process link transport.
//!
//! Wires a [`LinkClient`](crate::rpc::client::LinkClient) straight to an
//! owned [`RtCore`]: every `write` is served immediately through
//! [`engine::serve`](crate::rpc::engine::serve) and the response is held
//! until the next `read`. Used by host builds and tests where both cores
//! live in one process; the caller drives `RtCore::tick` itself.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::drivers::rt_core::RtCore;
use crate::rpc::codec::MAX_MESSAGE_SIZE;
use crate::rpc::engine;
use crate::rpc::transport::Transport;

pub struct LoopbackTransport<I, O> {
    core: RtCore<I, O>,
    response: [u8; MAX_MESSAGE_SIZE],
    pending: usize,
}

impl<I: InputPin, O: OutputPin> LoopbackTransport<I, O> {
    pub fn new(core: RtCore<I, O>) -> Self {
        Self {
            core,
            response: [0; MAX_MESSAGE_SIZE],
            pending: 0,
        }
    }

    pub fn core(&self) -> &RtCore<I, O> {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut RtCore<I, O> {
        &mut self.core
    }
}

impl<I: InputPin, O: OutputPin> Transport for LoopbackTransport<I, O> {
    type Error = ();

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        let n = self.pending;
        if n == 0 {
            return Ok(0);
        }
        buf.get_mut(..n).ok_or(())?.copy_from_slice(&self.response[..n]);
        self.pending = 0;
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        self.pending = engine::serve(&mut self.core, data, &mut self.response);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }

    fn available(&self) -> bool {
        self.pending > 0
    }
}
