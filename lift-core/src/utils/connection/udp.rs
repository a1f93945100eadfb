//! UDP transport over `embassy-net`.
//!
//! Receives are polled with a no-op waker so a cycle never suspends on the
//! socket; the executor gets its turn in the scheduler's idle sleep.

use core::task::{Context, Poll, Waker};

use embassy_net::{
    udp::{BindError, PacketMetadata, UdpSocket},
    IpEndpoint, Stack,
};

use super::transport::{DatagramTransport, Received, TransportFault};

/// Packet metadata slots per direction.
pub const META_SLOTS: usize = 4;
/// Socket buffer size per direction.
pub const SOCKET_BUFFER: usize = 512;

/// Command socket bound to the lift's UDP port.
pub struct UdpTransport<'a> {
    stack: Stack<'a>,
    socket: UdpSocket<'a>,
    stations: Option<fn() -> u16>,
}

impl<'a> UdpTransport<'a> {
    /// Bind a UDP socket on `port` using caller-provided buffers.
    pub fn bind(
        stack: Stack<'a>,
        port: u16,
        rx_meta: &'a mut [PacketMetadata],
        rx_buffer: &'a mut [u8],
        tx_meta: &'a mut [PacketMetadata],
        tx_buffer: &'a mut [u8],
    ) -> Result<Self, BindError> {
        let mut socket = UdpSocket::new(stack, rx_meta, rx_buffer, tx_meta, tx_buffer);
        socket.bind(port)?;
        tracing::info!(port, "UDP command socket bound");
        Ok(Self {
            stack,
            socket,
            stations: None,
        })
    }

    /// Report attached stations through `count`, typically the access point
    /// driver's station list. Without one the count is unknown.
    pub fn with_station_counter(
        mut self,
        count: fn() -> u16,
    ) -> Self {
        self.stations = Some(count);
        self
    }
}

impl DatagramTransport for UdpTransport<'_> {
    type Endpoint = IpEndpoint;

    fn poll_recv(
        &mut self,
        buf: &mut [u8],
    ) -> Result<Option<Received<IpEndpoint>>, TransportFault> {
        if !self.stack.is_link_up() {
            return Err(TransportFault::LinkDown);
        }

        let mut cx = Context::from_waker(Waker::noop());
        match self.socket.poll_recv_from(buf, &mut cx) {
            Poll::Pending => Ok(None),
            Poll::Ready(Ok((len, meta))) => Ok(Some(Received {
                len,
                from: meta.endpoint,
                truncated: false,
            })),
            Poll::Ready(Err(error)) => {
                // truncated payloads are discarded by smoltcp, sender unknown
                tracing::warn!(?error, "dropping oversized datagram");
                Ok(None)
            }
        }
    }

    fn send_to(
        &mut self,
        payload: &[u8],
        to: IpEndpoint,
    ) {
        let mut cx = Context::from_waker(Waker::noop());
        match self.socket.poll_send_to(payload, to, &mut cx) {
            Poll::Ready(Ok(())) => {}
            Poll::Ready(Err(error)) => tracing::warn!(?error, %to, "reply not sent"),
            Poll::Pending => tracing::warn!(%to, "send buffer full, reply dropped"),
        }
    }

    fn station_count(&self) -> Option<u16> {
        self.stations.map(|count| count())
    }
}
