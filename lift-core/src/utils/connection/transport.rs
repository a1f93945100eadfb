//! Datagram transport seam between the scheduler and the network stack.
//!
//! The scheduler never blocks on the network: it asks for at most one pending
//! datagram per cycle and fires confirmations without waiting for delivery.

/// Metadata for a datagram copied into the caller's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Received<E> {
    /// Bytes written to the receive buffer.
    pub len: usize,
    /// Sender of the datagram.
    pub from: E,
    /// The datagram did not fit the buffer and was cut short.
    pub truncated: bool,
}

/// Fault that leaves the transport unusable.
///
/// There is no in-place recovery for these: the owner of the loop restarts the
/// whole process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFault {
    /// The network link dropped underneath the socket.
    LinkDown,
}

/// Non-blocking datagram source and sink.
pub trait DatagramTransport {
    /// Sender address type.
    type Endpoint: Copy + core::fmt::Debug;

    /// Copy one pending datagram into `buf`, or return `Ok(None)` immediately
    /// when nothing is queued.
    fn poll_recv(
        &mut self,
        buf: &mut [u8],
    ) -> Result<Option<Received<Self::Endpoint>>, TransportFault>;

    /// Best-effort send. Delivery failures are the transport's to log.
    fn send_to(
        &mut self,
        payload: &[u8],
        to: Self::Endpoint,
    );

    /// Number of peers currently attached to the link, for the status surface.
    /// `None` when the platform cannot tell.
    fn station_count(&self) -> Option<u16>;
}
