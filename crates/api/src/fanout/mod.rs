//! Delivery of bus envelopes to connected peers.
//!
//! [`FanoutRouter`] is the only consumer of the event bus that talks to
//! sockets: it serializes each event once and queues the frame for every
//! addressed peer, in publish order.

mod router;

pub use router::FanoutRouter;
