//! DDP (Distributed Display Protocol) frame streaming over UDP.
//!
//! A frame is `led_count * 3` RGB bytes. It is cut into fragments of at most
//! 1242 bytes, each prefixed with a 10-byte header carrying its offset and
//! length, and sent as an independent datagram. The last fragment sets the
//! push flag. Nothing is acknowledged; loss and reordering are accepted.

pub mod animation;
pub mod fragment;
pub mod sender;

pub use animation::{solid_frame, Animator, RedRamp};
pub use fragment::{encode_fragment, fragment, FragmentHeader, Fragments, DDP_PORT};
pub use sender::{DatagramSink, DdpSender, FrameReport, UdpTarget};
