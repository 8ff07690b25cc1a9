//! Log-buffer scanning: frame layout, buffer descriptors, and the scanner.
//!
//! A log buffer is an append-only sequence of aligned frames written by one
//! producer. The producer publishes each frame by storing its length with
//! release semantics, then advances a tail counter in a small companion
//! state buffer. The [`LogScanner`] is the reading side: a cursor that
//! trails the tail and hands the consumer contiguous byte ranges of whole
//! frames, an MTU's worth at a time.
//!
//! # Publication Handshake
//!
//! ```text
//! producer                               scanner
//! --------                               -------
//! write frame body and type
//! store length   (release)  ──────▶  spin on length (acquire)
//! store tail     (release)  ──────▶  load tail      (acquire)
//! ```
//!
//! There are no locks and no signalling in either direction; the scanner's
//! only wait is a spin on the length field of a frame the tail has already
//! covered.

pub mod descriptor;
pub mod frame;
mod scanner;

pub use descriptor::LogBufferError;
pub use scanner::{LogScanner, SeekError};
