//! A library for reading and writing osu!'s `.osr` replay format.
//!
//! A replay couples player metadata and scoring statistics with a
//! life-percentage timeline and an LZMA-compressed stream of timestamped
//! input frames. [`decode`] turns raw bytes into a [`Replay`]; [`encode`]
//! is the exact mirror:
//!
//! ```
//! use osr::{Replay, ReplayFrame};
//!
//! let mut replay = Replay::default();
//! replay.player_name = "fern".to_owned();
//! replay.frames.push(ReplayFrame { delta: 16, x: 256.0, y: 192.0, keys: 1 });
//!
//! let bytes = osr::encode(&replay).unwrap();
//! assert_eq!(osr::decode(&bytes).unwrap(), replay);
//! ```
//!
//! The codec is pure: it never touches the filesystem, holds no state
//! between calls, and decoding many replays in parallel needs no
//! coordination. Reading the source bytes and writing the destination
//! bytes are the caller's job.
//!
//! The legacy textual frame format prints integral floats without a
//! fractional part, so coordinates like `256.0` survive a round trip while
//! the distinction between `256` and `256.0` does not. Likewise, the
//! auto-play skip-offset correction applied while decoding on-disk replays
//! is one-way; see [`MOD_AUTOPLAY`].

mod binary;
mod decode;
mod encode;
mod errors;
mod format;
mod frames;

pub use binary::{Reader, Writer};
pub use decode::decode;
pub use encode::encode;
pub use errors::OsrError;
pub use format::{
    LifeBarEntry, Replay, ReplayFrame, MOD_AUTOPLAY, MOD_TARGET_PRACTICE, VERSION_MANIA_SEED,
    VERSION_SCORE_ID_I32, VERSION_SCORE_ID_I64,
};
