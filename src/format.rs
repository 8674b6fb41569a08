//! Information and structures for `.osr` replay files.
//!
//! A replay is a single little-endian byte stream with three regions: a
//! fixed header, a compressed action stream, and a version/modifier-gated
//! trailer.
//!
//! | Field | Type | Condition |
//! | ----- | ---- | --------- |
//! | mode | u8 | always |
//! | version | i32 | always |
//! | map_md5, player_name, replay_md5 | string | always |
//! | n300, n100, n50, ngeki, nkatu, nmiss | u16 ×6 | always |
//! | score | i32 | always |
//! | max_combo | u16 | always |
//! | perfect | u8 (0/1) | always |
//! | mods | i32 | always |
//! | life_bar | string | always |
//! | timestamp | i64 | always |
//! | action block length | i32 | always |
//! | action block | raw bytes (LZMA) | always |
//! | score_id | i64 | version ≥ 20140721 |
//! | score_id | i32 | 20121008 ≤ version < 20140721 |
//! | target_stats | f64 | mods bit 23 set |
//!
//! Strings use a one-byte marker: `0x00` for the empty string, or `0x0b`
//! followed by a ULEB128 byte length and UTF-8 payload.
//!
//! The action block is an LZMA-alone container (no size framing) around
//! ASCII text: comma-separated actions of `|`-separated fields, with a
//! trailing comma. The first action is a fixed sentinel, the second carries
//! the intro skip offset, and — from version 20130319 on — the last carries
//! the mania randomization seed. Everything in between is one
//! `delta|x|y|keys` input frame per action.

use std::fmt;

/// Modifier bitmask bit for auto-play. Gates the decode-time skip-offset
/// correction.
pub const MOD_AUTOPLAY: i32 = 1 << 11;

/// Modifier bitmask bit for target practice. Gates the trailing `f64`
/// statistic.
pub const MOD_TARGET_PRACTICE: i32 = 1 << 23;

/// First client version that stores the score id trailer as an `i32`.
pub const VERSION_SCORE_ID_I32: i32 = 2012_10_08;

/// First client version that carries the mania seed in the action stream.
pub const VERSION_MANIA_SEED: i32 = 2013_03_19;

/// First client version that widens the score id trailer to an `i64`.
pub const VERSION_SCORE_ID_I64: i32 = 2014_07_21;

/// One timestamped cursor/key-state sample.
///
/// `delta` is the time since the previous frame in milliseconds. Frame
/// order is chronological and significant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayFrame {
    pub delta: i64,
    pub x: f32,
    pub y: f32,
    pub keys: u32,
}

/// One point of the life-percentage timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifeBarEntry {
    /// Elapsed time in milliseconds.
    pub time: i32,
    /// Life fraction in `[0, 1]`.
    pub life: f32,
}

/// A fully decoded replay.
///
/// A `Replay` is either produced whole by [`decode`](crate::decode) or
/// assembled field-by-field before [`encode`](crate::encode); there is no
/// partially-valid intermediate state. The presence of [`seed`],
/// [`score_id`] width, and [`target_stats`] is a strict function of
/// [`version`] and [`mods`], enforced identically by both directions.
///
/// [`seed`]: Replay::seed
/// [`score_id`]: Replay::score_id
/// [`target_stats`]: Replay::target_stats
/// [`version`]: Replay::version
/// [`mods`]: Replay::mods
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Replay {
    /// Game mode identifier.
    pub mode: u8,
    /// Client version, `YYYYMMDD` as an integer.
    pub version: i32,
    pub map_md5: String,
    pub player_name: String,
    pub replay_md5: String,
    pub n300: u16,
    pub n100: u16,
    pub n50: u16,
    pub ngeki: u16,
    pub nkatu: u16,
    pub nmiss: u16,
    pub score: i32,
    pub max_combo: u16,
    pub perfect: bool,
    /// Modifier bitmask; each bit is an independent toggle.
    pub mods: i32,
    pub life_bar: Vec<LifeBarEntry>,
    /// Creation time in 100-nanosecond ticks since a fixed epoch. Opaque to
    /// the codec.
    pub timestamp: i64,
    pub frames: Vec<ReplayFrame>,
    /// Time position where playback visually begins after an intro skip.
    pub skip_offset: i32,
    /// Mania randomization seed; populated iff `version >=`
    /// [`VERSION_MANIA_SEED`].
    pub seed: Option<i32>,
    /// Online score id; 0 when the version predates the trailer.
    pub score_id: i64,
    /// Target-practice statistic; populated iff [`MOD_TARGET_PRACTICE`] is
    /// set in `mods`.
    pub target_stats: Option<f64>,
}

/// Formats a float the way the legacy clients did: a mathematically
/// integral value prints with no fractional part (`256`, not `256.0`).
///
/// Shared by the life-bar and frame text encoders. Other tools reading the
/// format depend on this normalization, at the cost of collapsing `1.0`
/// and `1`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LegacyFloat(pub f32);

impl fmt::Display for LegacyFloat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}
