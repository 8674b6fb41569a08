//! Decoding of complete replays.

use tracing::trace;

use crate::binary::Reader;
use crate::errors::OsrError;
use crate::format::{
    LifeBarEntry, Replay, MOD_TARGET_PRACTICE, VERSION_SCORE_ID_I32, VERSION_SCORE_ID_I64,
};
use crate::frames::{self, FrameBlock};

/// Decode one `.osr` replay from `bytes`.
///
/// The pipeline is a single strict pass: header fields in fixed order, the
/// life bar, the compressed action stream, then the trailer fields gated on
/// `version` and `mods`. Any failure aborts the whole decode; no partial
/// [`Replay`] is ever returned.
///
/// ```
/// # use osr::{decode, encode, Replay, ReplayFrame};
/// let mut replay = Replay::default();
/// replay.player_name = "fern".to_owned();
/// replay.frames.push(ReplayFrame { delta: 16, x: 256.0, y: 192.0, keys: 1 });
///
/// let bytes = encode(&replay).unwrap();
/// assert_eq!(decode(&bytes).unwrap(), replay);
/// ```
pub fn decode(bytes: &[u8]) -> Result<Replay, OsrError> {
    let mut rdr = Reader::new(bytes);

    let mode = rdr.read_u8()?;
    let version = rdr.read_i32()?;
    let map_md5 = rdr.read_string()?;
    let player_name = rdr.read_string()?;
    let replay_md5 = rdr.read_string()?;
    let n300 = rdr.read_u16()?;
    let n100 = rdr.read_u16()?;
    let n50 = rdr.read_u16()?;
    let ngeki = rdr.read_u16()?;
    let nkatu = rdr.read_u16()?;
    let nmiss = rdr.read_u16()?;
    let score = rdr.read_i32()?;
    let max_combo = rdr.read_u16()?;
    let perfect = rdr.read_u8()? != 0;
    let mods = rdr.read_i32()?;
    trace!(mode, version, player = %player_name, "decoded replay headers");

    let life_bar = parse_life_bar(&rdr.read_string()?)?;
    let timestamp = rdr.read_i64()?;

    let block_len = rdr.read_i32()?;
    let block = rdr.take(block_len as usize)?;
    let FrameBlock {
        skip_offset,
        frames,
        seed,
    } = frames::decode_block(block, mods, version)?;

    let score_id = if version >= VERSION_SCORE_ID_I64 {
        rdr.read_i64()?
    } else if version >= VERSION_SCORE_ID_I32 {
        i64::from(rdr.read_i32()?)
    } else {
        0
    };
    let target_stats = if mods & MOD_TARGET_PRACTICE != 0 {
        Some(rdr.read_f64()?)
    } else {
        None
    };

    Ok(Replay {
        mode,
        version,
        map_md5,
        player_name,
        replay_md5,
        n300,
        n100,
        n50,
        ngeki,
        nkatu,
        nmiss,
        score,
        max_combo,
        perfect,
        mods,
        life_bar,
        timestamp,
        frames,
        skip_offset,
        seed,
        score_id,
        target_stats,
    })
}

/// Life bar text is `time|life,` per entry. The trailing delimiter leaves
/// one empty token at the end, which is discarded; a non-empty final token
/// means the delimiter was missing.
fn parse_life_bar(text: &str) -> Result<Vec<LifeBarEntry>, OsrError> {
    let mut tokens: Vec<&str> = text.split(',').collect();
    match tokens.pop() {
        Some("") | None => {}
        Some(extra) => return Err(OsrError::MalformedTimelineEntry(extra.to_owned())),
    }

    let mut entries = Vec::with_capacity(tokens.len());
    for token in tokens {
        let malformed = || OsrError::MalformedTimelineEntry(token.to_owned());
        let (time, life) = token.split_once('|').ok_or_else(malformed)?;
        entries.push(LifeBarEntry {
            time: time.parse().map_err(|_| malformed())?,
            life: life.parse().map_err(|_| malformed())?,
        });
    }

    Ok(entries)
}
