//! Encoding of complete replays.

use tracing::trace;

use crate::binary::Writer;
use crate::errors::OsrError;
use crate::format::{
    LegacyFloat, Replay, MOD_TARGET_PRACTICE, VERSION_SCORE_ID_I32, VERSION_SCORE_ID_I64,
};
use crate::frames;

/// Encode `replay` into `.osr` bytes.
///
/// The exact mirror of [`decode`](crate::decode): trailer fields are
/// written under the same version/modifier conditions used for decoding.
/// Consistency between `version`/`mods` and the populated optional fields
/// is the caller's responsibility; an unset seed or target statistic whose
/// presence condition holds is written as zero.
pub fn encode(replay: &Replay) -> Result<Vec<u8>, OsrError> {
    let block = frames::encode_block(replay)?;
    let mut wtr = Writer::with_capacity(block.len() + 128);

    wtr.write_u8(replay.mode);
    wtr.write_i32(replay.version);
    wtr.write_string(&replay.map_md5);
    wtr.write_string(&replay.player_name);
    wtr.write_string(&replay.replay_md5);
    wtr.write_u16(replay.n300);
    wtr.write_u16(replay.n100);
    wtr.write_u16(replay.n50);
    wtr.write_u16(replay.ngeki);
    wtr.write_u16(replay.nkatu);
    wtr.write_u16(replay.nmiss);
    wtr.write_i32(replay.score);
    wtr.write_u16(replay.max_combo);
    wtr.write_u8(replay.perfect as u8);
    wtr.write_i32(replay.mods);
    wtr.write_string(&life_bar_text(replay));
    wtr.write_i64(replay.timestamp);

    wtr.write_i32(block.len() as i32);
    wtr.write_raw(&block);

    if replay.version >= VERSION_SCORE_ID_I64 {
        wtr.write_i64(replay.score_id);
    } else if replay.version >= VERSION_SCORE_ID_I32 {
        wtr.write_i32(replay.score_id as i32);
    }
    if replay.mods & MOD_TARGET_PRACTICE != 0 {
        wtr.write_f64(replay.target_stats.unwrap_or_default());
    }

    let out = wtr.into_inner();
    trace!(bytes = out.len(), frames = replay.frames.len(), "encoded replay");
    Ok(out)
}

fn life_bar_text(replay: &Replay) -> String {
    let mut text = String::new();
    for entry in &replay.life_bar {
        text.push_str(&format!("{}|{},", entry.time, LegacyFloat(entry.life)));
    }
    text
}
