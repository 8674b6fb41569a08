//! The action-stream codec.
//!
//! The compressed block inside a replay is an LZMA-alone container (no size
//! framing, single filter chain) around comma-delimited ASCII actions. The
//! first action is a fixed sentinel, the second carries the intro skip
//! offset, and on new enough versions the last carries the mania seed; the
//! rest are `delta|x|y|keys` input frames.

use std::str;

use tracing::trace;

use crate::errors::OsrError;
use crate::format::{
    LegacyFloat, Replay, ReplayFrame, MOD_AUTOPLAY, VERSION_MANIA_SEED,
};

/// Decoded contents of one action block.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FrameBlock {
    pub skip_offset: i32,
    pub frames: Vec<ReplayFrame>,
    pub seed: Option<i32>,
}

/// Decompress and parse one action block. `mods` and `version` drive the
/// skip-offset correction and the seed carrier respectively.
pub(crate) fn decode_block(
    compressed: &[u8],
    mods: i32,
    version: i32,
) -> Result<FrameBlock, OsrError> {
    let mut rdr = compressed;
    let mut raw = Vec::new();
    lzma_rs::lzma_decompress(&mut rdr, &mut raw)?;

    let text = str::from_utf8(&raw)?;
    let mut actions: Vec<&str> = text.split(',').collect();
    // the trailing delimiter produces one empty token; anything else stays
    if actions.last() == Some(&"") {
        actions.pop();
    }
    if actions.len() < 2 {
        return Err(OsrError::MalformedActionHeader(text.to_owned()));
    }
    trace!(actions = actions.len(), "decompressed action stream");

    let skip_offset = parse_skip_offset(actions[1], mods)?;

    // From VERSION_MANIA_SEED on, the last action is the seed carrier and
    // not a frame. The version gate is authoritative: older replays parse a
    // seed-shaped trailing action as an ordinary frame.
    let (frames_end, seed) = if version >= VERSION_MANIA_SEED {
        let last = actions.len() - 1;
        (last.max(2), Some(parse_seed(actions[last])?))
    } else {
        (actions.len(), None)
    };

    let mut frames = Vec::with_capacity(frames_end - 2);
    for action in &actions[2..frames_end] {
        frames.push(parse_frame(action)?);
    }

    Ok(FrameBlock {
        skip_offset,
        frames,
        seed,
    })
}

/// Serialize and compress the frame stream of `replay`.
pub(crate) fn encode_block(replay: &Replay) -> Result<Vec<u8>, OsrError> {
    let mut text = String::from("0|256|-500|0,");
    text.push_str(&format!("-1|256|-500|{},", replay.skip_offset));
    for frame in &replay.frames {
        text.push_str(&format!(
            "{}|{}|{}|{},",
            frame.delta,
            LegacyFloat(frame.x),
            LegacyFloat(frame.y),
            frame.keys
        ));
    }
    if replay.version >= VERSION_MANIA_SEED {
        text.push_str(&format!("-12345|0|0|{},", replay.seed.unwrap_or(0)));
    }
    trace!(text_len = text.len(), "compressing action stream");

    let mut compressed = Vec::new();
    lzma_rs::lzma_compress(&mut text.as_bytes(), &mut compressed)?;
    Ok(compressed)
}

/// Pull the intro skip offset out of the second action.
///
/// On-disk replays put the offset in the first field, with `-1` meaning "no
/// skip"; those get the auto-play correction. Legacy writers instead leave
/// the `-1` sentinel in front and store the already-corrected offset in the
/// last field, which is taken verbatim.
fn parse_skip_offset(action: &str, mods: i32) -> Result<i32, OsrError> {
    let malformed = || OsrError::MalformedActionHeader(action.to_owned());
    let (head, _) = action.split_once('|').unwrap_or((action, ""));

    if head != "-1" {
        let mut skip: i32 = head.parse().map_err(|_| malformed())?;
        if mods & MOD_AUTOPLAY != 0 {
            // one-way correction for auto-play recordings; never inverted
            // on encode
            skip -= 100_000;
        }
        return Ok(skip);
    }

    match action.rsplit_once('|') {
        Some((_, tail)) if tail != "-1" => tail.parse().map_err(|_| malformed()),
        _ => Ok(0),
    }
}

/// The seed rides in the last field of the final action.
fn parse_seed(action: &str) -> Result<i32, OsrError> {
    let malformed = || OsrError::MalformedActionHeader(action.to_owned());
    let (_, tail) = action.rsplit_once('|').ok_or_else(malformed)?;
    tail.parse().map_err(|_| malformed())
}

fn parse_frame(action: &str) -> Result<ReplayFrame, OsrError> {
    let malformed = || OsrError::MalformedFrame(action.to_owned());
    let mut fields = action.splitn(4, '|');
    let (Some(delta), Some(x), Some(y), Some(keys)) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(malformed());
    };

    Ok(ReplayFrame {
        delta: delta.parse().map_err(|_| malformed())?,
        x: x.parse().map_err(|_| malformed())?,
        y: y.parse().map_err(|_| malformed())?,
        keys: keys.parse().map_err(|_| malformed())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(text: &str) -> Vec<u8> {
        let mut compressed = Vec::new();
        lzma_rs::lzma_compress(&mut text.as_bytes(), &mut compressed).unwrap();
        compressed
    }

    #[test]
    fn full_stream_scenario() {
        let block = pack("0|256|-500|0,-1|256|-500|1000,10|5|5|0,-12345|0|0|42,");
        let decoded = decode_block(&block, 0, VERSION_MANIA_SEED).unwrap();

        assert_eq!(decoded.skip_offset, 1000);
        assert_eq!(
            decoded.frames,
            [ReplayFrame {
                delta: 10,
                x: 5.0,
                y: 5.0,
                keys: 0,
            }]
        );
        assert_eq!(decoded.seed, Some(42));
    }

    #[test]
    fn autoplay_skip_correction() {
        let block = pack("0|256|-500|0,5000|256|-500|0,10|5|5|0,");
        let decoded = decode_block(&block, MOD_AUTOPLAY, 2012_01_01).unwrap();
        assert_eq!(decoded.skip_offset, 5000 - 100_000);

        let decoded = decode_block(&block, 0, 2012_01_01).unwrap();
        assert_eq!(decoded.skip_offset, 5000);
    }

    #[test]
    fn skip_sentinel_ignores_autoplay() {
        let block = pack("0|256|-500|0,-1|256|-500|-1,10|5|5|0,");
        let decoded = decode_block(&block, MOD_AUTOPLAY, 2012_01_01).unwrap();
        assert_eq!(decoded.skip_offset, 0);
    }

    #[test]
    fn old_version_keeps_trailing_action_as_frame() {
        let block = pack("0|256|-500|0,-1|256|-500|0,-12345|0|0|42,");
        let decoded = decode_block(&block, 0, 2012_01_01).unwrap();

        assert_eq!(decoded.seed, None);
        assert_eq!(
            decoded.frames,
            [ReplayFrame {
                delta: -12345,
                x: 0.0,
                y: 0.0,
                keys: 42,
            }]
        );
    }

    #[test]
    fn empty_stream_decodes_to_no_frames() {
        let block = pack("0|256|-500|0,-1|256|-500|0,");
        let decoded = decode_block(&block, 0, 2012_01_01).unwrap();
        assert!(decoded.frames.is_empty());
        assert_eq!(decoded.skip_offset, 0);
    }

    #[test]
    fn block_round_trip() {
        let replay = Replay {
            version: VERSION_MANIA_SEED,
            frames: vec![
                ReplayFrame {
                    delta: 16,
                    x: 32.5,
                    y: 240.0,
                    keys: 1,
                },
                ReplayFrame {
                    delta: 17,
                    x: 33.0,
                    y: 239.5,
                    keys: 0,
                },
            ],
            skip_offset: 2500,
            seed: Some(777),
            ..Replay::default()
        };

        let block = encode_block(&replay).unwrap();
        let decoded = decode_block(&block, replay.mods, replay.version).unwrap();

        assert_eq!(decoded.skip_offset, 2500);
        assert_eq!(decoded.frames, replay.frames);
        assert_eq!(decoded.seed, Some(777));
    }

    #[test]
    fn malformed_frame_reports_action() {
        let block = pack("0|256|-500|0,-1|256|-500|0,10|5|oops|0,");
        match decode_block(&block, 0, 2012_01_01) {
            Err(OsrError::MalformedFrame(action)) => assert_eq!(action, "10|5|oops|0"),
            other => panic!("expected malformed frame, got {other:?}"),
        }
    }

    #[test]
    fn short_frame_is_rejected() {
        let block = pack("0|256|-500|0,-1|256|-500|0,10|5|5,");
        assert!(matches!(
            decode_block(&block, 0, 2012_01_01),
            Err(OsrError::MalformedFrame(_))
        ));
    }

    #[test]
    fn corrupt_envelope() {
        assert!(matches!(
            decode_block(b"definitely not lzma", 0, 2012_01_01),
            Err(OsrError::Decompression(_))
        ));
    }

    #[test]
    fn missing_actions() {
        let block = pack("0|256|-500|0,");
        assert!(matches!(
            decode_block(&block, 0, 2012_01_01),
            Err(OsrError::MalformedActionHeader(_))
        ));
    }
}
