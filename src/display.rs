//! Display-index resolution.
//!
//! Maps a global frame index on a parent layer to the frame of the nested
//! symbol timeline that is on screen at that moment.
//!
//! | Mode | Local index |
//! |------|-------------|
//! | single frame / unset | `first` |
//! | play once | `first + elapsed`, held at `last - 1` |
//! | loop | `first + elapsed % (last - first)` |
//! | movie clip | `0 + elapsed % frame_count` |
//!
//! where `elapsed = global - keyframe.start_frame` and `last` defaults to the
//! nested timeline's frame count. A movie clip always plays its full timeline
//! from frame 0, whatever window or loop label the instance carries.

use crate::types::{InstanceInfo, LoopMode, RawFrame};

/// Effective first frame of a movie clip instance.
pub const MOVIE_CLIP_FIRST_FRAME: u32 = 0;

/// Resolve the local frame index an instance displays at `frame_index`.
///
/// `symbol_frame_count` is the frame count of the referenced symbol's
/// timeline. Returns `None` when the instance's metadata cannot be resolved
/// to a frame (unknown loop mode, empty loop window, empty movie clip); the
/// caller must then treat the occurrence as unplaceable.
pub fn resolve_display_index(
    raw_frame: &RawFrame,
    frame_index: u32,
    instance: &InstanceInfo,
    symbol_frame_count: u32,
) -> Option<u32> {
    let elapsed = frame_index.saturating_sub(raw_frame.start_frame);
    let first = instance.first_frame;
    let last = instance.last_frame.unwrap_or(symbol_frame_count);

    if instance.is_movie_clip() {
        if symbol_frame_count == 0 {
            log_unresolved(instance, "movie clip with an empty timeline");
            return None;
        }
        return Some(MOVIE_CLIP_FIRST_FRAME + elapsed % symbol_frame_count);
    }

    match &instance.loop_mode {
        None | Some(LoopMode::SingleFrame) => Some(first),
        Some(LoopMode::PlayOnce) => {
            let hold = last.saturating_sub(1).max(first);
            Some(first.saturating_add(elapsed).min(hold))
        }
        Some(LoopMode::Loop) => {
            if last <= first {
                log_unresolved(instance, "empty loop window");
                return None;
            }
            Some(first + elapsed % (last - first))
        }
        Some(LoopMode::Unknown(_)) => {
            log_unresolved(instance, "unknown loop type");
            None
        }
    }
}

fn log_unresolved(instance: &InstanceInfo, reason: &str) {
    tracing::warn!(
        element_type = "instance",
        instance_type = %instance.instance_type,
        symbol_type = %instance.symbol_type,
        loop_mode = ?instance.loop_mode,
        first_frame = instance.first_frame,
        last_frame = ?instance.last_frame,
        library_item = %instance.library_item,
        "Unresolvable display index: {}",
        reason
    );
}
