//! Incremental diffing of a freshly polled snapshot against the remembered
//! stream state.
//!
//! `diff` is pure: it reads the state and the snapshot and reports what is
//! new, corrected, or a structural transition. The driver loop applies the
//! resulting updates through [`StreamState::absorb`] after rendering, so a
//! play is never reported as new twice, though it may later be reported once
//! more as a correction when its signature changes.

use crate::client::Backoff;
use crate::feed::{Phase, Snapshot};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Trailing window of plays re-examined for corrections each cycle. At-bats
/// finalize within a few plays of being first shown.
pub const CORRECTION_WINDOW: usize = 5;

/// Everything remembered between polls. Created once per stream session,
/// owned and mutated exclusively by the driver loop.
#[derive(Debug)]
pub struct StreamState {
    /// Play-list length after the previous cycle; monotonically non-decreasing.
    pub play_count: usize,
    /// at-bat index -> last seen signature (description + outs). Entries are
    /// only ever overwritten, never removed.
    signatures: HashMap<i64, String>,
    /// at-bat index -> last seen play-event count; never decreases.
    pitch_counts: HashMap<i64, usize>,
    pub last_scoreboard: Option<String>,
    pub last_status: Option<String>,
    pub last_inning: Option<u32>,
    pub last_half: Option<String>,
    pub etag: Option<String>,
    pub backoff: Backoff,
    pub last_forced_snapshot: Instant,
    /// Armed by `--from-start`; consumed after the first diffed cycle.
    pub replay_from_start: bool,
}

impl StreamState {
    pub fn new(base_interval: Duration, replay_from_start: bool) -> Self {
        Self {
            play_count: 0,
            signatures: HashMap::new(),
            pitch_counts: HashMap::new(),
            last_scoreboard: None,
            last_status: None,
            last_inning: None,
            last_half: None,
            etag: None,
            backoff: Backoff::new(base_interval),
            last_forced_snapshot: Instant::now(),
            replay_from_start,
        }
    }

    pub fn signature_for(&self, at_bat_index: i64) -> Option<&str> {
        self.signatures.get(&at_bat_index).map(String::as_str)
    }

    pub fn pitch_count_for(&self, at_bat_index: i64) -> usize {
        self.pitch_counts.get(&at_bat_index).copied().unwrap_or(0)
    }

    /// Record the cycle's snapshot: play count, signatures, pitch counts, and
    /// the inning/half pair. Runs unconditionally every successful cycle,
    /// whether or not anything was rendered, so suppressed plays still get
    /// their signatures recorded and future corrections are detected.
    pub fn absorb(&mut self, snapshot: &Snapshot) {
        let plays = snapshot.plays();
        self.play_count = self.play_count.max(plays.len());

        for play in plays {
            let Some(idx) = play.at_bat_index() else {
                continue;
            };
            self.signatures.insert(idx, play.signature());
            let events = play.play_events.len();
            let entry = self.pitch_counts.entry(idx).or_insert(0);
            *entry = (*entry).max(events);
        }

        if let Some(inning) = snapshot.current_inning() {
            self.last_inning = Some(inning);
        }
        if let Some(half) = snapshot.inning_half() {
            self.last_half = Some(half.to_string());
        }
    }
}

/// Caller-side knobs that affect what the diff reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffOptions {
    /// First cycle of a `--from-start` session: the new-play range opens at 0.
    pub replay_from_start: bool,
    /// Scan every play for new pitch events, not just the new-play range.
    pub verbose_pitches: bool,
}

/// New pitch events within one play: everything from event offset `from` on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitchRange {
    pub play: usize,
    pub from: usize,
}

/// What one poll cycle revealed, in play-list index terms.
#[derive(Debug, Default)]
pub struct Diff {
    pub new_plays: Vec<usize>,
    pub corrections: Vec<usize>,
    pub new_pitches: Vec<PitchRange>,
    pub boundary: bool,
    pub phase: Phase,
}

/// Compare a snapshot against the remembered state. Reads the state, never
/// mutates it.
pub fn diff(state: &StreamState, snapshot: &Snapshot, options: DiffOptions) -> Diff {
    let plays = snapshot.plays();
    let start = if options.replay_from_start {
        0
    } else {
        state.play_count.min(plays.len())
    };

    let mut result = Diff {
        phase: snapshot.phase(),
        ..Default::default()
    };

    // Newly appeared plays. Status-change pseudo-plays never count.
    for (i, play) in plays.iter().enumerate().skip(start) {
        if play.is_status_change() {
            continue;
        }
        result.new_plays.push(i);
    }

    // Corrections: a trailing play whose stored signature no longer matches.
    // Plays new this cycle are excluded; their signatures are only recorded
    // after this cycle renders them.
    let window_start = plays.len().saturating_sub(CORRECTION_WINDOW);
    for (i, play) in plays.iter().enumerate().skip(window_start) {
        if i >= start || play.is_status_change() {
            continue;
        }
        let Some(idx) = play.at_bat_index() else {
            continue;
        };
        if play.result.description.is_empty() {
            continue;
        }
        if let Some(previous) = state.signature_for(idx) {
            if previous != play.signature() {
                result.corrections.push(i);
            }
        }
    }

    // New pitch events past the recorded count per at-bat.
    let pitch_start = if options.verbose_pitches { 0 } else { start };
    for (i, play) in plays.iter().enumerate().skip(pitch_start) {
        if play.is_status_change() {
            continue;
        }
        let Some(idx) = play.at_bat_index() else {
            continue;
        };
        let seen = state.pitch_count_for(idx);
        if play.play_events.len() > seen && play.play_events[seen..].iter().any(|e| e.is_pitch) {
            result.new_pitches.push(PitchRange {
                play: i,
                from: seen,
            });
        }
    }

    // Structural boundary: inning or half changed, and both are present.
    result.boundary = match (snapshot.current_inning(), snapshot.inning_half()) {
        (Some(inning), Some(half)) => {
            state.last_inning != Some(inning) || state.last_half.as_deref() != Some(half)
        }
        _ => false,
    };

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{PitchEvent, PlayRecord};

    fn play(idx: i64, inning: u32, half: &str, desc: &str, outs: u32) -> PlayRecord {
        let mut p = PlayRecord::default();
        p.about.at_bat_index = Some(idx);
        p.about.inning = inning;
        p.about.half_inning = half.to_string();
        p.result.description = desc.to_string();
        p.count.outs = Some(outs);
        p
    }

    fn snapshot(plays: Vec<PlayRecord>, inning: Option<u32>, half: Option<&str>) -> Snapshot {
        let mut s = Snapshot::default();
        s.game_data.status.abstract_game_state = "Live".to_string();
        s.game_data.status.detailed_state = "In Progress".to_string();
        s.live_data.plays.all_plays = plays;
        s.live_data.linescore.current_inning = inning;
        s.live_data.linescore.inning_state = half.map(String::from);
        s
    }

    fn state() -> StreamState {
        StreamState::new(Duration::from_secs(2), false)
    }

    #[test]
    fn new_plays_are_the_tail_range() {
        let snap = snapshot(
            vec![
                play(0, 1, "top", "Flyout", 1),
                play(1, 1, "top", "Single", 1),
                play(2, 1, "top", "Strikeout", 2),
            ],
            Some(1),
            Some("Top"),
        );
        let mut st = state();
        st.absorb(&snap);
        assert_eq!(st.play_count, 3);

        let mut grown = snap.clone();
        grown
            .live_data
            .plays
            .all_plays
            .push(play(3, 1, "top", "Walk", 2));
        let d = diff(&st, &grown, DiffOptions::default());
        assert_eq!(d.new_plays, vec![3]);
        assert!(d.corrections.is_empty());
    }

    #[test]
    fn replay_from_start_opens_range_at_zero() {
        let snap = snapshot(
            vec![play(0, 1, "top", "Flyout", 1), play(1, 1, "top", "Single", 1)],
            Some(1),
            Some("Top"),
        );
        let st = state();
        let d = diff(
            &st,
            &snap,
            DiffOptions {
                replay_from_start: true,
                ..Default::default()
            },
        );
        assert_eq!(d.new_plays, vec![0, 1]);
    }

    #[test]
    fn status_change_pseudo_plays_never_count() {
        let mut pseudo = play(5, 3, "top", "Delay over", 0);
        pseudo.result.event_type = "statusChange".to_string();
        let snap = snapshot(
            vec![play(4, 3, "top", "Single", 0), pseudo],
            Some(3),
            Some("Top"),
        );
        let st = state();
        let d = diff(&st, &snap, DiffOptions::default());
        assert_eq!(d.new_plays, vec![0]);
    }

    #[test]
    fn correction_detected_once_no_duplicate_new_play() {
        let snap_a = snapshot(vec![play(7, 4, "bottom", "Lineout", 1)], Some(4), Some("Bottom"));
        let mut st = state();
        let d = diff(&st, &snap_a, DiffOptions::default());
        assert_eq!(d.new_plays, vec![0]);
        st.absorb(&snap_a);
        assert_eq!(st.signature_for(7), Some("Lineout|1"));

        let snap_b = snapshot(
            vec![play(7, 4, "bottom", "Flyout, sacrifice", 1)],
            Some(4),
            Some("Bottom"),
        );
        let d = diff(&st, &snap_b, DiffOptions::default());
        assert!(d.new_plays.is_empty());
        assert_eq!(d.corrections, vec![0]);

        // absorbing the corrected snapshot settles the signature
        st.absorb(&snap_b);
        let d = diff(&st, &snap_b, DiffOptions::default());
        assert!(d.corrections.is_empty());
    }

    #[test]
    fn unchanged_signature_is_never_rereported() {
        let snap = snapshot(vec![play(3, 2, "top", "Groundout", 2)], Some(2), Some("Top"));
        let mut st = state();
        st.absorb(&snap);
        let d = diff(&st, &snap, DiffOptions::default());
        assert!(d.new_plays.is_empty());
        assert!(d.corrections.is_empty());
    }

    #[test]
    fn correction_window_is_bounded() {
        let mut plays: Vec<PlayRecord> = (0..10)
            .map(|i| play(i, 2, "top", "Groundout", 1))
            .collect();
        let snap = snapshot(plays.clone(), Some(2), Some("Top"));
        let mut st = state();
        st.absorb(&snap);

        // change a play outside the trailing window and one inside it
        plays[2].result.description = "Single".to_string();
        plays[8].result.description = "Double".to_string();
        let changed = snapshot(plays, Some(2), Some("Top"));
        let d = diff(&st, &changed, DiffOptions::default());
        assert_eq!(d.corrections, vec![8]);
    }

    #[test]
    fn boundary_requires_both_fields_present() {
        let mut st = state();
        st.last_inning = Some(3);
        st.last_half = Some("Top".to_string());

        let same = snapshot(vec![], Some(3), Some("Top"));
        assert!(!diff(&st, &same, DiffOptions::default()).boundary);

        let flipped = snapshot(vec![], Some(3), Some("Bottom"));
        assert!(diff(&st, &flipped, DiffOptions::default()).boundary);

        let next_inning = snapshot(vec![], Some(4), Some("Top"));
        assert!(diff(&st, &next_inning, DiffOptions::default()).boundary);

        let absent = snapshot(vec![], None, None);
        assert!(!diff(&st, &absent, DiffOptions::default()).boundary);
    }

    fn pitch() -> PitchEvent {
        PitchEvent {
            is_pitch: true,
            ..Default::default()
        }
    }

    #[test]
    fn new_pitches_start_past_recorded_count() {
        let mut p = play(2, 1, "top", "In play", 0);
        p.play_events = vec![pitch(), pitch()];
        let snap = snapshot(vec![p.clone()], Some(1), Some("Top"));
        let mut st = state();

        let d = diff(&st, &snap, DiffOptions::default());
        assert_eq!(
            d.new_pitches,
            vec![PitchRange { play: 0, from: 0 }]
        );
        st.absorb(&snap);
        assert_eq!(st.pitch_count_for(2), 2);

        // same at-bat gains a pitch; not in the new-play range, so only the
        // verbose scan sees it
        p.play_events.push(pitch());
        let grown = snapshot(vec![p], Some(1), Some("Top"));
        let d = diff(&st, &grown, DiffOptions::default());
        assert!(d.new_pitches.is_empty());
        let d = diff(
            &st,
            &grown,
            DiffOptions {
                verbose_pitches: true,
                ..Default::default()
            },
        );
        assert_eq!(
            d.new_pitches,
            vec![PitchRange { play: 0, from: 2 }]
        );
    }

    #[test]
    fn non_pitch_events_do_not_trigger_pitch_ranges() {
        let mut p = play(2, 1, "top", "Pickoff attempt", 0);
        p.play_events = vec![PitchEvent::default()];
        let snap = snapshot(vec![p], Some(1), Some("Top"));
        let st = state();
        let d = diff(&st, &snap, DiffOptions::default());
        assert!(d.new_pitches.is_empty());
    }

    #[test]
    fn absorb_keeps_counts_monotonic() {
        let mut p = play(1, 1, "top", "Single", 0);
        p.play_events = vec![pitch(), pitch(), pitch()];
        let big = snapshot(vec![p.clone()], Some(1), Some("Top"));
        let mut st = state();
        st.absorb(&big);
        assert_eq!(st.pitch_count_for(1), 3);
        assert_eq!(st.play_count, 1);

        // a shrunken document must not roll counts backwards
        p.play_events.truncate(1);
        let small = snapshot(vec![p], None, None);
        st.absorb(&small);
        assert_eq!(st.pitch_count_for(1), 3);
        assert_eq!(st.play_count, 1);
        // absent inning/half leave the remembered pair alone
        assert_eq!(st.last_inning, Some(1));
        assert_eq!(st.last_half.as_deref(), Some("Top"));
    }

    #[test]
    fn final_phase_is_reported() {
        let mut snap = snapshot(vec![], Some(9), Some("Bottom"));
        snap.game_data.status.abstract_game_state = "Final".to_string();
        let st = state();
        assert_eq!(diff(&st, &snap, DiffOptions::default()).phase, Phase::Final);
    }
}
