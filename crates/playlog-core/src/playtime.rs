//! Bounded play time for one unlock mode.
//!
//! # Algorithm Summary
//!
//! For every session overlapping `[start, end]` (manual unlock sessions
//! excluded):
//! 1. Clip the session window to the bounds
//! 2. Sessions without unlocks are always kept
//! 3. Sessions with unlocks are kept only if an in-window unlock qualifies
//!    for the mode. Hardcore unlocks qualify for both modes.
//! 4. In hardcore mode, a softcore unlock of a different achievement after
//!    a hardcore one cuts the session short at that unlock
//! 5. Reconstructed sessions are credited the summary's per-session adjustment

use chrono::{DateTime, Duration, Utc};

use crate::session::Session;
use crate::summary::ActivitySummary;
use crate::timeline::Timeline;
use crate::types::{AchievementId, UnlockMode};

impl Timeline {
    /// Seconds played between two optional bounds in the given mode.
    ///
    /// `summary` must come from [`Timeline::summarize`] on this timeline; it
    /// supplies the reconstructed session adjustment. Returns `None` when the
    /// result is not positive, which means "unknown" rather than "not played".
    pub fn calculate_playtime(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        mode: UnlockMode,
        summary: &ActivitySummary,
    ) -> Option<i64> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return None;
            }
        }

        let mut playtime = 0i64;
        for session in self.sessions() {
            if session.kind.is_manual_unlock() {
                continue;
            }
            if start.is_some_and(|start| session.end_time < start) {
                continue;
            }
            if end.is_some_and(|end| session.start_time > end) {
                // Sorted by start, nothing later can overlap.
                break;
            }

            let clipped_start = start.map_or(session.start_time, |s| s.max(session.start_time));
            let clipped_end = end.map_or(session.end_time, |e| e.min(session.end_time));

            let Some((mut session_end, cut_short)) = qualifying_end(session, clipped_start, clipped_end, mode)
            else {
                continue;
            };

            if session.kind.is_reconstructed() && !cut_short {
                session_end += Duration::seconds(summary.generated_session_adjustment);
                if let Some(end) = end {
                    session_end = session_end.min(end);
                }
            }

            playtime += (session_end - clipped_start).num_seconds();
        }

        tracing::trace!(%mode, ?start, ?end, playtime, "calculated playtime");
        (playtime > 0).then_some(playtime)
    }
}

/// Decides whether a clipped session counts toward `mode`.
///
/// Returns the end to count up to and whether a hardcore cutoff set it, or
/// `None` to discard the session.
fn qualifying_end(
    session: &Session,
    clipped_start: DateTime<Utc>,
    clipped_end: DateTime<Utc>,
    mode: UnlockMode,
) -> Option<(DateTime<Utc>, bool)> {
    let mut has_unlocks = false;
    let mut qualified = false;
    let mut last_hardcore: Option<(AchievementId, DateTime<Utc>)> = None;
    let mut first_non_hardcore: Option<DateTime<Utc>> = None;

    for event in &session.events {
        let Some(unlock) = event.as_unlock() else {
            continue;
        };
        has_unlocks = true;

        if event.at < clipped_start || event.at > clipped_end {
            continue;
        }

        if unlock.hardcore {
            qualified = true;
            last_hardcore = Some((unlock.achievement_id, event.at));
            first_non_hardcore = None;
            continue;
        }

        match mode {
            UnlockMode::Softcore => {
                qualified = true;
                break;
            }
            UnlockMode::Hardcore => {
                let dropped_out = last_hardcore
                    .is_some_and(|(id, at)| id != unlock.achievement_id && event.at > at);
                if dropped_out && first_non_hardcore.is_none() {
                    first_non_hardcore = Some(event.at);
                }
            }
        }
    }

    if has_unlocks && !qualified {
        return None;
    }

    match (mode, first_non_hardcore) {
        (UnlockMode::Hardcore, Some(cutoff)) => Some((cutoff, true)),
        _ => Some((clipped_end, false)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::records::{SessionRecord, UnlockRecord};
    use crate::timeline::{TimelineBuilder, TimelineConfig};
    use crate::types::UnlockerName;

    fn ts(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0)
            .single()
            .expect("valid test timestamp")
            + Duration::minutes(minutes)
    }

    fn ach(id: u32) -> AchievementId {
        AchievementId::new(id).unwrap()
    }

    fn timeline(records: &[SessionRecord], unlocks: &[UnlockRecord]) -> Timeline {
        let mut builder = TimelineBuilder::new(TimelineConfig::default());
        builder.add_recorded_sessions(records, &[]);
        builder.attach_unlocks(unlocks);
        builder.build()
    }

    fn playtime(
        timeline: &Timeline,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        mode: UnlockMode,
    ) -> Option<i64> {
        timeline.calculate_playtime(start, end, mode, &timeline.summarize())
    }

    #[test]
    fn test_session_without_unlocks_always_counts() {
        let timeline = timeline(&[SessionRecord::new(ts(0), 60)], &[]);

        assert_eq!(playtime(&timeline, None, None, UnlockMode::Hardcore), Some(3600));
        assert_eq!(playtime(&timeline, None, None, UnlockMode::Softcore), Some(3600));
    }

    #[test]
    fn test_session_clipped_to_bounds() {
        let timeline = timeline(&[SessionRecord::new(ts(0), 60)], &[]);

        assert_eq!(
            playtime(&timeline, Some(ts(15)), Some(ts(45)), UnlockMode::Softcore),
            Some(1800)
        );
        assert_eq!(
            playtime(&timeline, Some(ts(30)), None, UnlockMode::Softcore),
            Some(1800)
        );
    }

    #[test]
    fn test_softcore_then_hardcore_same_achievement_no_cutoff() {
        // Softcore at 09:00, hardcore at 09:30, inside a 08:00-10:00 session.
        let mut record = UnlockRecord::softcore(ach(1), ts(60));
        record.unlocked_hardcore_at = Some(ts(90));
        let timeline = timeline(&[SessionRecord::new(ts(0), 120)], &[record]);

        assert_eq!(playtime(&timeline, None, None, UnlockMode::Hardcore), Some(7200));
    }

    #[test]
    fn test_hardcore_cut_off_at_later_softcore_unlock() {
        let timeline = timeline(
            &[SessionRecord::new(ts(0), 120)],
            &[
                UnlockRecord::hardcore(ach(1), ts(30)),
                UnlockRecord::softcore(ach(2), ts(50)),
                UnlockRecord::softcore(ach(3), ts(70)),
            ],
        );

        assert_eq!(playtime(&timeline, None, None, UnlockMode::Hardcore), Some(50 * 60));
        assert_eq!(playtime(&timeline, None, None, UnlockMode::Softcore), Some(7200));
    }

    #[test]
    fn test_later_hardcore_unlock_clears_cutoff() {
        let timeline = timeline(
            &[SessionRecord::new(ts(0), 120)],
            &[
                UnlockRecord::hardcore(ach(1), ts(30)),
                UnlockRecord::softcore(ach(2), ts(50)),
                UnlockRecord::hardcore(ach(3), ts(70)),
            ],
        );

        assert_eq!(playtime(&timeline, None, None, UnlockMode::Hardcore), Some(7200));
    }

    #[test]
    fn test_softcore_only_session_excluded_from_hardcore() {
        let timeline = timeline(
            &[SessionRecord::new(ts(0), 60), SessionRecord::new(ts(120), 30)],
            &[UnlockRecord::softcore(ach(1), ts(10))],
        );

        assert_eq!(playtime(&timeline, None, None, UnlockMode::Hardcore), Some(1800));
        assert_eq!(playtime(&timeline, None, None, UnlockMode::Softcore), Some(5400));
    }

    #[test]
    fn test_hardcore_unlock_qualifies_softcore() {
        let timeline = timeline(
            &[SessionRecord::new(ts(0), 60)],
            &[UnlockRecord::hardcore(ach(1), ts(10))],
        );

        assert_eq!(playtime(&timeline, None, None, UnlockMode::Softcore), Some(3600));
    }

    #[test]
    fn test_session_with_unlocks_outside_window_discarded() {
        let timeline = timeline(
            &[SessionRecord::new(ts(0), 60)],
            &[UnlockRecord::hardcore(ach(1), ts(50))],
        );

        assert_eq!(
            playtime(&timeline, Some(ts(0)), Some(ts(40)), UnlockMode::Softcore),
            None
        );
    }

    #[test]
    fn test_manual_unlock_sessions_ignored() {
        let timeline = timeline(
            &[],
            &[
                UnlockRecord::hardcore(ach(1), ts(0)).delegated_by(UnlockerName::new("mod").unwrap()),
                UnlockRecord::hardcore(ach(2), ts(30)).delegated_by(UnlockerName::new("mod").unwrap()),
            ],
        );

        assert_eq!(playtime(&timeline, None, None, UnlockMode::Softcore), None);
    }

    #[test]
    fn test_reconstructed_session_gets_adjustment() {
        let timeline = timeline(
            &[SessionRecord::new(ts(0), 30)],
            &[
                UnlockRecord::hardcore(ach(1), ts(10)),
                UnlockRecord::hardcore(ach(2), ts(20)),
                UnlockRecord::hardcore(ach(3), ts(600)),
            ],
        );
        let summary = timeline.summarize();
        assert_eq!(summary.generated_session_adjustment, 600);

        assert_eq!(
            timeline.calculate_playtime(None, None, UnlockMode::Hardcore, &summary),
            Some(1800 + 600)
        );
        // The adjustment never spills past the end bound.
        assert_eq!(
            timeline.calculate_playtime(Some(ts(590)), Some(ts(605)), UnlockMode::Hardcore, &summary),
            Some(300)
        );
    }

    #[test]
    fn test_cut_short_reconstructed_session_gets_no_adjustment() {
        // The softcore unlock at 620 ends the reconstructed session, so the
        // hardcore cutoff lands exactly on its end.
        let timeline = timeline(
            &[SessionRecord::new(ts(0), 30)],
            &[
                UnlockRecord::hardcore(ach(1), ts(10)),
                UnlockRecord::hardcore(ach(2), ts(20)),
                UnlockRecord::hardcore(ach(3), ts(600)),
                UnlockRecord::softcore(ach(4), ts(620)),
            ],
        );
        let summary = timeline.summarize();
        assert_eq!(summary.generated_session_adjustment, 450);
        assert_eq!(timeline.sessions()[1].end_time, ts(620));

        assert_eq!(
            timeline.calculate_playtime(None, None, UnlockMode::Hardcore, &summary),
            Some(1800 + 1200)
        );
        assert_eq!(
            timeline.calculate_playtime(None, None, UnlockMode::Softcore, &summary),
            Some(1800 + 1200 + 450)
        );
    }

    #[test]
    fn test_inverted_bounds_unknown() {
        let timeline = timeline(&[SessionRecord::new(ts(0), 60)], &[]);

        assert_eq!(
            playtime(&timeline, Some(ts(40)), Some(ts(10)), UnlockMode::Softcore),
            None
        );
    }

    #[test]
    fn test_clipped_total_never_exceeds_window() {
        let timeline = timeline(
            &[SessionRecord::new(ts(0), 60), SessionRecord::new(ts(30), 60)],
            &[
                UnlockRecord::hardcore(ach(1), ts(20)),
                UnlockRecord::hardcore(ach(2), ts(300)),
                UnlockRecord::softcore(ach(3), ts(310)),
            ],
        );
        let (start, end) = (ts(10), ts(305));
        let overlapping: i64 = timeline
            .sessions()
            .iter()
            .filter(|s| s.end_time >= start && s.start_time <= end)
            .map(|s| (s.end_time.min(end) - s.start_time.max(start)).num_seconds())
            .sum();

        for mode in [UnlockMode::Softcore, UnlockMode::Hardcore] {
            let total = playtime(&timeline, Some(start), Some(end), mode).unwrap_or(0);
            assert!(total <= overlapping, "{mode}: {total} > {overlapping}");
        }
    }

    #[test]
    fn test_empty_timeline_unknown() {
        let timeline = Timeline::default();

        assert_eq!(playtime(&timeline, None, None, UnlockMode::Hardcore), None);
    }
}
