//! Unlock and marker attachment.
//!
//! Walks unlocks chronologically and places each one on the timeline:
//! 1. A recorded session whose window contains the unlock takes it
//! 2. Otherwise a synthesized session of the same kind and achievement set
//!    absorbs it if the unlock lies within the merge window of its edges;
//!    the session is widened to cover the unlock
//! 3. Otherwise a new zero-length session is created at the unlock
//!
//! Delegated unlocks synthesize `ManualUnlock` sessions with a 1 hour merge
//! window; everything else synthesizes `Reconstructed` sessions with a
//! 4 hour window (see [`TimelineConfig`](crate::timeline::TimelineConfig)).

use chrono::{DateTime, Duration, Utc};

use crate::event::{Event, Unlock};
use crate::records::UnlockRecord;
use crate::session::{GeneratedKind, Session};
use crate::timeline::TimelineBuilder;
use crate::types::SetScope;

impl TimelineBuilder {
    /// Attaches a batch of unlocks.
    ///
    /// Records are processed by their earliest unlock instant (ties by
    /// achievement id), so the input may be in any order. Records with no
    /// unlock timestamp at all are skipped.
    pub fn attach_unlocks(&mut self, unlocks: &[UnlockRecord]) {
        let mut ordered: Vec<(DateTime<Utc>, &UnlockRecord)> = unlocks
            .iter()
            .filter_map(|record| record.earliest().map(|at| (at, record)))
            .collect();
        ordered.sort_by_key(|(at, record)| (*at, record.achievement_id));

        for (_, record) in ordered {
            self.attach_unlock(record);
        }
    }

    /// Attaches a single unlock record.
    ///
    /// A hardcore unlock emits a hardcore event; if the softcore timestamp
    /// differs, a second softcore event is emitted at that timestamp too.
    pub fn attach_unlock(&mut self, record: &UnlockRecord) {
        match (record.unlocked_hardcore_at, record.unlocked_at) {
            (Some(hardcore_at), softcore_at) => {
                self.attach_unlock_event(record, hardcore_at, true);
                if let Some(softcore_at) = softcore_at.filter(|at| *at != hardcore_at) {
                    self.attach_unlock_event(record, softcore_at, false);
                }
            }
            (None, Some(softcore_at)) => self.attach_unlock_event(record, softcore_at, false),
            (None, None) => {
                tracing::trace!(
                    achievement_id = %record.achievement_id,
                    "skipping unlock record without timestamps"
                );
            }
        }
    }

    /// Attaches a caller-supplied marker, e.g. a progress reset.
    ///
    /// Recorded sessions are tried first; otherwise a session of `kind` is
    /// merged into or created.
    pub fn add_custom_event(
        &mut self,
        at: DateTime<Utc>,
        header: impl Into<String>,
        description: impl Into<String>,
        kind: GeneratedKind,
    ) {
        let index = self.resolve_session(at, kind, SetScope::Any);
        self.sessions[index]
            .events
            .push(Event::custom(at, header, description));
    }

    fn attach_unlock_event(&mut self, record: &UnlockRecord, at: DateTime<Utc>, hardcore: bool) {
        let hardcore_later = !hardcore && record.unlocked_hardcore_at.is_some_and(|h| at < h);
        let event = Event::unlock(
            at,
            Unlock {
                achievement_id: record.achievement_id,
                hardcore,
                hardcore_later,
                unlocker: record.unlocker.clone(),
                achievement: record.achievement.clone(),
            },
        );

        let index = self.resolve_session(at, record.generated_kind(), record.achievement_set);
        self.sessions[index].events.push(event);
    }

    /// Finds or creates the session that should own an event at `at`.
    ///
    /// Returns its index in the (still sorted) session list.
    fn resolve_session(&mut self, at: DateTime<Utc>, kind: GeneratedKind, scope: SetScope) -> usize {
        if let Some(index) = self
            .sessions
            .iter()
            .position(|s| s.kind.is_recorded() && s.contains(at))
        {
            return index;
        }

        let window = self.config.merge_window(kind);
        if let Some(index) = self.sessions.iter().position(|s| {
            kind.matches(&s.kind) && s.scope.accepts(scope) && within_merge_window(s, at, window)
        }) {
            tracing::trace!(%at, kind = %self.sessions[index].kind, "merging into synthesized session");
            if self.sessions[index].widen_to(at) {
                return self.reposition(index);
            }
            return index;
        }

        tracing::trace!(%at, ?kind, "creating synthesized session");
        let session = Session::generated(kind, at, scope);
        let index = self.sessions.partition_point(|s| s.start_time <= at);
        self.sessions.insert(index, session);
        index
    }

    /// Moves a session whose start moved earlier back into sorted position.
    fn reposition(&mut self, index: usize) -> usize {
        let session = self.sessions.remove(index);
        let target = self
            .sessions
            .partition_point(|s| s.start_time <= session.start_time);
        self.sessions.insert(target, session);
        target
    }
}

/// Whether `at` lies strictly within `window` of the session's edges.
fn within_merge_window(session: &Session, at: DateTime<Utc>, window: Duration) -> bool {
    session.start_time - window < at && at < session.end_time + window
}
