use std::time::Duration;

use folio_protocol::{EnergyLine, HostCommand, LineId, Orientation};
use tracing::{debug, trace};

use crate::config::AmbientConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Never activated, or activated without a container.
    Idle,
    Running { next_spawn_at: Duration },
    /// Repeating schedule cancelled; pending removals still honored.
    Stopped,
}

#[derive(Debug, Clone, Copy)]
struct PendingRemoval {
    id: LineId,
    expires_at: Duration,
}

/// Periodic generator of transient [`EnergyLine`]s.
///
/// Time is supplied by the host as a monotonic `Duration`, which keeps the
/// scheduler deterministic under test. Two drive modes are supported:
///
/// - **Timer-driven** (browser): the host calls [`spawn`](Self::spawn) from
///   its repeating timer and [`retire`](Self::retire) from a one-shot timer
///   it arms per line.
/// - **Clock-driven** (terminal, tests): the host calls
///   [`advance`](Self::advance), which emits spawns and removals in
///   chronological order.
///
/// Every attached line has exactly one pending removal, so the number of
/// live lines never exceeds [`live_bound`](Self::live_bound).
#[derive(Debug, Clone)]
pub struct AmbientScheduler {
    config: AmbientConfig,
    state: State,
    pending: Vec<PendingRemoval>,
    next_id: u64,
    last_spawn_at: Option<Duration>,
}

impl AmbientScheduler {
    pub fn new(config: AmbientConfig) -> Self {
        Self {
            config,
            state: State::Idle,
            pending: Vec::new(),
            next_id: 0,
            last_spawn_at: None,
        }
    }

    pub fn config(&self) -> &AmbientConfig {
        &self.config
    }

    /// Start the repeating schedule and spawn the first line right away.
    ///
    /// Without a host container the scheduler stays idle: the decorative
    /// layer is optional. Activating an already running scheduler is a
    /// no-op.
    pub fn activate(
        &mut self,
        now: Duration,
        container_present: bool,
        rng: &mut fastrand::Rng,
    ) -> Vec<HostCommand> {
        if !container_present {
            debug!("ambient container missing; scheduler stays idle");
            return Vec::new();
        }
        if self.is_running() {
            return Vec::new();
        }
        self.state = State::Running {
            next_spawn_at: now,
        };
        self.spawn(now, rng).into_iter().collect()
    }

    /// Cancel the repeating schedule. Lines already attached keep their
    /// pending removal.
    pub fn deactivate(&mut self) {
        if self.is_running() {
            debug!(live = self.pending.len(), "ambient scheduler stopped");
        }
        self.state = State::Stopped;
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running { .. })
    }

    /// Synthesize one line at `now` and attach it. `None` unless running.
    pub fn spawn(&mut self, now: Duration, rng: &mut fastrand::Rng) -> Option<HostCommand> {
        if !self.is_running() {
            return None;
        }
        let line = self.synthesize(rng);
        self.pending.push(PendingRemoval {
            id: line.id,
            expires_at: now + line.lifetime(),
        });
        self.last_spawn_at = Some(now);
        self.state = State::Running {
            next_spawn_at: now + self.config.period().max(Duration::from_millis(1)),
        };
        trace!(
            line = %line.id,
            orientation = line.orientation.as_str(),
            lifetime_ms = line.lifetime().as_millis() as u64,
            "energy line attached"
        );
        Some(HostCommand::AttachLine { line })
    }

    /// Release the removal for `id`. Unknown or already retired ids are a
    /// harmless no-op, so late timers after teardown are fine.
    pub fn retire(&mut self, id: LineId) -> Option<HostCommand> {
        let index = self.pending.iter().position(|p| p.id == id)?;
        self.pending.swap_remove(index);
        trace!(line = %id, "energy line detached");
        Some(HostCommand::DetachLine { id })
    }

    /// Run every spawn and removal due up to `now`, oldest first. A removal
    /// due at the same instant as a spawn is emitted before it.
    pub fn advance(&mut self, now: Duration, rng: &mut fastrand::Rng) -> Vec<HostCommand> {
        let mut commands = Vec::new();
        loop {
            let next_expiry = self
                .earliest_removal()
                .filter(|removal| removal.expires_at <= now);
            let next_spawn = match self.state {
                State::Running { next_spawn_at } if next_spawn_at <= now => Some(next_spawn_at),
                _ => None,
            };

            match (next_expiry, next_spawn) {
                (Some(removal), Some(spawn_at)) if removal.expires_at <= spawn_at => {
                    commands.extend(self.retire(removal.id));
                }
                (_, Some(spawn_at)) => commands.extend(self.spawn(spawn_at, rng)),
                (Some(removal), None) => commands.extend(self.retire(removal.id)),
                (None, None) => break,
            }
        }
        commands
    }

    /// Number of attached lines not yet removed.
    pub fn live_count(&self) -> usize {
        self.pending.len()
    }

    /// Upper bound on concurrently live lines: `ceil(max_lifetime / period) + 1`.
    pub fn live_bound(&self) -> usize {
        let period = self.config.period_ms.max(1);
        let lifetime = self
            .config
            .max_duration_ms
            .saturating_add(self.config.max_delay_ms);
        usize::try_from(lifetime.div_ceil(period))
            .unwrap_or(usize::MAX)
            .saturating_add(1)
    }

    pub fn last_spawn_at(&self) -> Option<Duration> {
        self.last_spawn_at
    }

    /// Earliest instant at which [`advance`](Self::advance) has work to do.
    pub fn next_deadline(&self) -> Option<Duration> {
        let spawn = match self.state {
            State::Running { next_spawn_at } => Some(next_spawn_at),
            _ => None,
        };
        let expiry = self.earliest_removal().map(|r| r.expires_at);
        match (spawn, expiry) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn earliest_removal(&self) -> Option<PendingRemoval> {
        self.pending.iter().copied().min_by_key(|p| p.expires_at)
    }

    fn synthesize(&mut self, rng: &mut fastrand::Rng) -> EnergyLine {
        let config = &self.config;
        let id = LineId(self.next_id);
        self.next_id += 1;

        let orientation = if rng.bool() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };
        let position_pct = config.min_position_pct
            + rng.f64() * (config.max_position_pct - config.min_position_pct);
        let duration = Duration::from_millis(rng.u64(config.min_duration_ms..=config.max_duration_ms));
        let delay = Duration::from_millis(rng.u64(config.min_delay_ms..=config.max_delay_ms));

        EnergyLine {
            id,
            orientation,
            position_pct,
            duration,
            delay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn running(rng: &mut fastrand::Rng) -> (AmbientScheduler, Vec<HostCommand>) {
        let mut scheduler = AmbientScheduler::new(AmbientConfig::default());
        let commands = scheduler.activate(ms(0), true, rng);
        (scheduler, commands)
    }

    fn attached(commands: &[HostCommand]) -> Vec<&EnergyLine> {
        commands
            .iter()
            .filter_map(|c| match c {
                HostCommand::AttachLine { line } => Some(line),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn activation_spawns_immediately() {
        let mut rng = fastrand::Rng::with_seed(1);
        let (scheduler, commands) = running(&mut rng);
        assert_eq!(attached(&commands).len(), 1);
        assert_eq!(scheduler.live_count(), 1);
        // Whichever comes first: the line's removal or the next tick at 5s.
        let deadline = scheduler.next_deadline().unwrap_or_default();
        assert!((ms(3_000)..=ms(5_000)).contains(&deadline));
    }

    #[test]
    fn missing_container_keeps_scheduler_idle() {
        let mut rng = fastrand::Rng::with_seed(2);
        let mut scheduler = AmbientScheduler::new(AmbientConfig::default());
        assert!(scheduler.activate(ms(0), false, &mut rng).is_empty());
        assert!(!scheduler.is_running());
        assert!(scheduler.advance(ms(60_000), &mut rng).is_empty());
        assert_eq!(scheduler.spawn(ms(60_000), &mut rng), None);
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn double_activation_is_noop() {
        let mut rng = fastrand::Rng::with_seed(3);
        let (mut scheduler, _) = running(&mut rng);
        assert!(scheduler.activate(ms(10), true, &mut rng).is_empty());
        assert_eq!(scheduler.live_count(), 1);
    }

    #[test]
    fn synthesized_lines_stay_in_range() {
        let mut rng = fastrand::Rng::with_seed(4);
        let (mut scheduler, _) = running(&mut rng);
        let mut horizontal = 0;
        for tick in 1..=500u64 {
            let Some(HostCommand::AttachLine { line }) = scheduler.spawn(ms(tick * 5_000), &mut rng)
            else {
                unreachable!("running scheduler must spawn");
            };
            assert!((10.0..=90.0).contains(&line.position_pct));
            assert!((ms(3_000)..=ms(6_000)).contains(&line.duration));
            assert!(line.delay <= ms(2_000));
            if line.orientation == Orientation::Horizontal {
                horizontal += 1;
            }
            scheduler.retire(line.id);
        }
        // Both orientations show up in a reasonable mix.
        assert!((150..350).contains(&horizontal), "horizontal = {horizontal}");
    }

    #[test]
    fn ids_are_unique() {
        let mut rng = fastrand::Rng::with_seed(5);
        let (mut scheduler, first) = running(&mut rng);
        let commands = scheduler.advance(ms(30_000), &mut rng);
        let mut ids: Vec<LineId> = attached(&first)
            .into_iter()
            .chain(attached(&commands))
            .map(|l| l.id)
            .collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert_eq!(total, 7);
    }

    #[test]
    fn live_lines_stay_bounded_and_drain() {
        let mut rng = fastrand::Rng::with_seed(6);
        let (mut scheduler, _) = running(&mut rng);
        assert_eq!(scheduler.live_bound(), 3);

        for t in (0..=120_000u64).step_by(250) {
            scheduler.advance(ms(t), &mut rng);
            assert!(scheduler.live_count() <= scheduler.live_bound(), "at {t}ms");
        }

        scheduler.deactivate();
        let last = scheduler.last_spawn_at().unwrap_or_default();
        let drained = scheduler.advance(last + scheduler.config().max_lifetime(), &mut rng);
        assert!(
            drained
                .iter()
                .all(|c| matches!(c, HostCommand::DetachLine { .. }))
        );
        assert_eq!(scheduler.live_count(), 0);
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn removal_targets_only_its_line() {
        let mut rng = fastrand::Rng::with_seed(7);
        let (mut scheduler, _) = running(&mut rng);
        let Some(HostCommand::AttachLine { line }) = scheduler.spawn(ms(1_000), &mut rng) else {
            unreachable!("running scheduler must spawn");
        };
        assert_eq!(scheduler.live_count(), 2);
        assert_eq!(
            scheduler.retire(line.id),
            Some(HostCommand::DetachLine { id: line.id })
        );
        assert_eq!(scheduler.live_count(), 1);
        assert_eq!(scheduler.retire(line.id), None, "second removal is a no-op");
        assert_eq!(scheduler.live_count(), 1);
    }

    #[test]
    fn deactivate_cancels_spawning_but_honors_removals() {
        let mut rng = fastrand::Rng::with_seed(8);
        let (mut scheduler, first) = running(&mut rng);
        let line = attached(&first)[0].clone();
        scheduler.deactivate();

        assert_eq!(scheduler.spawn(ms(5_000), &mut rng), None);
        let commands = scheduler.advance(line.lifetime(), &mut rng);
        assert_eq!(commands, vec![HostCommand::DetachLine { id: line.id }]);
        assert!(scheduler.advance(ms(60_000), &mut rng).is_empty());
    }

    #[test]
    fn advance_orders_events_chronologically() {
        let mut rng = fastrand::Rng::with_seed(9);
        let (mut scheduler, first) = running(&mut rng);
        let first_line = attached(&first)[0].clone();

        // Jump far ahead in one call: every line attached in between must
        // also be detached, and each detach follows its attach.
        let commands = scheduler.advance(ms(40_000), &mut rng);
        let position = |target: &HostCommand| commands.iter().position(|c| c == target);
        assert!(position(&HostCommand::DetachLine { id: first_line.id }).is_some());
        for line in attached(&commands) {
            let attach = position(&HostCommand::AttachLine { line: line.clone() });
            if let Some(detach) = position(&HostCommand::DetachLine { id: line.id }) {
                assert!(attach < Some(detach));
            }
        }
        assert!(scheduler.live_count() <= scheduler.live_bound());
    }

    #[test]
    fn bound_follows_config() {
        let scheduler = AmbientScheduler::new(AmbientConfig {
            period_ms: 1_000,
            max_duration_ms: 2_500,
            max_delay_ms: 500,
            ..AmbientConfig::default()
        });
        assert_eq!(scheduler.live_bound(), 4);
    }

    #[test]
    fn bound_saturates_for_oversized_timings() {
        let scheduler = AmbientScheduler::new(AmbientConfig {
            period_ms: 1,
            max_duration_ms: u64::MAX,
            max_delay_ms: u64::MAX,
            ..AmbientConfig::default()
        });
        assert_eq!(scheduler.live_bound(), usize::MAX);
    }
}
