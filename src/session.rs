use crate::clock::ClockTicker;
use crate::controller::InteractionController;
use crate::layout::{Blip, LayoutEngine};
use crate::model::Item;
use crate::settings::{DisplaySettings, SettingChange};
use chrono::{DateTime, Utc};
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollOutcome {
    pub ticked: bool,
    pub focus_cleared: bool,
}

/// One open radar view: the engine, the controller and the ticker, plus the
/// latest layout pass. Timers are released by [`RadarSession::close`], which
/// also runs on drop.
#[derive(Debug)]
pub struct RadarSession {
    engine: LayoutEngine,
    controller: InteractionController,
    ticker: ClockTicker,
    items: Vec<Item>,
    blips: Vec<Blip>,
    now: DateTime<Utc>,
    open: bool,
}

impl RadarSession {
    pub fn open(
        engine: LayoutEngine,
        controller: InteractionController,
        mut ticker: ClockTicker,
        items: Vec<Item>,
        now: DateTime<Utc>,
        started: Instant,
    ) -> Self {
        ticker.start(started);
        let mut session = RadarSession {
            engine,
            controller,
            ticker,
            items,
            blips: Vec::new(),
            now,
            open: true,
        };
        session.relayout();
        info!(items = session.items.len(), "radar session opened");
        session
    }

    pub fn blips(&self) -> &[Blip] {
        &self.blips
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn engine(&self) -> &LayoutEngine {
        &self.engine
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut InteractionController {
        &mut self.controller
    }

    pub fn ticker(&self) -> &ClockTicker {
        &self.ticker
    }

    pub fn settings(&self) -> &DisplaySettings {
        self.controller.settings()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// New item collections from the host.
    pub fn set_items(&mut self, items: Vec<Item>) {
        self.items = items;
        self.relayout();
    }

    pub fn refresh(&mut self, now: DateTime<Utc>) {
        self.now = now;
        self.relayout();
    }

    pub fn apply_setting(&mut self, change: SettingChange) {
        self.controller.apply_setting(change);
        if DisplaySettings::changes_layout(change) {
            self.relayout();
        }
    }

    /// Drives both timers. `wall` is only read when the ticker fires.
    pub fn poll(&mut self, instant: Instant, wall: impl FnOnce() -> DateTime<Utc>) -> PollOutcome {
        if !self.open {
            return PollOutcome::default();
        }
        let ticked = self.ticker.poll(instant);
        if ticked {
            debug!("clock tick");
            self.refresh(wall());
        }
        let focus_cleared = self.controller.poll_focus(instant);
        PollOutcome {
            ticked,
            focus_cleared,
        }
    }

    /// The view stopped being visible: no ticks until [`RadarSession::resume`].
    pub fn suspend(&mut self) {
        self.ticker.stop();
    }

    pub fn resume(&mut self, instant: Instant, now: DateTime<Utc>) {
        if !self.open {
            return;
        }
        self.ticker.start(instant);
        self.refresh(now);
    }

    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.ticker.stop();
        self.controller.close();
        self.open = false;
        info!("radar session closed");
    }

    fn relayout(&mut self) {
        self.blips = self
            .engine
            .compute(&self.items, self.now, self.controller.settings());
        self.controller.sync_layout(&self.blips);
    }
}

impl Drop for RadarSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Sector};
    use crate::settings::BlipScale;
    use crate::urgency::UrgencyBand;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use std::time::Duration;

    fn wall() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 8, 0, 0).unwrap()
    }

    fn session(items: Vec<Item>, t0: Instant) -> RadarSession {
        RadarSession::open(
            LayoutEngine::default(),
            InteractionController::default(),
            ClockTicker::new(Duration::from_secs(60)),
            items,
            wall(),
            t0,
        )
    }

    #[test]
    fn tick_moves_item_across_band() {
        let t0 = Instant::now();
        let due = wall() + ChronoDuration::minutes(61);
        let mut s = session(
            vec![Item::new("t", "Ship", Category::Task).with_timestamp(due)],
            t0,
        );
        assert_eq!(s.blips()[0].band, UrgencyBand::Today);

        let out = s.poll(t0 + Duration::from_secs(60), || wall() + ChronoDuration::minutes(1));
        assert!(out.ticked);
        assert_eq!(s.blips()[0].band, UrgencyBand::Now);
    }

    #[test]
    fn suspended_session_does_not_tick() {
        let t0 = Instant::now();
        let mut s = session(Vec::new(), t0);
        s.suspend();
        let out = s.poll(t0 + Duration::from_secs(600), wall);
        assert!(!out.ticked);
        s.resume(t0 + Duration::from_secs(600), wall());
        assert!(s.ticker().is_running());
    }

    #[test]
    fn removing_selected_item_closes_panel() {
        let t0 = Instant::now();
        let mut s = session(vec![Item::new("a", "A", Category::Event)], t0);
        s.controller_mut().click_blip("a");
        assert_eq!(s.controller().state().selected_blip_id(), Some("a"));
        s.set_items(Vec::new());
        assert_eq!(s.controller().state().selected_blip_id(), None);
    }

    #[test]
    fn scale_change_resizes_blips() {
        let t0 = Instant::now();
        let mut s = session(vec![Item::new("n", "N", Category::Note)], t0);
        let before = s.blips()[0].size;
        s.apply_setting(SettingChange::SetBlipScale(BlipScale::Large));
        assert!(s.blips()[0].size > before);
    }

    #[test]
    fn close_releases_both_timers() {
        let t0 = Instant::now();
        let mut s = session(Vec::new(), t0);
        s.controller_mut().focus_sector(Sector::Tasks, t0);
        s.close();
        assert!(!s.ticker().is_running());
        assert_eq!(s.controller().focus_deadline(), None);
        assert!(!s.poll(t0 + Duration::from_secs(120), wall).ticked);
    }
}
