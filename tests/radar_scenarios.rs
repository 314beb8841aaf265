//! End-to-end scenarios across the layout engine, controller and session.

use approx::assert_abs_diff_eq;
use chrono::{DateTime, Duration, TimeZone, Utc};
use radar::projector::ORIGIN;
use radar::{
    compute_layout, Category, ClockTicker, DisplaySettings, InteractionController, Item,
    LayoutEngine, Panel, RadarIntents, RadarSession, Rings, Sector, UrgencyBand,
};
use std::time::{Duration as StdDuration, Instant};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 15, 14, 0, 0).unwrap()
}

#[derive(Default)]
struct Recorder {
    calls: Vec<String>,
}

impl RadarIntents for Recorder {
    fn mark_item_done(&mut self, id: &str) {
        self.calls.push(format!("done:{id}"));
    }
    fn request_item_details(&mut self, id: &str) {
        self.calls.push(format!("details:{id}"));
    }
    fn request_quick_capture(&mut self) {
        self.calls.push("capture".to_string());
    }
}

#[test]
fn overdue_task_lands_on_inner_ring_at_sector_midpoint() {
    let items = vec![Item::new("t1", "Renew passport", Category::Task)
        .with_timestamp(now() - Duration::hours(1))];
    let blips = compute_layout(&items, now(), &DisplaySettings::default());

    assert_eq!(blips.len(), 1);
    let blip = &blips[0];
    assert_eq!(blip.band, UrgencyBand::Now);
    assert!(blip.urgent);
    assert_abs_diff_eq!(blip.angle, Sector::Tasks.arc().midpoint(), epsilon = 1e-9);

    let r = Rings::default().radius(UrgencyBand::Now);
    let dx = blip.position.x - ORIGIN;
    let dy = ORIGIN - blip.position.y;
    assert_abs_diff_eq!(dx.hypot(dy), r, epsilon = 1e-9);
    assert!(dx > 0.0 && dy > 0.0);
}

#[test]
fn events_split_across_bands_and_the_inset_span() {
    let items = vec![
        Item::new("e1", "Flight", Category::Event).with_timestamp(now() + Duration::hours(20)),
        Item::new("e2", "Conference", Category::Event).with_timestamp(now() + Duration::hours(200)),
    ];
    let blips = compute_layout(&items, now(), &DisplaySettings::default());

    assert_eq!(blips.len(), 2);
    assert_eq!(blips[0].id, "e1");
    assert_eq!(blips[0].band, UrgencyBand::Today);
    assert_eq!(blips[1].band, UrgencyBand::Later);

    let rings = Rings::default();
    let radius = |b: &radar::Blip| (b.position.x - ORIGIN).hypot(b.position.y - ORIGIN);
    assert_abs_diff_eq!(radius(&blips[0]), rings.radius(UrgencyBand::Today), epsilon = 1e-9);
    assert_abs_diff_eq!(radius(&blips[1]), rings.radius(UrgencyBand::Later), epsilon = 1e-9);

    let (lo, hi) = Sector::Events.arc().usable();
    assert_abs_diff_eq!(blips[0].angle, lo, epsilon = 1e-9);
    assert_abs_diff_eq!(blips[1].angle, hi, epsilon = 1e-9);
}

#[test]
fn layout_is_idempotent_for_a_frozen_clock() {
    let items: Vec<Item> = (0..12)
        .map(|i| {
            let category = Category::ALL[i % Category::ALL.len()];
            Item::new(format!("i{i}"), format!("item {i}"), category)
                .with_timestamp(now() + Duration::hours(i as i64 * 7 - 20))
        })
        .collect();
    let settings = DisplaySettings::default();
    assert_eq!(
        compute_layout(&items, now(), &settings),
        compute_layout(&items, now(), &settings)
    );
}

#[test]
fn ghost_mark_done_makes_no_outward_call() {
    let blips = compute_layout(
        &[Item::new("real", "Real", Category::Note)],
        now(),
        &DisplaySettings::default(),
    );
    let mut controller = InteractionController::default();
    controller.sync_layout(&blips);
    let mut recorder = Recorder::default();

    assert!(!controller.mark_done("ghost-id", &mut recorder));
    assert!(recorder.calls.is_empty());
}

#[test]
fn click_a_then_b_opens_b_without_closing() {
    let items = vec![
        Item::new("a", "A", Category::Inbox),
        Item::new("b", "B", Category::Inbox),
    ];
    let blips = compute_layout(&items, now(), &DisplaySettings::default());
    let mut controller = InteractionController::default();
    controller.sync_layout(&blips);

    let mut seen = vec![controller.click_blip("a").clone()];
    seen.push(controller.click_blip("b").clone());
    assert_eq!(seen, vec![Panel::Open("a".into()), Panel::Open("b".into())]);
    assert_eq!(controller.click_blip("b"), &Panel::Closed);
}

#[test]
fn session_tick_and_focus_expiry_share_one_poll() {
    let t0 = Instant::now();
    let due = now() + Duration::minutes(90);
    let mut session = RadarSession::open(
        LayoutEngine::default(),
        InteractionController::default().with_focus_delay(StdDuration::from_secs(2)),
        ClockTicker::new(StdDuration::from_secs(60)),
        vec![Item::new("t", "Call back", Category::Task).with_timestamp(due)],
        now(),
        t0,
    );
    assert_eq!(session.blips()[0].band, UrgencyBand::Today);

    session.controller_mut().focus_sector(Sector::Tasks, t0);
    let early = session.poll(t0 + StdDuration::from_secs(1), now);
    assert!(!early.ticked && !early.focus_cleared);

    let later = session.poll(t0 + StdDuration::from_secs(60), || now() + Duration::minutes(31));
    assert!(later.ticked);
    assert!(later.focus_cleared);
    assert_eq!(session.blips()[0].band, UrgencyBand::Now);
    assert_eq!(session.controller().state().focused_sector(), None);
}

#[test]
fn dropping_a_session_releases_its_timers() {
    let t0 = Instant::now();
    let mut session = RadarSession::open(
        LayoutEngine::default(),
        InteractionController::default(),
        ClockTicker::default(),
        Vec::new(),
        now(),
        t0,
    );
    session.controller_mut().focus_sector(Sector::Inbox, t0);
    session.close();
    assert!(!session.is_open());
    assert!(!session.ticker().is_running());
    assert!(session.controller().focus_deadline().is_none());
    drop(session);
}
