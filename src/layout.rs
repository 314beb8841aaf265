use crate::model::{Category, Item, ItemId, Priority, Sector};
use crate::projector::{Point, Rings};
use crate::settings::DisplaySettings;
use crate::urgency::{Thresholds, UrgencyBand};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

const URGENT_SIZE_FACTOR: f64 = 1.3;

/// One positioned marker. Rebuilt from scratch on every layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Blip {
    pub id: ItemId,
    pub category: Category,
    pub title: String,
    pub position: Point,
    pub angle: f64,
    pub size: f64,
    pub band: UrgencyBand,
    pub urgent: bool,
    pub source: Item,
}

impl Blip {
    pub fn sector(&self) -> Sector {
        self.category.sector()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutEngine {
    thresholds: Thresholds,
    rings: Rings,
}

impl LayoutEngine {
    pub fn new(thresholds: Thresholds, rings: Rings) -> Self {
        LayoutEngine { thresholds, rings }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn rings(&self) -> &Rings {
        &self.rings
    }

    /// Positions every item. Output is grouped by sector in
    /// [`Sector::ALL`] order; inside a sector the input order is kept.
    pub fn compute(
        &self,
        items: &[Item],
        now: DateTime<Utc>,
        settings: &DisplaySettings,
    ) -> Vec<Blip> {
        let base_size = settings.blip_scale().base_size();
        let mut keys = BlipKeys::new(items);
        let mut blips = Vec::with_capacity(items.len());
        for sector in Sector::ALL {
            let group: Vec<&Item> = items
                .iter()
                .filter(|item| item.category.sector() == sector)
                .collect();
            let angles = sector.arc().allocate(group.len());
            for (idx, (item, angle)) in group.into_iter().zip(angles).enumerate() {
                let band = self.thresholds.classify(item.timestamp, now);
                let urgent = band == UrgencyBand::Now || item.priority == Some(Priority::High);
                let size = if urgent {
                    base_size * URGENT_SIZE_FACTOR
                } else {
                    base_size
                };
                let id = if item.has_id() {
                    keys.claim(&item.id)
                } else {
                    keys.derive(synthetic_id(item.category, idx))
                };
                blips.push(Blip {
                    id,
                    category: item.category,
                    title: item.title.clone(),
                    position: self.rings.project(band, angle),
                    angle,
                    size,
                    band,
                    urgent,
                    source: item.clone(),
                });
            }
        }
        debug!(
            items = items.len(),
            urgent = blips.iter().filter(|b| b.urgent).count(),
            "layout pass"
        );
        blips
    }
}

pub fn compute_layout(
    items: &[Item],
    now: DateTime<Utc>,
    settings: &DisplaySettings,
) -> Vec<Blip> {
    LayoutEngine::default().compute(items, now, settings)
}

/// Hands out blip ids for one pass. Every real id is reserved up front so a
/// derived key never shadows a record that appears later in the input.
struct BlipKeys<'a> {
    reserved: HashSet<&'a str>,
    assigned: HashSet<ItemId>,
}

impl<'a> BlipKeys<'a> {
    fn new(items: &'a [Item]) -> Self {
        BlipKeys {
            reserved: items
                .iter()
                .filter(|i| i.has_id())
                .map(|i| i.id.as_str())
                .collect(),
            assigned: HashSet::new(),
        }
    }

    /// The item's own id, unless an earlier item already took it.
    fn claim(&mut self, id: &str) -> ItemId {
        if self.assigned.insert(id.to_string()) {
            return id.to_string();
        }
        debug!(id, "duplicate item id in layout input");
        self.derive(id.to_string())
    }

    fn derive(&mut self, base: ItemId) -> ItemId {
        let mut candidate = base.clone();
        let mut n = 1;
        while self.reserved.contains(candidate.as_str()) || self.assigned.contains(&candidate) {
            candidate = format!("{base}~{n}");
            n += 1;
        }
        self.assigned.insert(candidate.clone());
        candidate
    }
}

/// Stable key for an item that arrived without an id. `idx` is the item's
/// position inside its sector group, so it survives unrelated changes in
/// other sectors.
pub fn synthetic_id(category: Category, idx: usize) -> ItemId {
    format!("{}#{}", category.key(), idx)
}

/// Nearest blip within `tolerance` of `point`, if any.
pub fn blip_at(blips: &[Blip], point: Point, tolerance: f64) -> Option<&Blip> {
    blips
        .iter()
        .map(|b| (b, b.position.distance(&point)))
        .filter(|(b, d)| *d <= tolerance.max(b.size))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(b, _)| b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{BlipScale, SettingChange};
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 2, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_input_gives_empty_layout() {
        assert!(compute_layout(&[], now(), &DisplaySettings::default()).is_empty());
    }

    #[test]
    fn high_priority_is_urgent_even_when_later() {
        let items = vec![Item::new("p", "Plan", Category::Project).with_priority(Priority::High)];
        let blips = compute_layout(&items, now(), &DisplaySettings::default());
        assert_eq!(blips[0].band, UrgencyBand::Later);
        assert!(blips[0].urgent);
        assert_relative_eq!(blips[0].size, 2.0 * 1.3);
    }

    #[test]
    fn size_follows_blip_scale() {
        let items = vec![Item::new("n", "Idea", Category::Note)];
        let settings =
            DisplaySettings::default().with(SettingChange::SetBlipScale(BlipScale::Small));
        let blips = compute_layout(&items, now(), &settings);
        assert_relative_eq!(blips[0].size, 1.5);
    }

    #[test]
    fn projects_and_tasks_share_one_allocation() {
        let items = vec![
            Item::new("a", "A", Category::Task),
            Item::new("b", "B", Category::Project),
        ];
        let blips = compute_layout(&items, now(), &DisplaySettings::default());
        assert_relative_eq!(blips[0].angle, 10.0);
        assert_relative_eq!(blips[1].angle, 80.0);
    }

    #[test]
    fn missing_ids_get_distinct_synthetic_keys() {
        let items = vec![
            Item::new("", "first", Category::Inbox),
            Item::new("", "second", Category::Inbox),
        ];
        let blips = compute_layout(&items, now(), &DisplaySettings::default());
        assert_eq!(blips[0].id, "inbox#0");
        assert_eq!(blips[1].id, "inbox#1");
        let again = compute_layout(&items, now(), &DisplaySettings::default());
        assert_eq!(blips, again);
    }

    #[test]
    fn synthetic_key_skips_a_real_id_that_looks_like_one() {
        let items = vec![
            Item::new("", "untitled task", Category::Task),
            Item::new("task#0", "real note", Category::Note),
        ];
        let blips = compute_layout(&items, now(), &DisplaySettings::default());
        assert_eq!(blips[0].title, "untitled task");
        assert_eq!(blips[0].id, "task#0~1");
        assert_eq!(blips[1].id, "task#0");
    }

    #[test]
    fn repeated_real_ids_stay_distinct() {
        let items = vec![
            Item::new("dup", "first", Category::Event),
            Item::new("dup", "second", Category::Event),
            Item::new("dup~1", "third", Category::Inbox),
        ];
        let blips = compute_layout(&items, now(), &DisplaySettings::default());
        let ids: Vec<&str> = blips.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["dup", "dup~2", "dup~1"]);
    }

    #[test]
    fn hit_test_picks_nearest_blip() {
        let items = vec![
            Item::new("t", "T", Category::Task),
            Item::new("e", "E", Category::Event),
        ];
        let blips = compute_layout(&items, now(), &DisplaySettings::default());
        let near_task = Point {
            x: blips[0].position.x + 0.5,
            y: blips[0].position.y,
        };
        assert_eq!(blip_at(&blips, near_task, 3.0).map(|b| b.id.as_str()), Some("t"));
        assert!(blip_at(&blips, Point { x: 50.0, y: 50.0 }, 3.0).is_none());
    }

    fn category_strategy() -> impl Strategy<Value = Category> {
        prop::sample::select(Category::ALL.to_vec())
    }

    /// Blank, plain, repeated, or shaped like a derived key.
    fn id_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            "[a-c]{1,2}",
            (category_strategy(), 0usize..4).prop_map(|(c, i)| synthetic_id(c, i)),
            (category_strategy(), 0usize..3, 1usize..3)
                .prop_map(|(c, i, n)| format!("{}~{n}", synthetic_id(c, i))),
        ]
    }

    proptest! {
        #[test]
        fn one_blip_per_item(
            drafts in prop::collection::vec(
                (category_strategy(), -200i64..400, id_strategy()),
                0..60,
            )
        ) {
            let items: Vec<Item> = drafts
                .iter()
                .map(|(cat, hours, id)| {
                    Item::new(id.clone(), "x", *cat)
                        .with_timestamp(now() + Duration::hours(*hours))
                })
                .collect();
            let blips = compute_layout(&items, now(), &DisplaySettings::default());
            prop_assert_eq!(blips.len(), items.len());
            let mut ids: Vec<&str> = blips.iter().map(|b| b.id.as_str()).collect();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), items.len());
            for b in &blips {
                let (lo, hi) = b.sector().arc().usable();
                prop_assert!(b.angle >= lo - 1e-9 && b.angle <= hi + 1e-9);
                prop_assert!((0.0..=100.0).contains(&b.position.x));
                prop_assert!((0.0..=100.0).contains(&b.position.y));
            }
        }
    }
}
