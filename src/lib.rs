//! Urgency radar: positions tasks, events and notes on a circular display by
//! how soon they are due, and tracks the interaction state of one view.

pub mod clock;
pub mod config;
pub mod controller;
pub mod layout;
pub mod model;
pub mod projector;
pub mod records;
pub mod sector;
pub mod session;
pub mod settings;
pub mod storage;
pub mod urgency;

pub use clock::ClockTicker;
pub use config::{ConfigError, RadarConfig};
pub use controller::{
    EscapeOutcome, InteractionController, InteractionState, KeyOutcome, Panel, RadarIntents,
    RadarKey,
};
pub use layout::{compute_layout, Blip, LayoutEngine};
pub use model::{Category, Item, ItemId, Priority, Sector};
pub use projector::{project, Point, Rings};
pub use records::{ItemStore, NewItem, StoreError};
pub use session::{PollOutcome, RadarSession};
pub use settings::{BlipScale, DisplaySettings, SettingChange};
pub use urgency::{classify, Thresholds, UrgencyBand};
