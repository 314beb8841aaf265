//! Interaction state for one radar view session.
//!
//! The controller owns the detail-panel selection, the temporarily focused
//! sector and the display settings. It never mutates items: the three
//! outward intents are handed to a host-provided [`RadarIntents`]
//! implementation and the panel closes afterwards.

use crate::layout::Blip;
use crate::model::{ItemId, Sector};
use crate::settings::{DisplaySettings, SettingChange};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const FOCUS_CLEAR_DELAY: Duration = Duration::from_secs(2);
pub const QUICK_CAPTURE_KEY: char = 'c';

/// Host callbacks. Fire-and-forget: the controller never waits on them.
pub trait RadarIntents {
    fn mark_item_done(&mut self, id: &str);
    fn request_item_details(&mut self, id: &str);
    fn request_quick_capture(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Closed,
    Open(ItemId),
}

#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    panel: Panel,
    focused_sector: Option<Sector>,
    settings: DisplaySettings,
}

impl InteractionState {
    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn selected_blip_id(&self) -> Option<&str> {
        match &self.panel {
            Panel::Open(id) => Some(id),
            Panel::Closed => None,
        }
    }

    pub fn focused_sector(&self) -> Option<Sector> {
        self.focused_sector
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadarKey {
    Char(char),
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
    /// Escape with the panel already closed: the enclosing view should close.
    CloseView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeOutcome {
    PanelClosed,
    Forwarded,
}

#[derive(Debug)]
pub struct InteractionController {
    state: InteractionState,
    focus_delay: Duration,
    focus_deadline: Option<Instant>,
    live: HashSet<ItemId>,
}

impl Default for InteractionController {
    fn default() -> Self {
        InteractionController::new(DisplaySettings::default())
    }
}

impl InteractionController {
    pub fn new(settings: DisplaySettings) -> Self {
        InteractionController {
            state: InteractionState {
                settings,
                ..InteractionState::default()
            },
            focus_delay: FOCUS_CLEAR_DELAY,
            focus_deadline: None,
            live: HashSet::new(),
        }
    }

    pub fn with_focus_delay(mut self, delay: Duration) -> Self {
        self.focus_delay = delay;
        self
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.state.settings
    }

    pub fn focus_deadline(&self) -> Option<Instant> {
        self.focus_deadline
    }

    pub fn is_live(&self, id: &str) -> bool {
        self.live.contains(id)
    }

    /// Records the ids of the latest layout pass. Closes the panel and
    /// returns `true` when the selected blip is no longer among them.
    pub fn sync_layout(&mut self, blips: &[Blip]) -> bool {
        self.live = blips.iter().map(|b| b.id.clone()).collect();
        let stale = matches!(&self.state.panel, Panel::Open(id) if !self.live.contains(id));
        if stale {
            debug!("selected blip vanished, closing panel");
            self.state.panel = Panel::Closed;
        }
        stale
    }

    /// Toggles the panel for `id`. A different blip replaces the current
    /// selection directly; unknown ids are ignored.
    pub fn click_blip(&mut self, id: &str) -> &Panel {
        if !self.is_live(id) {
            return &self.state.panel;
        }
        self.state.panel = match &self.state.panel {
            Panel::Open(current) if current == id => Panel::Closed,
            _ => Panel::Open(id.to_string()),
        };
        &self.state.panel
    }

    pub fn escape(&mut self) -> EscapeOutcome {
        if self.state.panel == Panel::Closed {
            return EscapeOutcome::Forwarded;
        }
        self.state.panel = Panel::Closed;
        EscapeOutcome::PanelClosed
    }

    /// Highlights `sector` until `now + delay`. Any pending expiry is
    /// replaced, so only one focus timer is ever live.
    pub fn focus_sector(&mut self, sector: Sector, now: Instant) {
        self.state.focused_sector = Some(sector);
        self.focus_deadline = Some(now + self.focus_delay);
    }

    /// Clears an expired focus. Returns `true` if it cleared one.
    pub fn poll_focus(&mut self, now: Instant) -> bool {
        match self.focus_deadline {
            Some(deadline) if now >= deadline => {
                self.focus_deadline = None;
                self.state.focused_sector = None;
                true
            }
            _ => false,
        }
    }

    pub fn apply_setting(&mut self, change: SettingChange) {
        self.state.settings.apply(change);
    }

    pub fn mark_done(&mut self, id: &str, intents: &mut dyn RadarIntents) -> bool {
        if !self.is_live(id) {
            debug!(id, "ignoring mark-done for unknown blip");
            return false;
        }
        info!(id, "mark done requested");
        intents.mark_item_done(id);
        self.state.panel = Panel::Closed;
        true
    }

    pub fn view_details(&mut self, id: &str, intents: &mut dyn RadarIntents) -> bool {
        if !self.is_live(id) {
            debug!(id, "ignoring details request for unknown blip");
            return false;
        }
        intents.request_item_details(id);
        self.state.panel = Panel::Closed;
        true
    }

    pub fn mark_selected_done(&mut self, intents: &mut dyn RadarIntents) -> bool {
        match self.state.selected_blip_id().map(str::to_string) {
            Some(id) => self.mark_done(&id, intents),
            None => false,
        }
    }

    pub fn view_selected_details(&mut self, intents: &mut dyn RadarIntents) -> bool {
        match self.state.selected_blip_id().map(str::to_string) {
            Some(id) => self.view_details(&id, intents),
            None => false,
        }
    }

    pub fn open_quick_capture(&mut self, intents: &mut dyn RadarIntents) {
        intents.request_quick_capture();
        self.state.panel = Panel::Closed;
    }

    /// Routes the radar's keyboard surface. Nothing is handled while a
    /// text field has focus.
    pub fn handle_key(
        &mut self,
        key: RadarKey,
        text_input_focused: bool,
        now: Instant,
        intents: &mut dyn RadarIntents,
    ) -> KeyOutcome {
        if text_input_focused {
            return KeyOutcome::Ignored;
        }
        match key {
            RadarKey::Escape => match self.escape() {
                EscapeOutcome::PanelClosed => KeyOutcome::Handled,
                EscapeOutcome::Forwarded => KeyOutcome::CloseView,
            },
            RadarKey::Char(ch) if ch.eq_ignore_ascii_case(&QUICK_CAPTURE_KEY) => {
                self.open_quick_capture(intents);
                KeyOutcome::Handled
            }
            RadarKey::Char(ch) => match Sector::from_shortcut(ch) {
                Some(sector) => {
                    self.focus_sector(sector, now);
                    KeyOutcome::Handled
                }
                None => KeyOutcome::Ignored,
            },
        }
    }

    /// Teardown: drops the selection and cancels the focus expiry.
    pub fn close(&mut self) {
        self.state.panel = Panel::Closed;
        self.state.focused_sector = None;
        self.focus_deadline = None;
    }
}
