use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const SWEEP_SPEED_RANGE: RangeInclusive<f64> = 2.0..=16.0;
const DEFAULT_SWEEP_SPEED: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlipScale {
    Small,
    #[default]
    Medium,
    Large,
}

impl BlipScale {
    pub fn base_size(self) -> f64 {
        match self {
            BlipScale::Small => 1.5,
            BlipScale::Medium => 2.0,
            BlipScale::Large => 2.6,
        }
    }

    pub fn next(self) -> BlipScale {
        match self {
            BlipScale::Small => BlipScale::Medium,
            BlipScale::Medium => BlipScale::Large,
            BlipScale::Large => BlipScale::Small,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BlipScale::Small => "small",
            BlipScale::Medium => "medium",
            BlipScale::Large => "large",
        }
    }
}

/// Session-scoped display toggles. Fields are private so every write goes
/// through [`DisplaySettings::apply`], which keeps the sweep speed in range.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    sweep_enabled: bool,
    sweep_speed_seconds: f64,
    pulse_enabled: bool,
    grid_enabled: bool,
    blip_scale: BlipScale,
    labels_always_visible: bool,
    glow_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingChange {
    ToggleSweep,
    SetSweepSpeed(f64),
    AdjustSweepSpeed(f64),
    TogglePulse,
    ToggleGrid,
    SetBlipScale(BlipScale),
    CycleBlipScale,
    ToggleLabels,
    ToggleGlow,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            sweep_enabled: true,
            sweep_speed_seconds: DEFAULT_SWEEP_SPEED,
            pulse_enabled: true,
            grid_enabled: true,
            blip_scale: BlipScale::Medium,
            labels_always_visible: false,
            glow_enabled: true,
        }
    }
}

impl DisplaySettings {
    pub fn sweep_enabled(&self) -> bool {
        self.sweep_enabled
    }

    pub fn sweep_speed_seconds(&self) -> f64 {
        self.sweep_speed_seconds
    }

    pub fn pulse_enabled(&self) -> bool {
        self.pulse_enabled
    }

    pub fn grid_enabled(&self) -> bool {
        self.grid_enabled
    }

    pub fn blip_scale(&self) -> BlipScale {
        self.blip_scale
    }

    pub fn labels_always_visible(&self) -> bool {
        self.labels_always_visible
    }

    pub fn glow_enabled(&self) -> bool {
        self.glow_enabled
    }

    pub fn apply(&mut self, change: SettingChange) {
        match change {
            SettingChange::ToggleSweep => self.sweep_enabled = !self.sweep_enabled,
            SettingChange::SetSweepSpeed(secs) => self.set_sweep_speed(secs),
            SettingChange::AdjustSweepSpeed(delta) => {
                self.set_sweep_speed(self.sweep_speed_seconds + delta)
            }
            SettingChange::TogglePulse => self.pulse_enabled = !self.pulse_enabled,
            SettingChange::ToggleGrid => self.grid_enabled = !self.grid_enabled,
            SettingChange::SetBlipScale(scale) => self.blip_scale = scale,
            SettingChange::CycleBlipScale => self.blip_scale = self.blip_scale.next(),
            SettingChange::ToggleLabels => {
                self.labels_always_visible = !self.labels_always_visible
            }
            SettingChange::ToggleGlow => self.glow_enabled = !self.glow_enabled,
        }
    }

    pub fn with(mut self, change: SettingChange) -> Self {
        self.apply(change);
        self
    }

    // NaN leaves the current value untouched.
    fn set_sweep_speed(&mut self, secs: f64) {
        if secs.is_nan() {
            return;
        }
        self.sweep_speed_seconds = secs.clamp(*SWEEP_SPEED_RANGE.start(), *SWEEP_SPEED_RANGE.end());
    }

    pub fn changes_layout(change: SettingChange) -> bool {
        matches!(
            change,
            SettingChange::SetBlipScale(_) | SettingChange::CycleBlipScale
        )
    }
}
