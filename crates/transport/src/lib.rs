mod control;
mod tempo;

use serde::{Deserialize, Serialize};

pub use control::{Control, ControlChange};

pub const DEFAULT_BEATS_PER_MINUTE: f32 = 140.0;
pub const DEFAULT_NUMERATOR: u8 = 4;
pub const DEFAULT_DENOMINATOR: u8 = 4;

/// Which transport parameter a value or change refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportParam {
    BeatsPerMinute,
    DefaultNumerator,
    DefaultDenominator,
}

/// A single transport parameter together with its value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransportValue {
    BeatsPerMinute(f32),
    DefaultNumerator(u8),
    DefaultDenominator(u8),
}

impl TransportValue {
    pub fn param(&self) -> TransportParam {
        match self {
            TransportValue::BeatsPerMinute(_) => TransportParam::BeatsPerMinute,
            TransportValue::DefaultNumerator(_) => TransportParam::DefaultNumerator,
            TransportValue::DefaultDenominator(_) => TransportParam::DefaultDenominator,
        }
    }
}

/// A committed transport edit. `old` and `new` always carry the same variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportChange {
    pub old: TransportValue,
    pub new: TransportValue,
}

impl TransportChange {
    pub fn param(&self) -> TransportParam {
        self.new.param()
    }
}

/// Plain copy of every transport parameter.
///
/// This is what gets persisted and what the audio engine reads; it carries no
/// gesture or history state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransportSnapshot {
    #[serde(with = "tempo")]
    pub beats_per_minute: f32,
    #[serde(default = "default_numerator")]
    pub default_numerator: u8,
    #[serde(default = "default_denominator")]
    pub default_denominator: u8,
}

fn default_numerator() -> u8 {
    DEFAULT_NUMERATOR
}

fn default_denominator() -> u8 {
    DEFAULT_DENOMINATOR
}

impl Default for TransportSnapshot {
    fn default() -> Self {
        Self {
            beats_per_minute: DEFAULT_BEATS_PER_MINUTE,
            default_numerator: DEFAULT_NUMERATOR,
            default_denominator: DEFAULT_DENOMINATOR,
        }
    }
}

impl TransportSnapshot {
    pub fn apply(&mut self, value: TransportValue) {
        match value {
            TransportValue::BeatsPerMinute(v) => self.beats_per_minute = v,
            TransportValue::DefaultNumerator(v) => self.default_numerator = v,
            TransportValue::DefaultDenominator(v) => self.default_denominator = v,
        }
    }
}

/// Global playback parameters of a project.
#[derive(Debug, Clone)]
pub struct Transport {
    pub beats_per_minute: Control<f32>,
    pub default_numerator: Control<u8>,
    pub default_denominator: Control<u8>,
}

impl Default for Transport {
    fn default() -> Self {
        Self::from_snapshot(TransportSnapshot::default())
    }
}

impl Transport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: TransportSnapshot) -> Self {
        Self {
            beats_per_minute: Control::new(snapshot.beats_per_minute),
            default_numerator: Control::new(snapshot.default_numerator),
            default_denominator: Control::new(snapshot.default_denominator),
        }
    }

    /// Current values, including uncommitted live edits.
    pub fn snapshot(&self) -> TransportSnapshot {
        TransportSnapshot {
            beats_per_minute: self.beats_per_minute.get(),
            default_numerator: self.default_numerator.get(),
            default_denominator: self.default_denominator.get(),
        }
    }

    pub fn value(&self, param: TransportParam) -> TransportValue {
        match param {
            TransportParam::BeatsPerMinute => {
                TransportValue::BeatsPerMinute(self.beats_per_minute.get())
            }
            TransportParam::DefaultNumerator => {
                TransportValue::DefaultNumerator(self.default_numerator.get())
            }
            TransportParam::DefaultDenominator => {
                TransportValue::DefaultDenominator(self.default_denominator.get())
            }
        }
    }

    pub fn set_beats_per_minute(&mut self, value: f32, is_patch: bool) -> Option<TransportChange> {
        self.beats_per_minute
            .set(value, is_patch)
            .map(|c| TransportChange {
                old: TransportValue::BeatsPerMinute(c.old),
                new: TransportValue::BeatsPerMinute(c.new),
            })
    }

    pub fn set_default_numerator(&mut self, value: u8, is_patch: bool) -> Option<TransportChange> {
        self.default_numerator
            .set(value, is_patch)
            .map(|c| TransportChange {
                old: TransportValue::DefaultNumerator(c.old),
                new: TransportValue::DefaultNumerator(c.new),
            })
    }

    pub fn set_default_denominator(
        &mut self,
        value: u8,
        is_patch: bool,
    ) -> Option<TransportChange> {
        self.default_denominator
            .set(value, is_patch)
            .map(|c| TransportChange {
                old: TransportValue::DefaultDenominator(c.old),
                new: TransportValue::DefaultDenominator(c.new),
            })
    }

    /// Restore one parameter, e.g. while stepping through history.
    pub fn apply(&mut self, value: TransportValue) {
        match value {
            TransportValue::BeatsPerMinute(v) => self.beats_per_minute.restore(v),
            TransportValue::DefaultNumerator(v) => self.default_numerator.restore(v),
            TransportValue::DefaultDenominator(v) => self.default_denominator.restore(v),
        }
    }
}
