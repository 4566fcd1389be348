use derivative::Derivative;
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
#[error("Unknown match state: {0}")]
pub struct UnknownMatchState(pub u8);

/// Phase of the match as reported by the arena. Sent over the wire as its integer value.
#[derive(Derivative, Serialize, Deserialize, Sequence)]
#[derivative(Debug, Default, PartialEq, Eq, Clone, Copy)]
#[serde(try_from = "u8", into = "u8")]
pub enum MatchState {
    #[derivative(Default)]
    PreMatch,
    StartMatch,
    WarmupPeriod,
    AutoPeriod,
    PausePeriod,
    TeleopPeriod,
    PostMatch,
    TimeoutActive,
    PostTimeout,
}

impl TryFrom<u8> for MatchState {
    type Error = UnknownMatchState;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::PreMatch,
            1 => Self::StartMatch,
            2 => Self::WarmupPeriod,
            3 => Self::AutoPeriod,
            4 => Self::PausePeriod,
            5 => Self::TeleopPeriod,
            6 => Self::PostMatch,
            7 => Self::TimeoutActive,
            8 => Self::PostTimeout,
            v => return Err(UnknownMatchState(v)),
        })
    }
}

impl From<MatchState> for u8 {
    fn from(state: MatchState) -> Self {
        match state {
            MatchState::PreMatch => 0,
            MatchState::StartMatch => 1,
            MatchState::WarmupPeriod => 2,
            MatchState::AutoPeriod => 3,
            MatchState::PausePeriod => 4,
            MatchState::TeleopPeriod => 5,
            MatchState::PostMatch => 6,
            MatchState::TimeoutActive => 7,
            MatchState::PostTimeout => 8,
        }
    }
}

impl MatchState {
    /// Text shown to the announcer for this phase
    pub fn label(self) -> &'static str {
        match self {
            Self::PreMatch => "PRE-MATCH",
            Self::StartMatch | Self::WarmupPeriod => "WARMUP",
            Self::AutoPeriod => "AUTONOMOUS",
            Self::PausePeriod => "PAUSE",
            Self::TeleopPeriod => "TELEOPERATED",
            Self::PostMatch => "POST-MATCH",
            Self::TimeoutActive => "TIMEOUT",
            Self::PostTimeout => "POST-TIMEOUT",
        }
    }

    /// Seconds left to show on the countdown, `match_time_sec` being the time since match start
    pub fn countdown_secs(self, match_time_sec: u32, timing: &MatchTiming) -> u32 {
        match self {
            Self::PreMatch | Self::StartMatch | Self::WarmupPeriod => timing.auto_duration_sec,
            Self::AutoPeriod => timing
                .warmup_duration_sec
                .saturating_add(timing.auto_duration_sec)
                .saturating_sub(match_time_sec),
            Self::PausePeriod => timing.teleop_duration_sec,
            Self::TeleopPeriod => timing
                .warmup_duration_sec
                .saturating_add(timing.auto_duration_sec)
                .saturating_add(timing.pause_duration_sec)
                .saturating_add(timing.teleop_duration_sec)
                .saturating_sub(match_time_sec),
            Self::TimeoutActive => timing.timeout_duration_sec.saturating_sub(match_time_sec),
            Self::PostMatch | Self::PostTimeout => 0,
        }
    }
}

/// Period lengths of a match, all in seconds
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MatchTiming {
    pub warmup_duration_sec: u32,
    pub auto_duration_sec: u32,
    pub pause_duration_sec: u32,
    pub teleop_duration_sec: u32,
    pub warning_remaining_duration_sec: u32,
    pub timeout_duration_sec: u32,
}

impl Default for MatchTiming {
    fn default() -> Self {
        Self {
            warmup_duration_sec: 0,
            auto_duration_sec: 15,
            pause_duration_sec: 2,
            teleop_duration_sec: 135,
            warning_remaining_duration_sec: 30,
            timeout_duration_sec: 0,
        }
    }
}

/// Current match phase and time since the match started
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MatchTime {
    pub match_state: MatchState,
    pub match_time_sec: u32,
}

/// Maps a match time to the phase label and countdown text shown on the display
pub fn translate_match_time(time: &MatchTime, timing: &MatchTiming) -> (&'static str, String) {
    let countdown = time.match_state.countdown_secs(time.match_time_sec, timing);
    (time.match_state.label(), countdown.to_string())
}
