//! Messages exchanged with the arena server over the display websocket.
//!
//! Every frame is a JSON object of the form `{"type": "<name>", "data": <payload>}`. Incoming
//! frames are decoded into [`PushMessage`], outgoing ones are built from [`OutboundMessage`].

use crate::{
    bundles::RedBlueBundle,
    match_timing::{MatchTime, MatchTiming},
};
use log::debug;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Malformed message envelope: {0}")]
    Envelope(#[source] serde_json::Error),
    #[error("Invalid payload for `{kind}` message: {source}")]
    Payload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Team {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state_prov: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub rookie_year: i32,
    #[serde(default)]
    pub robot_name: String,
    #[serde(default)]
    pub accomplishments: String,
}

/// The three team slots of one alliance, `None` where no team is assigned
pub type AllianceTeams = [Option<Team>; 3];

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SetMatchWire {
    match_type: String,
    match_display_name: String,
    red1: Option<Team>,
    red2: Option<Team>,
    red3: Option<Team>,
    blue1: Option<Team>,
    blue2: Option<Team>,
    blue3: Option<Team>,
}

/// The match being set up, with the teams in each station
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "SetMatchWire")]
pub struct SetMatch {
    pub match_type: String,
    pub match_display_name: String,
    pub teams: RedBlueBundle<AllianceTeams>,
}

impl From<SetMatchWire> for SetMatch {
    fn from(wire: SetMatchWire) -> Self {
        Self {
            match_type: wire.match_type,
            match_display_name: wire.match_display_name,
            teams: RedBlueBundle {
                red: [wire.red1, wire.red2, wire.red3],
                blue: [wire.blue1, wire.blue2, wire.blue3],
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RealtimeScore {
    pub red_score: i32,
    pub blue_score: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ScoreSummary {
    pub auto_points: i32,
    pub teleop_points: i32,
    pub endgame_points: i32,
    pub foul_points: i32,
    pub score: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Foul {
    pub team_id: u32,
    pub rule: String,
    #[serde(default)]
    pub is_technical: bool,
    #[serde(default)]
    pub time_in_match_sec: f64,
    #[serde(default)]
    pub description: String,
}

/// Everything shown in one alliance's panel of the final results
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AllianceResult {
    pub score: ScoreSummary,
    pub fouls: Vec<Foul>,
    /// Team id to card color
    pub cards: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SetFinalScoreWire {
    match_type: String,
    match_display_name: String,
    red_score_summary: ScoreSummary,
    blue_score_summary: ScoreSummary,
    red_fouls: Option<Vec<Foul>>,
    blue_fouls: Option<Vec<Foul>>,
    red_cards: Option<BTreeMap<String, String>>,
    blue_cards: Option<BTreeMap<String, String>>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "SetFinalScoreWire")]
pub struct SetFinalScore {
    pub match_type: String,
    pub match_display_name: String,
    pub results: RedBlueBundle<AllianceResult>,
}

impl From<SetFinalScoreWire> for SetFinalScore {
    fn from(wire: SetFinalScoreWire) -> Self {
        Self {
            match_type: wire.match_type,
            match_display_name: wire.match_display_name,
            results: RedBlueBundle {
                red: AllianceResult {
                    score: wire.red_score_summary,
                    fouls: wire.red_fouls.unwrap_or_default(),
                    cards: wire.red_cards.unwrap_or_default(),
                },
                blue: AllianceResult {
                    score: wire.blue_score_summary,
                    fouls: wire.blue_fouls.unwrap_or_default(),
                    cards: wire.blue_cards.unwrap_or_default(),
                },
            },
        }
    }
}

/// Screen the audience display has been asked to show
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AudienceScreen {
    Blank,
    Intro,
    Match,
    Score,
    Logo,
    AllianceSelection,
    Timeout,
    Other(String),
}

impl From<String> for AudienceScreen {
    fn from(name: String) -> Self {
        match name.as_str() {
            "blank" => Self::Blank,
            "intro" => Self::Intro,
            "match" => Self::Match,
            "score" => Self::Score,
            "logo" => Self::Logo,
            "allianceSelection" => Self::AllianceSelection,
            "timeout" => Self::Timeout,
            _ => Self::Other(name),
        }
    }
}

impl From<AudienceScreen> for String {
    fn from(screen: AudienceScreen) -> Self {
        match screen {
            AudienceScreen::Blank => "blank".to_string(),
            AudienceScreen::Intro => "intro".to_string(),
            AudienceScreen::Match => "match".to_string(),
            AudienceScreen::Score => "score".to_string(),
            AudienceScreen::Logo => "logo".to_string(),
            AudienceScreen::AllianceSelection => "allianceSelection".to_string(),
            AudienceScreen::Timeout => "timeout".to_string(),
            AudienceScreen::Other(name) => name,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PushMessage {
    SetMatch(SetMatch),
    MatchTiming(MatchTiming),
    MatchTime(MatchTime),
    RealtimeScore(RealtimeScore),
    SetFinalScore(Box<SetFinalScore>),
    SetAudienceDisplay(AudienceScreen),
    Reload,
    Error(String),
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

fn payload<T: DeserializeOwned>(kind: &str, data: Value) -> Result<T, DecodeError> {
    serde_json::from_value(data).map_err(|source| DecodeError::Payload {
        kind: kind.to_string(),
        source,
    })
}

impl PushMessage {
    /// Decodes one websocket text frame. Returns `Ok(None)` for message types this display does
    /// not handle.
    pub fn decode(text: &str) -> Result<Option<Self>, DecodeError> {
        let Envelope { kind, data } = serde_json::from_str(text).map_err(DecodeError::Envelope)?;

        let msg = match kind.as_str() {
            "setMatch" => Self::SetMatch(payload(&kind, data)?),
            "matchTiming" => Self::MatchTiming(payload(&kind, data)?),
            "matchTime" => Self::MatchTime(payload(&kind, data)?),
            "realtimeScore" => Self::RealtimeScore(payload(&kind, data)?),
            "setFinalScore" => Self::SetFinalScore(Box::new(payload(&kind, data)?)),
            "setAudienceDisplay" => Self::SetAudienceDisplay(payload(&kind, data)?),
            "reload" => Self::Reload,
            "error" => Self::Error(payload(&kind, data)?),
            _ => {
                debug!("Ignoring message of unhandled type `{kind}`");
                return Ok(None);
            }
        };
        Ok(Some(msg))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetMatch(_) => "setMatch",
            Self::MatchTiming(_) => "matchTiming",
            Self::MatchTime(_) => "matchTime",
            Self::RealtimeScore(_) => "realtimeScore",
            Self::SetFinalScore(_) => "setFinalScore",
            Self::SetAudienceDisplay(_) => "setAudienceDisplay",
            Self::Reload => "reload",
            Self::Error(_) => "error",
        }
    }
}

/// Requests sent from the display back to the arena
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundMessage {
    SetAudienceDisplay(AudienceScreen),
}

#[derive(Serialize)]
struct OutboundEnvelope<'a, T> {
    #[serde(rename = "type")]
    kind: &'a str,
    data: T,
}

impl OutboundMessage {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::SetAudienceDisplay(screen) => serde_json::to_string(&OutboundEnvelope {
                kind: "setAudienceDisplay",
                data: screen,
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::match_timing::MatchState;
    use indoc::indoc;

    #[test]
    fn test_decode_set_match() {
        let text = indoc! {r#"
            {
                "type": "setMatch",
                "data": {
                    "MatchType": "Qualification",
                    "MatchDisplayName": "12",
                    "Red1": {"Id": 254, "Nickname": "The Cheesy Poofs", "Accomplishments": "Winner"},
                    "Red2": null,
                    "Red3": {"Id": 1114},
                    "Blue1": {"Id": 2056, "RookieYear": 2007},
                    "Blue2": null,
                    "Blue3": null
                }
            }
        "#};
        let Some(PushMessage::SetMatch(set_match)) = PushMessage::decode(text).unwrap() else {
            panic!("Expected a setMatch message");
        };
        assert_eq!(set_match.match_type, "Qualification");
        assert_eq!(set_match.match_display_name, "12");
        let red1 = set_match.teams.red[0].as_ref().unwrap();
        assert_eq!(red1.id, 254);
        assert_eq!(red1.nickname, "The Cheesy Poofs");
        assert_eq!(set_match.teams.red[1], None);
        assert_eq!(set_match.teams.red[2].as_ref().unwrap().name, "");
        assert_eq!(set_match.teams.blue[0].as_ref().unwrap().rookie_year, 2007);
        assert_eq!(set_match.teams.blue[1], None);
    }

    #[test]
    fn test_decode_missing_slot_is_empty() {
        let text = r#"{"type": "setMatch", "data": {"MatchType": "Practice", "MatchDisplayName": "P1"}}"#;
        let Some(PushMessage::SetMatch(set_match)) = PushMessage::decode(text).unwrap() else {
            panic!("Expected a setMatch message");
        };
        assert!(set_match.teams.iter().all(|(_, slots)| slots.iter().all(Option::is_none)));
    }

    #[test]
    fn test_decode_match_time() {
        let text = r#"{"type": "matchTime", "data": {"MatchState": 3, "MatchTimeSec": 7}}"#;
        assert_eq!(
            PushMessage::decode(text).unwrap(),
            Some(PushMessage::MatchTime(MatchTime {
                match_state: MatchState::AutoPeriod,
                match_time_sec: 7,
            }))
        );
    }

    #[test]
    fn test_decode_match_timing() {
        let text = indoc! {r#"
            {"type": "matchTiming", "data": {"WarmupDurationSec": 3, "AutoDurationSec": 15,
             "PauseDurationSec": 2, "TeleopDurationSec": 135, "WarningRemainingDurationSec": 30}}
        "#};
        let Some(PushMessage::MatchTiming(timing)) = PushMessage::decode(text).unwrap() else {
            panic!("Expected a matchTiming message");
        };
        assert_eq!(timing.warmup_duration_sec, 3);
        assert_eq!(timing.teleop_duration_sec, 135);
        assert_eq!(timing.timeout_duration_sec, 0);
    }

    #[test]
    fn test_decode_realtime_score() {
        let text = r#"{"type": "realtimeScore", "data": {"RedScore": 45, "BlueScore": 120}}"#;
        assert_eq!(
            PushMessage::decode(text).unwrap(),
            Some(PushMessage::RealtimeScore(RealtimeScore {
                red_score: 45,
                blue_score: 120,
            }))
        );
    }

    #[test]
    fn test_decode_set_final_score() {
        let text = indoc! {r#"
            {
                "type": "setFinalScore",
                "data": {
                    "MatchType": "Elimination",
                    "MatchDisplayName": "SF1-2",
                    "RedScoreSummary": {"AutoPoints": 10, "Score": 80},
                    "BlueScoreSummary": {"Score": 64},
                    "RedFouls": [{"TeamId": 254, "Rule": "G22", "IsTechnical": true,
                                  "TimeInMatchSec": 12.5, "Description": "Pinning"}],
                    "BlueFouls": null,
                    "RedCards": null,
                    "BlueCards": {"2056": "yellow", "1114": "red"}
                }
            }
        "#};
        let Some(PushMessage::SetFinalScore(final_score)) = PushMessage::decode(text).unwrap()
        else {
            panic!("Expected a setFinalScore message");
        };
        assert_eq!(final_score.match_type, "Elimination");
        assert_eq!(final_score.results.red.score.auto_points, 10);
        assert_eq!(final_score.results.red.score.score, 80);
        assert_eq!(final_score.results.red.fouls.len(), 1);
        assert_eq!(final_score.results.red.fouls[0].rule, "G22");
        assert!(final_score.results.red.cards.is_empty());
        assert!(final_score.results.blue.fouls.is_empty());
        let blue_cards: Vec<_> = final_score.results.blue.cards.keys().collect();
        assert_eq!(blue_cards, vec!["1114", "2056"]);
    }

    #[test]
    fn test_decode_audience_display() {
        let decode = |screen: &str| {
            PushMessage::decode(&format!(
                r#"{{"type": "setAudienceDisplay", "data": "{screen}"}}"#
            ))
            .unwrap()
        };
        assert_eq!(
            decode("intro"),
            Some(PushMessage::SetAudienceDisplay(AudienceScreen::Intro))
        );
        assert_eq!(
            decode("match"),
            Some(PushMessage::SetAudienceDisplay(AudienceScreen::Match))
        );
        assert_eq!(
            decode("sponsor"),
            Some(PushMessage::SetAudienceDisplay(AudienceScreen::Other(
                "sponsor".to_string()
            )))
        );
    }

    #[test]
    fn test_decode_reload_and_error() {
        assert_eq!(
            PushMessage::decode(r#"{"type": "reload"}"#).unwrap(),
            Some(PushMessage::Reload)
        );
        assert_eq!(
            PushMessage::decode(r#"{"type": "error", "data": "Invalid message type"}"#).unwrap(),
            Some(PushMessage::Error("Invalid message type".to_string()))
        );
    }

    #[test]
    fn test_unknown_type_is_ignored() {
        assert_eq!(
            PushMessage::decode(r#"{"type": "scoringStatus", "data": {"RefereeScoreReady": true}}"#)
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_malformed_frames() {
        assert!(matches!(
            PushMessage::decode("not json"),
            Err(DecodeError::Envelope(_))
        ));
        assert!(matches!(
            PushMessage::decode(r#"{"data": 5}"#),
            Err(DecodeError::Envelope(_))
        ));

        match PushMessage::decode(r#"{"type": "realtimeScore", "data": {"RedScore": 3}}"#) {
            Err(DecodeError::Payload { kind, .. }) => assert_eq!(kind, "realtimeScore"),
            other => panic!("Expected a payload error, got {other:?}"),
        }

        match PushMessage::decode(r#"{"type": "matchTime", "data": {"MatchState": 12, "MatchTimeSec": 0}}"#) {
            Err(DecodeError::Payload { kind, .. }) => assert_eq!(kind, "matchTime"),
            other => panic!("Expected a payload error, got {other:?}"),
        }

        match PushMessage::decode(r#"{"type": "setMatch", "data": null}"#) {
            Err(DecodeError::Payload { kind, .. }) => assert_eq!(kind, "setMatch"),
            other => panic!("Expected a payload error, got {other:?}"),
        }
    }

    #[test]
    fn test_encode_outbound() {
        let msg = OutboundMessage::SetAudienceDisplay(AudienceScreen::Score);
        assert_eq!(
            msg.encode().unwrap(),
            r#"{"type":"setAudienceDisplay","data":"score"}"#
        );
    }
}
