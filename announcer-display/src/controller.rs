use crate::{
    page::{Page, Placement, Surface, Target},
    templates::{RenderError, Templates},
};
use arena_common::{
    alliance::Alliance,
    match_timing::{MatchTime, MatchTiming, translate_match_time},
    messages::{
        AudienceScreen, OutboundMessage, PushMessage, RealtimeScore, SetFinalScore, SetMatch, Team,
    },
};
use log::{debug, error, info};

pub const BLINK_ATTR: &str = "data-blink";

/// Label used for a match everywhere on the page, e.g. "Qualification Match 12"
pub fn match_label(match_type: &str, display_name: &str) -> String {
    format!("{match_type} Match {display_name}")
}

/// Replaces each run of line breaks in the team's accomplishments with an HTML line break
pub fn format_team(team: Option<Team>) -> Option<Team> {
    team.map(|mut team| {
        team.accomplishments = replace_line_breaks(&team.accomplishments);
        team
    })
}

fn replace_line_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_break = false;
    for c in text.chars() {
        if c == '\r' || c == '\n' {
            if !in_break {
                out.push_str("<br />");
                in_break = true;
            }
        } else {
            out.push(c);
            in_break = false;
        }
    }
    out
}

/// Applies push messages from the arena to a [`Surface`]
pub struct Controller<S> {
    surface: S,
    templates: Templates,
    timing: MatchTiming,
}

impl<S: Surface> Controller<S> {
    pub fn new(surface: S, templates: Templates) -> Self {
        Self {
            surface,
            templates,
            timing: MatchTiming::default(),
        }
    }

    #[cfg(test)]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[cfg(test)]
    pub fn timing(&self) -> &MatchTiming {
        &self.timing
    }

    /// An error aborts only the handling of `msg`, anything written before it stays on the page
    pub fn handle(&mut self, msg: PushMessage) -> Result<(), RenderError> {
        debug!("Handling {} message", msg.kind());
        match msg {
            PushMessage::SetMatch(set_match) => self.set_match(set_match)?,
            PushMessage::MatchTiming(timing) => self.set_match_timing(timing),
            PushMessage::MatchTime(time) => self.match_time(&time),
            PushMessage::RealtimeScore(score) => self.realtime_score(score),
            PushMessage::SetFinalScore(final_score) => self.set_final_score(*final_score)?,
            PushMessage::SetAudienceDisplay(screen) => self.set_audience_display(&screen),
            PushMessage::Reload => {
                info!("Arena requested a reload, clearing the page");
                self.surface.clear();
            }
            PushMessage::Error(text) => error!("Arena reported an error: {text}"),
        }
        Ok(())
    }

    fn set_match(&mut self, set_match: SetMatch) -> Result<(), RenderError> {
        let SetMatch {
            match_type,
            match_display_name,
            teams,
        } = set_match;
        self.surface.set_text(
            Target::MatchName,
            &match_label(&match_type, &match_display_name),
        );

        for (alliance, slots) in teams {
            for (index, team) in slots.into_iter().enumerate() {
                let Some(target) = Target::team_slot(alliance, index) else {
                    continue;
                };
                let html = self.templates.render_team(format_team(team).as_ref())?;
                self.surface.set_html(target, html);
            }
        }
        Ok(())
    }

    fn set_match_timing(&mut self, timing: MatchTiming) {
        debug!("New match timing: {timing:?}");
        self.timing = timing;
    }

    fn match_time(&mut self, time: &MatchTime) {
        let (label, countdown) = translate_match_time(time, &self.timing);
        self.surface.set_text(Target::MatchState, label);
        self.surface.set_text(Target::MatchTime, &countdown);
    }

    fn realtime_score(&mut self, score: RealtimeScore) {
        self.surface
            .set_text(Target::score(Alliance::Red), &score.red_score.to_string());
        self.surface
            .set_text(Target::score(Alliance::Blue), &score.blue_score.to_string());
    }

    fn set_final_score(&mut self, final_score: SetFinalScore) -> Result<(), RenderError> {
        self.surface.set_text(
            Target::ScoreMatchName,
            &match_label(&final_score.match_type, &final_score.match_display_name),
        );
        for (alliance, result) in final_score.results.iter() {
            let html = self.templates.render_match_result(result)?;
            self.surface.set_html(Target::score_details(alliance), html);
        }
        self.surface.show_modal(Target::MatchResult);
        self.surface
            .activate_tooltips(Target::MatchResult, Placement::Top);
        Ok(())
    }

    fn set_audience_display(&mut self, screen: &AudienceScreen) {
        // The results would otherwise cover the teams of the match being introduced
        if matches!(screen, AudienceScreen::Intro | AudienceScreen::Match) {
            self.surface.hide_modal(Target::MatchResult);
        }
    }

    /// Flips the saved result indicator between its two blink states
    pub fn toggle_blink(&mut self) {
        let blink_on = self.surface.attr(Target::SavedMatchResult, BLINK_ATTR) == Some("true");
        let next = if blink_on { "false" } else { "true" };
        self.surface
            .set_attr(Target::SavedMatchResult, BLINK_ATTR, next);
    }

    /// Stops the blink and returns the request that puts the score on the audience display
    pub fn post_match_result(&mut self) -> OutboundMessage {
        self.surface
            .set_attr(Target::SavedMatchResult, BLINK_ATTR, "false");
        OutboundMessage::SetAudienceDisplay(AudienceScreen::Score)
    }
}

impl Controller<Page> {
    pub fn render_document(&self) -> Result<String, RenderError> {
        self.templates
            .render_page(self.surface.template_context())
    }
}
