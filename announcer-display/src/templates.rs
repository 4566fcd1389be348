use arena_common::messages::{AllianceResult, Team};
use log::info;
use minijinja::{Environment, Value, context, path_loader};
use std::path::Path;
use thiserror::Error;

pub const TEAM_TEMPLATE: &str = "team.html";
pub const MATCH_RESULT_TEMPLATE: &str = "match_result.html";
pub const PAGE_TEMPLATE: &str = "announcer.html";

const DEFAULT_TEMPLATES: [(&str, &str); 3] = [
    (TEAM_TEMPLATE, include_str!("../templates/team.html")),
    (
        MATCH_RESULT_TEMPLATE,
        include_str!("../templates/match_result.html"),
    ),
    (PAGE_TEMPLATE, include_str!("../templates/announcer.html")),
];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Template(#[from] minijinja::Error),
    #[error("Failed to write the display output: {0}")]
    Io(#[from] std::io::Error),
}

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Uses the built in templates, except for those with a file of the same name in `override_dir`
    pub fn new(override_dir: Option<&Path>) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        for (name, source) in DEFAULT_TEMPLATES {
            if let Some(dir) = override_dir {
                if dir.join(name).is_file() {
                    info!("Using template {name} from {}", dir.display());
                    continue;
                }
            }
            env.add_template(name, source)?;
        }
        if let Some(dir) = override_dir {
            env.set_loader(path_loader(dir));
        }
        Ok(Self { env })
    }

    /// Renders a team slot. An empty slot renders to nothing.
    pub fn render_team(&self, team: Option<&Team>) -> Result<String, RenderError> {
        Ok(self
            .env
            .get_template(TEAM_TEMPLATE)?
            .render(context! { team })?)
    }

    pub fn render_match_result(&self, result: &AllianceResult) -> Result<String, RenderError> {
        Ok(self.env.get_template(MATCH_RESULT_TEMPLATE)?.render(context! {
            score => &result.score,
            fouls => &result.fouls,
            cards => &result.cards,
        })?)
    }

    /// `page` is the context built by [`crate::page::Page::template_context`]
    pub fn render_page(&self, page: Value) -> Result<String, RenderError> {
        Ok(self.env.get_template(PAGE_TEMPLATE)?.render(page)?)
    }
}
