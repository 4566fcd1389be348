use arena_common::alliance::Alliance;
use enum_iterator::{Sequence, all};
use minijinja::{Value, context};
use std::collections::BTreeMap;

/// The fixed locations on the announcer page that the display writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Sequence)]
pub enum Target {
    MatchName,
    MatchState,
    MatchTime,
    RedScore,
    BlueScore,
    Red1,
    Red2,
    Red3,
    Blue1,
    Blue2,
    Blue3,
    ScoreMatchName,
    RedScoreDetails,
    BlueScoreDetails,
    MatchResult,
    SavedMatchResult,
}

impl Target {
    /// Element id of this location in the page
    pub fn id(self) -> &'static str {
        match self {
            Self::MatchName => "matchName",
            Self::MatchState => "matchState",
            Self::MatchTime => "matchTime",
            Self::RedScore => "redScore",
            Self::BlueScore => "blueScore",
            Self::Red1 => "red1",
            Self::Red2 => "red2",
            Self::Red3 => "red3",
            Self::Blue1 => "blue1",
            Self::Blue2 => "blue2",
            Self::Blue3 => "blue3",
            Self::ScoreMatchName => "scoreMatchName",
            Self::RedScoreDetails => "redScoreDetails",
            Self::BlueScoreDetails => "blueScoreDetails",
            Self::MatchResult => "matchResult",
            Self::SavedMatchResult => "savedMatchResult",
        }
    }

    /// `index` is the zero based station number within the alliance
    pub fn team_slot(alliance: Alliance, index: usize) -> Option<Self> {
        match (alliance, index) {
            (Alliance::Red, 0) => Some(Self::Red1),
            (Alliance::Red, 1) => Some(Self::Red2),
            (Alliance::Red, 2) => Some(Self::Red3),
            (Alliance::Blue, 0) => Some(Self::Blue1),
            (Alliance::Blue, 1) => Some(Self::Blue2),
            (Alliance::Blue, 2) => Some(Self::Blue3),
            _ => None,
        }
    }

    pub fn score(alliance: Alliance) -> Self {
        match alliance {
            Alliance::Red => Self::RedScore,
            Alliance::Blue => Self::BlueScore,
        }
    }

    pub fn score_details(alliance: Alliance) -> Self {
        match alliance {
            Alliance::Red => Self::RedScoreDetails,
            Alliance::Blue => Self::BlueScoreDetails,
        }
    }

    /// Locations nested inside this one
    pub fn children(self) -> &'static [Target] {
        match self {
            Self::MatchResult => &[
                Self::ScoreMatchName,
                Self::RedScoreDetails,
                Self::BlueScoreDetails,
            ],
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Top,
}

impl Placement {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
        }
    }
}

/// A hover tooltip that has been activated on inserted markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub target: Target,
    pub title: String,
    pub placement: Placement,
}

/// Everything the display controller is allowed to change. Implementations decide how the
/// locations are actually presented.
pub trait Surface {
    fn set_text(&mut self, target: Target, text: &str);

    /// `html` is inserted as markup, without escaping
    fn set_html(&mut self, target: Target, html: String);

    fn attr(&self, target: Target, name: &str) -> Option<&str>;

    fn set_attr(&mut self, target: Target, name: &str, value: &str);

    fn show_modal(&mut self, target: Target);

    fn hide_modal(&mut self, target: Target);

    /// Enables hover tooltips on every `data-toggle="tooltip"` element inside `within`
    fn activate_tooltips(&mut self, within: Target, placement: Placement);

    /// Returns every location to its initial state
    fn clear(&mut self);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Content {
    #[default]
    Empty,
    Text(String),
    Html(String),
}

impl Content {
    fn to_value(&self) -> Value {
        match self {
            Self::Empty => Value::from(""),
            Self::Text(text) => Value::from(text.as_str()),
            Self::Html(html) => Value::from_safe_string(html.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub content: Content,
    pub attrs: BTreeMap<String, String>,
    pub shown: bool,
}

/// In memory page, exported as a whole document through the page template
#[derive(Debug, Clone, Default)]
pub struct Page {
    elements: BTreeMap<Target, Element>,
    tooltips: Vec<Tooltip>,
}

impl Page {
    pub fn element(&self, target: Target) -> Option<&Element> {
        self.elements.get(&target)
    }

    pub fn content(&self, target: Target) -> &Content {
        const EMPTY: &Content = &Content::Empty;
        self.element(target).map_or(EMPTY, |e| &e.content)
    }

    /// Plain text of `target`, `None` if it holds markup or nothing
    #[cfg(test)]
    pub fn text(&self, target: Target) -> Option<&str> {
        match self.content(target) {
            Content::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Markup of `target`, `None` if it holds text or nothing
    pub fn html(&self, target: Target) -> Option<&str> {
        match self.content(target) {
            Content::Html(html) => Some(html),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn is_shown(&self, target: Target) -> bool {
        self.element(target).is_some_and(|e| e.shown)
    }

    #[cfg(test)]
    pub fn tooltips(&self) -> &[Tooltip] {
        &self.tooltips
    }

    /// Builds the page template context: `el` holds one entry per location keyed by element id,
    /// `tooltips` the activated tooltips in activation order
    pub fn template_context(&self) -> Value {
        let elements: BTreeMap<&'static str, Value> = all::<Target>()
            .map(|target| {
                let element = self.elements.get(&target).cloned().unwrap_or_default();
                let view = BTreeMap::from([
                    ("content", element.content.to_value()),
                    ("attrs", Value::from_serialize(&element.attrs)),
                    ("shown", Value::from(element.shown)),
                ]);
                (target.id(), Value::from(view))
            })
            .collect();
        let tooltips: Vec<Value> = self
            .tooltips
            .iter()
            .map(|tooltip| {
                context! {
                    target => tooltip.target.id(),
                    title => &tooltip.title,
                    placement => tooltip.placement.as_str(),
                }
            })
            .collect();
        context! {
            el => Value::from(elements),
            tooltips,
        }
    }

    fn element_mut(&mut self, target: Target) -> &mut Element {
        self.elements.entry(target).or_default()
    }
}

impl Surface for Page {
    fn set_text(&mut self, target: Target, text: &str) {
        self.element_mut(target).content = Content::Text(text.to_string());
    }

    fn set_html(&mut self, target: Target, html: String) {
        // Tooltips belong to the markup they were found in
        self.tooltips.retain(|t| t.target != target);
        self.element_mut(target).content = Content::Html(html);
    }

    fn attr(&self, target: Target, name: &str) -> Option<&str> {
        self.element(target)
            .and_then(|e| e.attrs.get(name))
            .map(String::as_str)
    }

    fn set_attr(&mut self, target: Target, name: &str, value: &str) {
        self.element_mut(target)
            .attrs
            .insert(name.to_string(), value.to_string());
    }

    fn show_modal(&mut self, target: Target) {
        self.element_mut(target).shown = true;
    }

    fn hide_modal(&mut self, target: Target) {
        self.element_mut(target).shown = false;
    }

    fn activate_tooltips(&mut self, within: Target, placement: Placement) {
        for &target in [within].iter().chain(within.children()) {
            self.tooltips.retain(|t| t.target != target);
            let Some(markup) = self.html(target) else {
                continue;
            };
            let found: Vec<_> = tooltip_titles(markup)
                .into_iter()
                .map(|title| Tooltip {
                    target,
                    title,
                    placement,
                })
                .collect();
            self.tooltips.extend(found);
        }
    }

    fn clear(&mut self) {
        self.elements.clear();
        self.tooltips.clear();
    }
}

const TOOLTIP_MARKER: &str = r#"data-toggle="tooltip""#;

/// Titles of the tooltip elements in `markup`, in document order
fn tooltip_titles(markup: &str) -> Vec<String> {
    markup
        .split('<')
        .skip(1)
        .filter_map(|tag| tag.split_once('>').map(|(inner, _)| inner))
        .filter(|inner| inner.contains(TOOLTIP_MARKER))
        .map(|inner| unescape_html(attr_value(inner, "title").unwrap_or_default()))
        .collect()
}

/// Reverses the escaping applied when templates render text into attributes
fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&#x2f;", "/")
        .replace("&amp;", "&")
}

fn attr_value<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let pattern = format!(" {name}=\"");
    let start = tag.find(&pattern)? + pattern.len();
    let len = tag[start..].find('"')?;
    Some(&tag[start..start + len])
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_target_ids_are_unique() {
        let mut ids: Vec<_> = all::<Target>().map(Target::id).collect();
        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count);
    }

    #[test]
    fn test_team_slots() {
        assert_eq!(Target::team_slot(Alliance::Red, 0), Some(Target::Red1));
        assert_eq!(Target::team_slot(Alliance::Blue, 2), Some(Target::Blue3));
        assert_eq!(Target::team_slot(Alliance::Blue, 3), None);
    }

    #[test]
    fn test_text_and_html_are_kept_apart() {
        let mut page = Page::default();
        page.set_text(Target::MatchName, "Qualification Match 1");
        page.set_html(Target::Red1, "<b>254</b>".to_string());

        assert_eq!(page.text(Target::MatchName), Some("Qualification Match 1"));
        assert_eq!(page.html(Target::MatchName), None);
        assert_eq!(page.html(Target::Red1), Some("<b>254</b>"));
        assert_eq!(page.text(Target::Red1), None);
        assert_eq!(page.content(Target::Blue1), &Content::Empty);
    }

    #[test]
    fn test_attrs() {
        let mut page = Page::default();
        assert_eq!(page.attr(Target::SavedMatchResult, "data-blink"), None);
        page.set_attr(Target::SavedMatchResult, "data-blink", "true");
        assert_eq!(page.attr(Target::SavedMatchResult, "data-blink"), Some("true"));
    }

    #[test]
    fn test_modal() {
        let mut page = Page::default();
        assert!(!page.is_shown(Target::MatchResult));
        page.show_modal(Target::MatchResult);
        assert!(page.is_shown(Target::MatchResult));
        page.hide_modal(Target::MatchResult);
        assert!(!page.is_shown(Target::MatchResult));
    }

    #[test]
    fn test_tooltip_titles() {
        let markup = r#"<ul><li data-toggle="tooltip" title="Pinning">254 G22</li><li class="x">no</li><li title="Ramming" data-toggle="tooltip">1114</li></ul>"#;
        assert_eq!(tooltip_titles(markup), vec!["Pinning", "Ramming"]);
        assert!(tooltip_titles("<p>No fouls</p>").is_empty());
        assert_eq!(
            tooltip_titles(r#"<span data-toggle="tooltip">x</span>"#),
            vec![String::new()]
        );
    }

    #[test]
    fn test_tooltip_titles_are_unescaped() {
        let markup = r#"<li data-toggle="tooltip" title="Tom &amp; Jerry &lt;3 &quot;G12&quot; &#x2f; it&#x27;s &amp;lt;">1</li>"#;
        assert_eq!(
            tooltip_titles(markup),
            vec![r#"Tom & Jerry <3 "G12" / it's &lt;"#]
        );
    }

    #[test]
    fn test_activate_tooltips_within_children() {
        let mut page = Page::default();
        page.set_html(
            Target::RedScoreDetails,
            r#"<li data-toggle="tooltip" title="A">1</li>"#.to_string(),
        );
        page.set_html(
            Target::BlueScoreDetails,
            r#"<li data-toggle="tooltip" title="B">2</li>"#.to_string(),
        );
        page.set_html(
            Target::Red1,
            r#"<li data-toggle="tooltip" title="Outside">3</li>"#.to_string(),
        );
        page.activate_tooltips(Target::MatchResult, Placement::Top);

        let titles: Vec<_> = page.tooltips().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert!(page.tooltips().iter().all(|t| t.placement == Placement::Top));

        // Running again does not duplicate
        page.activate_tooltips(Target::MatchResult, Placement::Top);
        assert_eq!(page.tooltips().len(), 2);

        // Replacing the markup drops its tooltips
        page.set_html(Target::RedScoreDetails, "<p></p>".to_string());
        assert_eq!(page.tooltips().len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut page = Page::default();
        page.set_text(Target::RedScore, "12");
        page.show_modal(Target::MatchResult);
        page.clear();
        assert_eq!(page.text(Target::RedScore), None);
        assert!(!page.is_shown(Target::MatchResult));
    }
}
