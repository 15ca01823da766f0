//! Marker table for recognizing and classifying Gemini CLI consoles.
//!
//! Every heuristic substring lives here so the classifier stays data-driven.
//! Update these when the CLI changes its title glyphs or prompt wording.

use crate::types::{ClassificationInput, TargetState};

// ═══════════════════════════════════════════════════════════════════════════════
// Default Markers
// ═══════════════════════════════════════════════════════════════════════════════

/// Title substrings (case-insensitive) that identify a Gemini CLI console.
pub const DISCOVERY_TITLE_MARKERS: &[&str] =
    &["gemini", "gemini-cli", "dist\\index.js", "◇", "✦"];

/// Foreground-window title substrings (case-insensitive) for multiplexing hosts.
pub const FOCUS_TITLE_MARKERS: &[&str] = &["gemini", "◇", "✦"];

pub const AWAITING_INPUT_MARKERS: &[&str] = &[
    "Interactive shell awaiting input",
    "Action Required",
    "Press tab to focus shell",
];

/// High demand needs one marker from each list on screen at the same time.
pub const HIGH_DEMAND_RETRY_MARKERS: &[&str] = &["Keep trying"];
pub const HIGH_DEMAND_STOP_MARKERS: &[&str] = &["Stop"];

pub const WORKING_TITLE_MARKERS: &[&str] = &["Working", "✦"];
pub const READY_TITLE_MARKERS: &[&str] = &["Ready", "◇"];

// ═══════════════════════════════════════════════════════════════════════════════
// Rules
// ═══════════════════════════════════════════════════════════════════════════════

/// Which half of a [`ClassificationInput`] a rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Screen,
}

/// One classification rule. Lower `rank` wins.
///
/// `groups` is a conjunction of disjunctions: every group must have at least
/// one marker present. Matching is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerRule {
    pub rank: u8,
    pub state: TargetState,
    pub field: Field,
    pub groups: Vec<Vec<String>>,
}

impl MarkerRule {
    pub fn new(rank: u8, state: TargetState, field: Field, groups: Vec<Vec<String>>) -> Self {
        let groups = groups.into_iter().map(non_empty).collect();
        Self {
            rank,
            state,
            field,
            groups,
        }
    }

    pub fn matches(&self, input: ClassificationInput<'_>) -> bool {
        let haystack = match self.field {
            Field::Title => input.title,
            Field::Screen => input.screen_tail,
        };
        !self.groups.is_empty()
            && self
                .groups
                .iter()
                .all(|group| group.iter().any(|marker| haystack.contains(marker.as_str())))
    }
}

/// Complete marker set: discovery, focus fallback, and ranked state rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerTable {
    discovery_title: Vec<String>,
    discovery_screen: Vec<String>,
    focus_title: Vec<String>,
    rules: Vec<MarkerRule>,
}

impl MarkerTable {
    pub fn new(
        discovery_title: Vec<String>,
        discovery_screen: Vec<String>,
        focus_title: Vec<String>,
        mut rules: Vec<MarkerRule>,
    ) -> Self {
        rules.sort_by_key(|rule| rule.rank);
        Self {
            discovery_title: lowercase_all(non_empty(discovery_title)),
            discovery_screen: non_empty(discovery_screen),
            focus_title: lowercase_all(non_empty(focus_title)),
            rules,
        }
    }

    /// True when the console title or screen identifies a Gemini CLI session.
    pub fn is_cli_console(&self, input: ClassificationInput<'_>) -> bool {
        if contains_any_lowercase(input.title, &self.discovery_title) {
            return true;
        }
        self.discovery_screen
            .iter()
            .any(|marker| input.screen_tail.contains(marker.as_str()))
    }

    /// True when a foreground window title looks like a CLI tab.
    pub fn is_cli_window_title(&self, title: &str) -> bool {
        contains_any_lowercase(title, &self.focus_title)
    }

    /// First rule (by rank) that matches, if any.
    pub fn first_match(&self, input: ClassificationInput<'_>) -> Option<&MarkerRule> {
        self.rules.iter().find(|rule| rule.matches(input))
    }

    pub fn rules(&self) -> &[MarkerRule] {
        &self.rules
    }
}

impl Default for MarkerTable {
    fn default() -> Self {
        Self::new(
            owned(DISCOVERY_TITLE_MARKERS),
            Vec::new(),
            owned(FOCUS_TITLE_MARKERS),
            default_rules(),
        )
    }
}

pub fn default_rules() -> Vec<MarkerRule> {
    vec![
        MarkerRule::new(
            1,
            TargetState::AwaitingInput,
            Field::Screen,
            vec![owned(AWAITING_INPUT_MARKERS)],
        ),
        MarkerRule::new(
            2,
            TargetState::HighDemand,
            Field::Screen,
            vec![
                owned(HIGH_DEMAND_RETRY_MARKERS),
                owned(HIGH_DEMAND_STOP_MARKERS),
            ],
        ),
        MarkerRule::new(
            3,
            TargetState::Working,
            Field::Title,
            vec![owned(WORKING_TITLE_MARKERS)],
        ),
        MarkerRule::new(
            4,
            TargetState::Ready,
            Field::Title,
            vec![owned(READY_TITLE_MARKERS)],
        ),
    ]
}

pub fn owned(markers: &[&str]) -> Vec<String> {
    markers.iter().map(|marker| marker.to_string()).collect()
}

// An empty marker would match every string.
fn non_empty(markers: Vec<String>) -> Vec<String> {
    markers
        .into_iter()
        .filter(|marker| !marker.is_empty())
        .collect()
}

fn lowercase_all(markers: Vec<String>) -> Vec<String> {
    markers.into_iter().map(|m| m.to_lowercase()).collect()
}

fn contains_any_lowercase(text: &str, lowered_markers: &[String]) -> bool {
    if text.is_empty() {
        return false;
    }
    let lowered = text.to_lowercase();
    lowered_markers
        .iter()
        .any(|marker| lowered.contains(marker.as_str()))
}
