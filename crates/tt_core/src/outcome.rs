//! Outcome classification for the two source feeds.
//!
//! Both feeds collapse onto the same seven-way vocabulary the tables are
//! keyed by. The pitch feed spells outcomes as free-text `events` values;
//! the play feed uses structured play codes with `/` modifiers and `.`
//! advances that must be stripped before matching.

/// Plate-appearance outcome vocabulary shared by every table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    Single,
    Double,
    Triple,
    HomeRun,
    Walk,
    Strikeout,
    Out,
}

impl Outcome {
    /// Wire code used as the top-level key of the transition tables.
    pub fn code(&self) -> &'static str {
        match self {
            Outcome::Single => "1B",
            Outcome::Double => "2B",
            Outcome::Triple => "3B",
            Outcome::HomeRun => "HR",
            Outcome::Walk => "BB",
            Outcome::Strikeout => "K",
            Outcome::Out => "OUT",
        }
    }

    /// Classify a pitch-feed `events` value.
    ///
    /// The mapping is closed: anything not listed (steal events, catcher
    /// interference, sacrifice bunts, …) returns `None` and stays out of
    /// the aggregation.
    pub fn from_statcast_event(event: &str) -> Option<Outcome> {
        match event {
            "single" => Some(Outcome::Single),
            "double" => Some(Outcome::Double),
            "triple" => Some(Outcome::Triple),
            "home_run" => Some(Outcome::HomeRun),
            "walk" | "hit_by_pitch" => Some(Outcome::Walk),
            "strikeout" => Some(Outcome::Strikeout),
            "field_out" | "force_out" | "fielders_choice" | "fielders_choice_out"
            | "grounded_into_double_play" | "sac_fly" | "double_play" | "triple_play"
            | "sac_fly_double_play" | "field_error" => Some(Outcome::Out),
            _ => None,
        }
    }

    /// Classify a play-feed event code.
    ///
    /// Callers screen non-batting plays with [`is_batting_play`] first;
    /// this match assumes the skip list already ran. Prefix order matters:
    /// `"K23"` is a strikeout, not a fielded out, because `K` is checked
    /// before the fielder-digit scan.
    pub fn from_retrosheet_play(event: &str) -> Option<Outcome> {
        let token = basic_play(event);
        if token.starts_with('S') {
            Some(Outcome::Single)
        } else if token.starts_with('D') {
            Some(Outcome::Double)
        } else if token.starts_with('T') {
            Some(Outcome::Triple)
        } else if token.starts_with("HR") {
            Some(Outcome::HomeRun)
        } else if token.starts_with('W') || token.starts_with("IW") || token.starts_with("HP") {
            Some(Outcome::Walk)
        } else if token.starts_with('K') {
            Some(Outcome::Strikeout)
        } else if token == "E" || token == "FC" || token.chars().any(|c| c.is_ascii_digit()) {
            // Fielded out: an explicit error/fielder's-choice token, or a
            // token carrying fielder numbers ("31/G", "64(1)3/GDP").
            Some(Outcome::Out)
        } else {
            None
        }
    }
}

/// Play codes that are baserunning noise rather than batting outcomes,
/// matched as prefixes against the basic play token. Defensive
/// indifference is excluded here so it cannot fall through to the `D`
/// (double) prefix.
const NON_BATTING_PREFIXES: &[&str] = &[
    "SB", "CS", "WP", "PB", "BK", "OA", "PO", "POCS", "WP+PB", "DI",
];

/// The basic play token: everything before the first modifier (`/`) or
/// advance (`.`) separator.
pub fn basic_play(event: &str) -> &str {
    match event.find(|c| c == '/' || c == '.') {
        Some(end) => &event[..end],
        None => event,
    }
}

/// Whether a play-feed event describes the batter's plate appearance
/// rather than a baserunning-only event.
pub fn is_batting_play(event: &str) -> bool {
    let token = basic_play(event);
    !NON_BATTING_PREFIXES
        .iter()
        .any(|prefix| token.starts_with(prefix))
}
