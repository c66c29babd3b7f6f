//! Base-occupancy / outs state encoding.
//!
//! The two source feeds spell the same game situation differently:
//!
//! - presence glyphs for the pitch-level feed: occupied bases are `X`,
//!   empty bases are `O`, so `"XOO-1"` is a runner on first with one out;
//! - positional glyphs for the play-level feed: occupied bases render as
//!   their own digit, empty bases as `X`, so the same situation is
//!   `"1XX-1"`.
//!
//! The play-level feed additionally records *who* stands on each base after
//! the play, rendered with role glyphs: `B` for the batter, `1`/`2`/`3` for
//! the runner who started the play on that base, `X` for empty. `"B1X-0"`
//! reads "batter on first, the former first-base runner on second".
//!
//! One in-memory type covers all renders. The feed-native empty sentinels
//! (`"OOO-0"` vs `"XXX-0"`) are both kept because the simulator that
//! consumes the emitted tables keys on the exact strings.

/// Highest outs count a plate appearance can legally start with.
pub const MAX_PRE_OUTS: u8 = 2;

/// The three occupiable bases, in advancement order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Base {
    First,
    Second,
    Third,
}

impl Base {
    /// All bases in 1B → 3B order.
    pub const ALL: [Base; 3] = [Base::First, Base::Second, Base::Third];

    /// Wire label used in the steal tables (`"1B"`, `"2B"`, `"3B"`).
    pub fn label(&self) -> &'static str {
        match self {
            Base::First => "1B",
            Base::Second => "2B",
            Base::Third => "3B",
        }
    }

    /// Glyph used by the positional and role encodings.
    fn digit(&self) -> char {
        match self {
            Base::First => '1',
            Base::Second => '2',
            Base::Third => '3',
        }
    }
}

/// Which glyph alphabet a pipeline writes its states in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateEncoding {
    /// Pitch feed: `X` occupied, `O` empty.
    Presence,
    /// Play feed: base digit occupied, `X` empty.
    Positional,
}

impl StateEncoding {
    /// The canonical bases-empty, zero-out state in this encoding.
    pub fn empty_state(&self) -> &'static str {
        match self {
            StateEncoding::Presence => "OOO-0",
            StateEncoding::Positional => "XXX-0",
        }
    }

    /// Render a state in this encoding.
    pub fn encode(&self, state: &BaseOutState) -> String {
        match self {
            StateEncoding::Presence => state.encode_presence(),
            StateEncoding::Positional => state.encode_positional(),
        }
    }
}

/// Base occupancy plus the current outs count.
///
/// # Examples
/// ```
/// use tt_core::state::BaseOutState;
///
/// let runner_on_first = BaseOutState::new(true, false, false, 1);
/// assert_eq!(runner_on_first.encode_presence(), "XOO-1");
/// assert_eq!(runner_on_first.encode_positional(), "1XX-1");
/// assert_eq!(runner_on_first.runners_on(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BaseOutState {
    pub first: bool,
    pub second: bool,
    pub third: bool,
    pub outs: u8,
}

impl BaseOutState {
    pub const fn new(first: bool, second: bool, third: bool, outs: u8) -> Self {
        Self {
            first,
            second,
            third,
            outs,
        }
    }

    /// Bases empty, nobody out.
    pub const fn empty() -> Self {
        Self::new(false, false, false, 0)
    }

    pub fn occupied(&self, base: Base) -> bool {
        match base {
            Base::First => self.first,
            Base::Second => self.second,
            Base::Third => self.third,
        }
    }

    /// Number of occupied bases.
    pub fn runners_on(&self) -> u8 {
        u8::from(self.first) + u8::from(self.second) + u8::from(self.third)
    }

    /// Presence render: `X` occupied, `O` empty.
    pub fn encode_presence(&self) -> String {
        let glyph = |occupied| if occupied { 'X' } else { 'O' };
        format!(
            "{}{}{}-{}",
            glyph(self.first),
            glyph(self.second),
            glyph(self.third),
            self.outs
        )
    }

    /// Positional render: occupied bases as their own digit, `X` empty.
    pub fn encode_positional(&self) -> String {
        let mut glyphs = String::with_capacity(3);
        for base in Base::ALL {
            glyphs.push(if self.occupied(base) { base.digit() } else { 'X' });
        }
        format!("{}-{}", glyphs, self.outs)
    }
}

/// Resolve the role glyph for the occupant of one post-play base.
///
/// Precedence: the batter, then the pre-play runners in 1B → 3B order, then
/// the slot's own digit when no identity matches. The fallback masks
/// multi-runner scrambles the identity columns cannot explain; the source
/// data carries the same approximation, so it is kept as-is.
fn role_glyph(
    occupant: Option<&str>,
    batter: Option<&str>,
    pre: &[Option<&str>; 3],
    fallback: char,
) -> char {
    let id = match occupant {
        Some(id) => id,
        None => return 'X',
    };
    if batter == Some(id) {
        return 'B';
    }
    for (base, pre_id) in Base::ALL.iter().zip(pre.iter()) {
        if *pre_id == Some(id) {
            return base.digit();
        }
    }
    fallback
}

/// Encode the post-play state of a play-level record, tracking which
/// runner ended up where.
///
/// `outs_post >= 3` ends the half-inning: runners still on base clear and
/// the state resets to [`StateEncoding::Positional`]'s empty sentinel
/// regardless of what the occupancy columns say.
pub fn encode_retrosheet_post(
    batter: Option<&str>,
    pre: &[Option<&str>; 3],
    post: &[Option<&str>; 3],
    outs_post: u8,
) -> String {
    if outs_post >= 3 {
        return StateEncoding::Positional.empty_state().to_string();
    }
    let mut glyphs = String::with_capacity(3);
    for (base, occupant) in Base::ALL.iter().zip(post.iter()) {
        glyphs.push(role_glyph(*occupant, batter, pre, base.digit()));
    }
    format!("{}-{}", glyphs, outs_post)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_encoding() {
        assert_eq!(BaseOutState::empty().encode_presence(), "OOO-0");
        assert_eq!(
            BaseOutState::new(true, false, true, 2).encode_presence(),
            "XOX-2"
        );
        assert_eq!(
            BaseOutState::new(true, true, true, 1).encode_presence(),
            "XXX-1"
        );
    }

    #[test]
    fn test_positional_encoding() {
        assert_eq!(BaseOutState::empty().encode_positional(), "XXX-0");
        assert_eq!(
            BaseOutState::new(true, false, true, 2).encode_positional(),
            "1X3-2"
        );
        assert_eq!(
            BaseOutState::new(false, true, false, 0).encode_positional(),
            "X2X-0"
        );
    }

    #[test]
    fn test_encoding_is_idempotent() {
        let state = BaseOutState::new(true, true, false, 1);
        assert_eq!(state.encode_presence(), state.encode_presence());
        assert_eq!(state.encode_positional(), state.encode_positional());
    }

    #[test]
    fn test_empty_sentinels_differ_by_feed() {
        assert_eq!(StateEncoding::Presence.empty_state(), "OOO-0");
        assert_eq!(StateEncoding::Positional.empty_state(), "XXX-0");
        assert_eq!(
            StateEncoding::Presence.encode(&BaseOutState::empty()),
            StateEncoding::Presence.empty_state()
        );
        assert_eq!(
            StateEncoding::Positional.encode(&BaseOutState::empty()),
            StateEncoding::Positional.empty_state()
        );
    }

    #[test]
    fn test_post_state_batter_reaches_first() {
        // Single: runner on first advances to second, batter takes first.
        let pre = [Some("r1"), None, None];
        let post = [Some("bat"), Some("r1"), None];
        let encoded = encode_retrosheet_post(Some("bat"), &pre, &post, 0);
        assert_eq!(encoded, "B1X-0");
    }

    #[test]
    fn test_post_state_runner_holds_base() {
        // Walk with second occupied: forced runner moves, second holds.
        let pre = [Some("r1"), Some("r2"), None];
        let post = [Some("bat"), Some("r1"), Some("r2")];
        let encoded = encode_retrosheet_post(Some("bat"), &pre, &post, 1);
        assert_eq!(encoded, "B12-1");
    }

    #[test]
    fn test_post_state_unknown_runner_falls_back_to_base_digit() {
        // Occupant that matches neither the batter nor any pre-play
        // runner (pinch runner, data gap) keeps the slot's own digit.
        let pre = [None, None, None];
        let post = [None, Some("mystery"), None];
        let encoded = encode_retrosheet_post(Some("bat"), &pre, &post, 2);
        assert_eq!(encoded, "X2X-2");
    }

    #[test]
    fn test_post_state_three_outs_resets() {
        // Inning over: occupancy columns are ignored, runners clear.
        let pre = [Some("r1"), Some("r2"), Some("r3")];
        let post = [Some("r1"), Some("r2"), Some("r3")];
        assert_eq!(encode_retrosheet_post(Some("bat"), &pre, &post, 3), "XXX-0");
        assert_eq!(encode_retrosheet_post(None, &pre, &post, 4), "XXX-0");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: every render is three glyphs, a dash, and the
            /// outs count, and re-rendering yields the same string.
            #[test]
            fn prop_render_shape_and_idempotence(
                first in any::<bool>(),
                second in any::<bool>(),
                third in any::<bool>(),
                outs in 0u8..=2
            ) {
                let state = BaseOutState::new(first, second, third, outs);
                for encoding in [StateEncoding::Presence, StateEncoding::Positional] {
                    let rendered = encoding.encode(&state);
                    prop_assert_eq!(rendered.len(), 5);
                    prop_assert_eq!(&rendered[3..4], "-");
                    prop_assert_eq!(rendered.clone(), encoding.encode(&state));
                }
            }

            /// Property: runner count matches the occupied glyph count in
            /// both encodings.
            #[test]
            fn prop_runner_count_matches_glyphs(
                first in any::<bool>(),
                second in any::<bool>(),
                third in any::<bool>(),
                outs in 0u8..=2
            ) {
                let state = BaseOutState::new(first, second, third, outs);
                let presence = state.encode_presence();
                let occupied = presence[..3].chars().filter(|c| *c == 'X').count();
                prop_assert_eq!(occupied as u8, state.runners_on());

                let positional = state.encode_positional();
                let empty = positional[..3].chars().filter(|c| *c == 'X').count();
                prop_assert_eq!(3 - empty as u8, state.runners_on());
            }
        }
    }
}
