//! Mapping between item message bodies and item state.
//!
//! An item body is one state glyph, a space, then the display text. Checked
//! items wrap the text in markdown strike-through: `✅ ~~text~~`.
//! Decoding never fails; malformed bodies are trimmed on a best-effort basis.

pub use cartlist_config::Glyphs;

/// Variation selector some clients append to emoji names.
const VARIATION_SELECTOR: char = '\u{FE0F}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Unchecked,
    Checked,
}

/// Semantic view of an item message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub state: ItemState,
    pub text: String,
}

impl Item {
    pub fn new(state: ItemState, text: impl Into<String>) -> Self {
        Self {
            state,
            text: text.into(),
        }
    }
}

/// Decode a message body into an item.
pub fn decode(glyphs: &Glyphs, raw: &str) -> Item {
    let state = if !glyphs.checked.is_empty() && raw.trim_start().starts_with(&glyphs.checked) {
        ItemState::Checked
    } else {
        ItemState::Unchecked
    };

    let text = raw
        .trim_start_matches(|c: char| {
            c == '~' || c == ' ' || glyphs.checked.contains(c) || glyphs.unchecked.contains(c)
        })
        .trim_end_matches(['~', ' ']);

    Item::new(state, text)
}

/// Render an item into a message body.
pub fn render(glyphs: &Glyphs, state: ItemState, text: &str) -> String {
    match state {
        ItemState::Unchecked => format!("{} {text}", glyphs.unchecked),
        ItemState::Checked => format!("{} ~~{text}~~", glyphs.checked),
    }
}

/// Render a heading line as a bold, underlined announcement.
pub fn render_heading(line: &str) -> String {
    format!("**__{}__**", line.trim_matches(['*', '_']))
}

/// Whether a message body carries an item state glyph.
pub fn is_item(glyphs: &Glyphs, raw: &str) -> bool {
    let raw = raw.trim_start();
    [&glyphs.checked, &glyphs.unchecked]
        .into_iter()
        .any(|g| !g.is_empty() && raw.starts_with(g.as_str()))
}

/// Compare two emoji names, ignoring the emoji variation selector.
pub fn emoji_matches(expected: &str, actual: &str) -> bool {
    let strip = |s: &str| s.chars().filter(|&c| c != VARIATION_SELECTOR).collect::<String>();
    !expected.is_empty() && strip(expected) == strip(actual)
}

/// One of the three reactions attached to every item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlReaction {
    Check,
    Delete,
    Edit,
}

impl ControlReaction {
    /// Attachment order on new items.
    pub const ALL: [Self; 3] = [Self::Check, Self::Delete, Self::Edit];

    pub fn from_emoji(glyphs: &Glyphs, emoji: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|control| emoji_matches(control.emoji(glyphs), emoji))
    }

    pub fn emoji(self, glyphs: &Glyphs) -> &str {
        match self {
            Self::Check => &glyphs.check,
            Self::Delete => &glyphs.delete,
            Self::Edit => &glyphs.edit,
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn glyphs() -> Glyphs {
        Glyphs::default()
    }

    #[rstest]
    #[case(ItemState::Unchecked, "Buy milk")]
    #[case(ItemState::Checked, "Buy milk")]
    #[case(ItemState::Unchecked, "a")]
    #[case(ItemState::Checked, "2 x eggs (free range)")]
    #[case(ItemState::Checked, "mid ~~strike~~ text")]
    #[case(ItemState::Unchecked, "ünïcødé 🥛")]
    fn decode_inverts_render(#[case] state: ItemState, #[case] text: &str) {
        let g = glyphs();
        assert_eq!(decode(&g, &render(&g, state, text)), Item::new(state, text));
    }

    #[rstest]
    #[case("◻ Buy milk")]
    #[case("✅ ~~Buy milk~~")]
    fn render_inverts_decode(#[case] raw: &str) {
        let g = glyphs();
        let item = decode(&g, raw);
        assert_eq!(render(&g, item.state, &item.text), raw);
    }

    #[test]
    fn rendered_forms() {
        let g = glyphs();
        assert_eq!(render(&g, ItemState::Unchecked, "Buy milk"), "◻ Buy milk");
        assert_eq!(render(&g, ItemState::Checked, "Buy milk"), "✅ ~~Buy milk~~");
    }

    #[test]
    fn checking_twice_is_stable() {
        let g = glyphs();
        let once = render(&g, ItemState::Checked, &decode(&g, "◻ Bread").text);
        let twice = render(&g, ItemState::Checked, &decode(&g, &once).text);
        assert_eq!(once, twice);
    }

    #[rstest]
    #[case("", "")]
    #[case("~~~", "")]
    #[case("plain words", "plain words")]
    #[case("◻◻  doubled", "doubled")]
    #[case("✅ ~~half struck", "half struck")]
    fn decode_is_tolerant(#[case] raw: &str, #[case] text: &str) {
        assert_eq!(decode(&glyphs(), raw).text, text);
    }

    #[test]
    fn heading_keeps_marker_and_strips_emphasis() {
        assert_eq!(render_heading("# Dairy"), "**__# Dairy__**");
        assert_eq!(render_heading("**# Dairy__"), "**__# Dairy__**");
    }

    #[rstest]
    #[case("◻ milk", true)]
    #[case("✅ ~~milk~~", true)]
    #[case("**__# Dairy__**", false)]
    #[case("Editing: `milk`", false)]
    fn item_detection(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(is_item(&glyphs(), raw), expected);
    }

    #[rstest]
    #[case("✏", Some(ControlReaction::Edit))]
    #[case("✏\u{FE0F}", Some(ControlReaction::Edit))]
    #[case("🛒", Some(ControlReaction::Check))]
    #[case("🗑\u{FE0F}", Some(ControlReaction::Delete))]
    #[case("👍", None)]
    #[case("", None)]
    fn control_reaction_lookup(#[case] emoji: &str, #[case] expected: Option<ControlReaction>) {
        assert_eq!(ControlReaction::from_emoji(&glyphs(), emoji), expected);
    }
}
