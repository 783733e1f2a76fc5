//! Show/hide state of a slot container.

/// Binary display state of a slot container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    /// Container is collapsed.
    #[default]
    Hidden,
    /// Container is shown.
    Visible,
}

impl Display {
    /// Returns the opposite state.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Hidden => Self::Visible,
            Self::Visible => Self::Hidden,
        }
    }

    /// Returns `true` for [`Display::Visible`].
    #[must_use]
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Visible)
    }

    /// Reads the initial state from an inline `style` attribute.
    ///
    /// The last `display` declaration wins. Any value other than `none`
    /// counts as visible; no declaration at all counts as hidden.
    #[must_use]
    pub fn from_style(style: Option<&str>) -> Self {
        style
            .into_iter()
            .flat_map(|s| s.split(';'))
            .filter_map(|decl| decl.split_once(':'))
            .filter(|(property, _)| property.trim().eq_ignore_ascii_case("display"))
            .last()
            .map_or(Self::Hidden, |(_, value)| {
                if value.trim().eq_ignore_ascii_case("none") {
                    Self::Hidden
                } else {
                    Self::Visible
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_restores_state() {
        for start in [Display::Hidden, Display::Visible] {
            assert_eq!(start.toggled().toggled(), start);
            assert_ne!(start.toggled(), start);
        }
    }

    #[test]
    fn style_parsing() {
        assert_eq!(Display::from_style(None), Display::Hidden);
        assert_eq!(Display::from_style(Some("color: red")), Display::Hidden);
        assert_eq!(Display::from_style(Some("display:block")), Display::Visible);
        assert_eq!(Display::from_style(Some("display: none;")), Display::Hidden);
        assert_eq!(
            Display::from_style(Some("display:none; DISPLAY: flex")),
            Display::Visible
        );
    }
}
