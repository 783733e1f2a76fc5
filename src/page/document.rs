//! Page model built from the booking page's DOM contract.
//!
//! The server renders one `.doctor` element per doctor, carrying a
//! `data-id`, with a `.slots` descendant carrying `data-slots`:
//!
//! ```html
//! <div class="doctor" data-id="3">
//!   <h3>Dr. Grey</h3>
//!   <div class="slots" data-slots="09:00,09:30"></div>
//! </div>
//! ```
//!
//! [`Page`] owns every card; each [`DoctorCard`] owns its
//! [`SlotContainer`], and each container owns its rendered controls.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::slots::{SlotControl, render_controls};
use super::visibility::Display;
use crate::domain::DoctorId;
use crate::error::ClientError;

const DOCTOR_SELECTOR: &str = ".doctor";
const SLOTS_SELECTOR: &str = ".slots";
const TITLE_SELECTOR: &str = "h1, h2, h3, h4, h5, h6, .name";

/// A slot container and its rendered controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotContainer {
    raw_slots: Option<String>,
    display: Display,
    controls: Vec<SlotControl>,
}

impl SlotContainer {
    /// Creates an unrendered container from its `data-slots` value.
    #[must_use]
    pub fn new(raw_slots: Option<String>, display: Display) -> Self {
        Self {
            raw_slots,
            display,
            controls: Vec::new(),
        }
    }

    /// Clears the container and renders one control per slot label.
    pub fn render(&mut self) {
        self.controls = render_controls(self.raw_slots.as_deref());
    }

    /// Rendered controls, in attribute order.
    #[must_use]
    pub fn controls(&self) -> &[SlotControl] {
        &self.controls
    }

    /// Rendered control at `position`.
    #[must_use]
    pub fn control(&self, position: usize) -> Option<&SlotControl> {
        self.controls.get(position)
    }

    /// Raw `data-slots` attribute, if present.
    #[must_use]
    pub fn raw_slots(&self) -> Option<&str> {
        self.raw_slots.as_deref()
    }

    /// Current display state.
    #[must_use]
    pub const fn display(&self) -> Display {
        self.display
    }

    /// Flips the display state and returns the new one.
    pub fn toggle(&mut self) -> Display {
        self.display = self.display.toggled();
        self.display
    }
}

/// One `.doctor` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorCard {
    raw_id: Option<String>,
    title: Option<String>,
    slots: SlotContainer,
}

impl DoctorCard {
    /// Creates a card from its attribute values.
    #[must_use]
    pub fn new(raw_id: Option<String>, title: Option<String>, slots: SlotContainer) -> Self {
        Self {
            raw_id,
            title,
            slots,
        }
    }

    /// Raw `data-id` attribute, if present.
    #[must_use]
    pub fn raw_id(&self) -> Option<&str> {
        self.raw_id.as_deref()
    }

    /// Doctor identifier to book against, falling back to
    /// [`DoctorId::FALLBACK`] when `data-id` is missing or blank.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidDoctorId`] if `data-id` holds anything
    /// else that is not a number.
    pub fn doctor_id(&self) -> Result<DoctorId, ClientError> {
        DoctorId::from_attribute(self.raw_id.as_deref())
    }

    /// Heading text of the card, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The card's slot container.
    #[must_use]
    pub const fn slots(&self) -> &SlotContainer {
        &self.slots
    }

    /// Mutable access to the card's slot container.
    pub fn slots_mut(&mut self) -> &mut SlotContainer {
        &mut self.slots
    }

    /// Shows or hides this card's slots, returning the new state.
    pub fn toggle_slots(&mut self) -> Display {
        self.slots.toggle()
    }
}

/// Every doctor card on a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    doctors: Vec<DoctorCard>,
}

impl Page {
    /// Parses an HTML document following the DOM contract.
    ///
    /// Cards are returned unrendered; call [`Page::render_all`]. A
    /// `.doctor` without a `.slots` descendant gets an empty container.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Page`] if a built-in selector fails to
    /// compile.
    pub fn parse(html: &str) -> Result<Self, ClientError> {
        let document = Html::parse_document(html);
        let doctor_sel = selector(DOCTOR_SELECTOR)?;
        let slots_sel = selector(SLOTS_SELECTOR)?;
        let title_sel = selector(TITLE_SELECTOR)?;

        let doctors: Vec<DoctorCard> = document
            .select(&doctor_sel)
            .map(|doctor| card_from_element(doctor, &slots_sel, &title_sel))
            .collect();

        let orphans = document
            .select(&slots_sel)
            .filter(|slots| !has_doctor_ancestor(*slots))
            .count();
        if orphans > 0 {
            tracing::debug!(orphans, "skipping slot containers outside a doctor card");
        }

        tracing::debug!(doctors = doctors.len(), "parsed booking page");
        Ok(Self { doctors })
    }

    /// Downloads and parses the page at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the request fails or the server
    /// answers with an error status, or [`ClientError::Page`] from
    /// [`Page::parse`].
    pub async fn fetch(http: &reqwest::Client, url: Url) -> Result<Self, ClientError> {
        tracing::info!(url = %url, "fetching booking page");
        let html = http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Self::parse(&html)
    }

    /// Renders the slot controls of every card.
    pub fn render_all(&mut self) {
        for card in &mut self.doctors {
            card.slots_mut().render();
        }
    }

    /// All cards, in document order.
    #[must_use]
    pub fn doctors(&self) -> &[DoctorCard] {
        &self.doctors
    }

    /// Card at `index`.
    #[must_use]
    pub fn doctor(&self, index: usize) -> Option<&DoctorCard> {
        self.doctors.get(index)
    }

    /// Mutable card at `index`.
    pub fn doctor_mut(&mut self, index: usize) -> Option<&mut DoctorCard> {
        self.doctors.get_mut(index)
    }
}

fn selector(css: &str) -> Result<Selector, ClientError> {
    Selector::parse(css).map_err(|e| ClientError::Page(format!("selector {css}: {e}")))
}

fn card_from_element(doctor: ElementRef<'_>, slots_sel: &Selector, title_sel: &Selector) -> DoctorCard {
    let raw_id = doctor.value().attr("data-id").map(str::to_string);
    let title = doctor
        .select(title_sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());
    let slots = doctor
        .select(slots_sel)
        .next()
        .map(|el| {
            SlotContainer::new(
                el.value().attr("data-slots").map(str::to_string),
                Display::from_style(el.value().attr("style")),
            )
        })
        .unwrap_or_default();
    DoctorCard::new(raw_id, title, slots)
}

fn has_doctor_ancestor(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|el| el.value().classes().any(|c| c == "doctor"))
}
