//! Suggestion dropdown state, independent of any UI toolkit.
//!
//! A [`SuggestionController`] is owned by whoever drives an input box. It gates
//! short inputs, hands out a [`Ticket`] per search so only the newest results
//! are shown, and tracks keyboard highlight and selection. Rendering and
//! positioning stay with the caller.

use crate::listing::Listing;
use serde::Serialize;

/// What a row in the dropdown needs to show and where selecting it leads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionRow {
    /// Navigation key for the listing page.
    pub id: String,
    pub title: String,
    pub city: String,
    pub neighborhood: Option<String>,
    /// Property type as written by the source.
    pub kind: String,
    pub price: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub parking: Option<u32>,
    pub image: Option<String>,
}

impl SuggestionRow {
    /// `"<neighborhood>, <city>"`, or just the city.
    pub fn location(&self) -> String {
        match &self.neighborhood {
            Some(neighborhood) => format!("{}, {}", neighborhood, self.city),
            None => self.city.clone(),
        }
    }
}

impl From<&Listing> for SuggestionRow {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id.clone(),
            title: listing.title.clone(),
            city: listing.city.clone(),
            neighborhood: listing.neighborhood.clone(),
            kind: listing.kind.clone(),
            price: listing.price,
            bedrooms: listing.bedrooms,
            bathrooms: listing.bathrooms,
            parking: listing.parking,
            image: listing.image.clone(),
        }
    }
}

/// Identifies one search request; results carrying an older ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// What the caller should do after the input text changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Input too short or controller detached: hide the dropdown.
    Close,
    /// Run a search for `query` and report back with `ticket`.
    Search { ticket: Ticket, query: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Down,
    Up,
    Enter,
    Escape,
}

#[derive(Debug, Clone)]
pub struct SuggestionController {
    input: Option<String>,
    min_chars: usize,
    generation: u64,
    rows: Vec<SuggestionRow>,
    highlighted: Option<usize>,
    open: bool,
}

impl SuggestionController {
    pub const fn new(min_chars: usize) -> Self {
        Self {
            input: None,
            min_chars,
            generation: 0,
            rows: Vec::new(),
            highlighted: None,
            open: false,
        }
    }

    /// Binds the controller to an input. Rebinding discards current results.
    pub fn attach(&mut self, input_id: impl Into<String>) {
        let input_id = input_id.into();
        if self.input.as_deref() != Some(input_id.as_str()) {
            self.reset();
        }
        tracing::debug!("Suggestion controller attached to '{}'", input_id);
        self.input = Some(input_id);
    }

    /// Unbinds the controller; results still in flight will be discarded.
    pub fn detach(&mut self) -> Option<String> {
        self.reset();
        self.input.take()
    }

    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }

    pub const fn is_open(&self) -> bool {
        self.open
    }

    pub fn rows(&self) -> &[SuggestionRow] {
        &self.rows
    }

    pub fn highlighted(&self) -> Option<&SuggestionRow> {
        self.highlighted.and_then(|i| self.rows.get(i))
    }

    /// Reacts to new input text.
    pub fn on_input(&mut self, text: &str) -> InputAction {
        let query = text.trim();
        if self.input.is_none() || query.chars().count() < self.min_chars {
            self.reset();
            return InputAction::Close;
        }

        self.generation += 1;
        InputAction::Search {
            ticket: Ticket(self.generation),
            query: query.to_string(),
        }
    }

    /// Shows results for a search. Returns false, changing nothing, when the
    /// ticket is stale or the controller is detached.
    pub fn apply(&mut self, ticket: Ticket, rows: Vec<SuggestionRow>) -> bool {
        if self.input.is_none() || ticket.0 != self.generation {
            tracing::trace!(
                "Dropping stale suggestions (ticket {}, current {})",
                ticket.0,
                self.generation
            );
            return false;
        }
        self.open = !rows.is_empty();
        self.rows = rows;
        self.highlighted = None;
        true
    }

    /// Moves the highlight down, wrapping to the first row.
    pub fn move_down(&mut self) -> Option<&SuggestionRow> {
        if !self.open {
            return None;
        }
        let len = self.rows.len();
        self.highlighted = Some(self.highlighted.map_or(0, |i| (i + 1) % len));
        self.highlighted()
    }

    /// Moves the highlight up, wrapping to the last row.
    pub fn move_up(&mut self) -> Option<&SuggestionRow> {
        if !self.open {
            return None;
        }
        let len = self.rows.len();
        self.highlighted = Some(match self.highlighted {
            None | Some(0) => len - 1,
            Some(i) => i - 1,
        });
        self.highlighted()
    }

    /// Selects the highlighted row (or the first one) and closes the dropdown.
    /// Returns the listing id to navigate to.
    pub fn confirm(&mut self) -> Option<String> {
        if !self.open {
            return None;
        }
        let id = self
            .rows
            .get(self.highlighted.unwrap_or(0))
            .map(|row| row.id.clone());
        self.close();
        id
    }

    /// Handles a navigation key; `Enter` yields the id to navigate to.
    pub fn on_key(&mut self, key: Key) -> Option<String> {
        match key {
            Key::Down => {
                self.move_down();
                None
            }
            Key::Up => {
                self.move_up();
                None
            }
            Key::Enter => self.confirm(),
            Key::Escape => {
                self.close();
                None
            }
        }
    }

    /// Hides the dropdown, keeping the attachment.
    pub fn close(&mut self) {
        self.open = false;
        self.rows.clear();
        self.highlighted = None;
    }

    /// Closes and invalidates any outstanding ticket.
    fn reset(&mut self) {
        self.close();
        self.generation += 1;
    }
}

impl Default for SuggestionController {
    fn default() -> Self {
        Self::new(2)
    }
}
