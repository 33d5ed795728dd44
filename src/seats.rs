//! Empty-seat arithmetic for a 3-3 single-aisle cabin.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Empty seats per category. Two of each category exist per row.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SeatState {
    pub window: u32,
    pub middle: u32,
    pub aisle: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatCategory {
    Window,
    Middle,
    Aisle,
}

impl SeatState {
    pub fn new(window: u32, middle: u32, aisle: u32) -> Self {
        Self {
            window,
            middle,
            aisle,
        }
    }

    /// Fully empty cabin with `rows` rows.
    pub fn empty_cabin(rows: u32) -> Self {
        let per_category = rows.saturating_mul(2);
        Self::new(per_category, per_category, per_category)
    }

    fn take(&mut self, category: SeatCategory) {
        let counter = match category {
            SeatCategory::Window => &mut self.window,
            SeatCategory::Middle => &mut self.middle,
            SeatCategory::Aisle => &mut self.aisle,
        };
        *counter = counter.saturating_sub(1);
    }
}

impl fmt::Display for SeatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Window: {}, Middle: {}, Aisle: {}",
            self.window, self.middle, self.aisle
        )
    }
}

/// Category of a seat code such as `12A`; the column letter sits at index 2.
pub fn category_of(code: &str) -> Option<SeatCategory> {
    match code.as_bytes().get(2)? {
        b'A' | b'F' => Some(SeatCategory::Window),
        b'B' | b'E' => Some(SeatCategory::Middle),
        b'C' | b'D' => Some(SeatCategory::Aisle),
        _ => None,
    }
}

/// Empty seats left once every code in `unavailable` is taken out of a full cabin.
pub fn calculate<S: AsRef<str>>(rows: u32, unavailable: &[S]) -> SeatState {
    unavailable
        .iter()
        .filter_map(|code| category_of(code.as_ref()))
        .fold(SeatState::empty_cabin(rows), |mut state, category| {
            state.take(category);
            state
        })
}
