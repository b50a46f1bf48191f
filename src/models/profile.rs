/// Booking availability. Exactly two states; any unrecognized or missing
/// input collapses to `NotAvailable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Availability {
    Available,
    #[default]
    NotAvailable,
}

impl Availability {
    /// Database/form token: "Y" for available, "N" otherwise.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "Y",
            Self::NotAvailable => "N",
        }
    }

    #[must_use]
    pub fn from_str(value: &str) -> Self {
        if value.eq_ignore_ascii_case("y") {
            Self::Available
        } else {
            Self::NotAvailable
        }
    }
}

/// Fields for a brand-new profile row.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub account_id: i32,
    pub is_performer: bool,
    pub act_category: Option<String>,
    pub genre: Option<String>,
    pub bio: Option<String>,
    pub availability: Availability,
    pub location: Option<String>,
    pub image_path: Option<String>,
}

/// Explicit full-field profile update. Every mutable column is named here so
/// the set of allowed mutations is enumerable; `image_path: None` leaves the
/// stored image untouched (an image is only replaced, never cleared, by an
/// edit).
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub is_performer: bool,
    pub act_category: Option<String>,
    pub genre: Option<String>,
    pub bio: Option<String>,
    pub availability: Availability,
    pub location: Option<String>,
    pub image_path: Option<String>,
}
