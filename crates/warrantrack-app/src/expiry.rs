// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};

pub const EXPIRING_SOON_DAYS: i64 = 30;
const SECONDS_PER_DAY: i64 = 86_400;
const WARNING_GLYPH: &str = "⚠️";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpiryClass {
    Expired,
    ExpiringSoon,
    Valid,
}

impl ExpiryClass {
    pub const fn for_days(days_until_expiry: i64) -> Self {
        if days_until_expiry < 0 {
            Self::Expired
        } else if days_until_expiry <= EXPIRING_SOON_DAYS {
            Self::ExpiringSoon
        } else {
            Self::Valid
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::ExpiringSoon => "expiring-soon",
            Self::Valid => "valid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryStatus {
    pub days_until_expiry: i64,
    pub class: ExpiryClass,
}

impl ExpiryStatus {
    pub fn derive(expiry: Date, now: OffsetDateTime) -> Self {
        let days_until_expiry = days_until_expiry(expiry, now);
        Self {
            days_until_expiry,
            class: ExpiryClass::for_days(days_until_expiry),
        }
    }

    pub fn from_raw(raw: Option<&str>, now: OffsetDateTime) -> Option<Self> {
        raw.and_then(parse_expiry_date)
            .map(|expiry| Self::derive(expiry, now))
    }
}

// Partial days round up.
pub fn days_until_expiry(expiry: Date, now: OffsetDateTime) -> i64 {
    let expiry_start = expiry.with_time(Time::MIDNIGHT).assume_utc();
    let seconds = (expiry_start - now).whole_seconds();
    let days = seconds.div_euclid(SECONDS_PER_DAY);
    if seconds.rem_euclid(SECONDS_PER_DAY) == 0 {
        days
    } else {
        days + 1
    }
}

pub fn parse_expiry_date(raw: &str) -> Option<Date> {
    let trimmed = raw.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    if let Some(rest) = trimmed.get(10..)
        && !rest.is_empty()
        && !rest.starts_with(['T', 't', ' '])
    {
        return None;
    }
    Date::parse(date_part, format_description!("[year]-[month]-[day]")).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryFormat {
    pub warning_glyph: bool,
    pub show_distant: bool,
}

impl ExpiryFormat {
    pub const LOOKUP: Self = Self {
        warning_glyph: true,
        show_distant: true,
    };

    pub const INVENTORY: Self = Self {
        warning_glyph: false,
        show_distant: false,
    };

    pub fn render(self, status: ExpiryStatus) -> String {
        let days = status.days_until_expiry;
        match status.class {
            ExpiryClass::Expired => format!("Expired {} days ago", days.unsigned_abs()),
            ExpiryClass::ExpiringSoon if days == 0 => "Expires today".to_owned(),
            ExpiryClass::ExpiringSoon if self.warning_glyph => {
                format!("{WARNING_GLYPH} Expires in {days} days")
            }
            ExpiryClass::ExpiringSoon => format!("Expires in {days} days"),
            ExpiryClass::Valid if self.show_distant => format!("Expires in {days} days"),
            ExpiryClass::Valid => String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryPolicy {
    pub lookup: ExpiryFormat,
    pub inventory: ExpiryFormat,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self {
            lookup: ExpiryFormat::LOOKUP,
            inventory: ExpiryFormat::INVENTORY,
        }
    }
}
