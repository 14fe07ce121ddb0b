// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod mock_api;

pub use mock_api::{MockWarrantyApi, RecordedRequest};

use time::macros::format_description;
use time::{Date, Duration, Month};
use warrantrack_app::{WarrantyDraft, WarrantyId, WarrantyPayload, WarrantyRecord};

const ITEM_NAMES: [&str; 16] = [
    "Laptop",
    "Refrigerator",
    "Washer",
    "Dryer",
    "Dishwasher",
    "Television",
    "Phone",
    "Tablet",
    "Vacuum",
    "Espresso Machine",
    "Air Purifier",
    "Lawn Mower",
    "Power Drill",
    "Camera",
    "Headphones",
    "Water Heater",
];

const VENDORS: [&str; 12] = [
    "Acme Electronics",
    "Frostline",
    "CleanWave",
    "BrightHome",
    "CoolBreeze",
    "SteadyHeat",
    "QuietFlow",
    "PureAir",
    "IronGuard",
    "ClearView",
    "Summit Supply",
    "Heritage Goods",
];

const WARRANTY_MONTHS: [i64; 7] = [6, 12, 12, 24, 24, 36, 60];

const NOTE_WORDS: [&str; 16] = [
    "receipt",
    "in",
    "drawer",
    "extended",
    "coverage",
    "registered",
    "online",
    "keep",
    "box",
    "serial",
    "on",
    "back",
    "store",
    "credit",
    "card",
    "protection",
];

const EARLIEST_PURCHASE_YEAR: i32 = 2020;
const LATEST_PURCHASE_YEAR: i32 = 2026;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

#[derive(Debug, Clone)]
pub struct WarrantyFaker {
    rng: DeterministicRng,
    next_id: i64,
}

impl WarrantyFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 1,
        }
    }

    pub fn payload(&mut self) -> WarrantyPayload {
        let notes = if self.rng.int_n(3) == 0 {
            String::new()
        } else {
            self.note()
        };
        WarrantyPayload {
            item_name: self.pick(&ITEM_NAMES).to_owned(),
            purchase_date: self.purchase_date(),
            warranty_period_months: WARRANTY_MONTHS[self.rng.int_n(WARRANTY_MONTHS.len())],
            vendor: self.pick(&VENDORS).to_owned(),
            notes,
        }
    }

    pub fn draft(&mut self) -> WarrantyDraft {
        let payload = self.payload();
        WarrantyDraft {
            item_name: payload.item_name,
            purchase_date: payload.purchase_date,
            warranty_period_months: payload.warranty_period_months.to_string(),
            vendor: payload.vendor,
            notes: payload.notes,
        }
    }

    pub fn record(&mut self) -> WarrantyRecord {
        let id = WarrantyId::new(self.next_id);
        self.next_id += 1;
        record_from_payload(id, self.payload())
    }

    pub fn records(&mut self, count: usize) -> Vec<WarrantyRecord> {
        (0..count).map(|_| self.record()).collect()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn purchase_date(&mut self) -> String {
        let span = (LATEST_PURCHASE_YEAR - EARLIEST_PURCHASE_YEAR + 1) as usize;
        let year = EARLIEST_PURCHASE_YEAR + self.rng.int_n(span) as i32;
        let month = self.rng.int_n(12) as u8 + 1;
        let day = self.rng.int_n(28) as u8 + 1;
        format!("{year:04}-{month:02}-{day:02}")
    }

    fn note(&mut self) -> String {
        let count = 2 + self.rng.int_n(4);
        let mut parts = Vec::with_capacity(count);
        for _ in 0..count {
            parts.push(self.pick(&NOTE_WORDS));
        }
        let mut note = parts.join(" ");
        if let Some(first) = note.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        note
    }
}

pub fn record_from_payload(id: WarrantyId, payload: WarrantyPayload) -> WarrantyRecord {
    let expiry_date = expiry_for(&payload.purchase_date, payload.warranty_period_months);
    WarrantyRecord {
        id,
        item_name: payload.item_name,
        purchase_date: payload.purchase_date,
        warranty_period_months: payload.warranty_period_months,
        vendor: payload.vendor,
        notes: payload.notes,
        expiry_date,
    }
}

// Clamps to the last day of the target month.
pub fn expiry_for(purchase_date: &str, months: i64) -> Option<String> {
    let purchased =
        Date::parse(purchase_date.trim(), &format_description!("[year]-[month]-[day]")).ok()?;
    add_months(purchased, months).map(format_date)
}

fn add_months(date: Date, months: i64) -> Option<Date> {
    let total = i64::from(date.year()) * 12 + i64::from(u8::from(date.month())) - 1 + months;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = Month::try_from(u8::try_from(total.rem_euclid(12) + 1).ok()?).ok()?;
    let last_day = (28..=31)
        .rev()
        .find(|day| Date::from_calendar_date(year, month, *day).is_ok())?;
    Date::from_calendar_date(year, month, date.day().min(last_day)).ok()
}

pub fn fixture_today() -> Date {
    time::macros::date!(2024 - 06 - 01)
}

pub fn days_after(date: Date, days: i64) -> String {
    format_date(date + Duration::days(days))
}

fn format_date(date: Date) -> String {
    date.format(&format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}
