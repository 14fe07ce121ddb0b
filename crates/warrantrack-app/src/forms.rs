// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::error;
use std::fmt;

use crate::{WarrantyPayload, WarrantyRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    ItemName,
    PurchaseDate,
    WarrantyPeriodMonths,
    Vendor,
    Notes,
}

impl DraftField {
    pub const ALL: [Self; 5] = [
        Self::ItemName,
        Self::PurchaseDate,
        Self::WarrantyPeriodMonths,
        Self::Vendor,
        Self::Notes,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::ItemName => "Item Name",
            Self::PurchaseDate => "Purchase Date",
            Self::WarrantyPeriodMonths => "Warranty Period (Months)",
            Self::Vendor => "Vendor Name",
            Self::Notes => "Notes (Optional)",
        }
    }

    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::PurchaseDate => "YYYY-MM-DD",
            Self::WarrantyPeriodMonths => "e.g. 24",
            _ => "",
        }
    }

    pub fn rotate(self, delta: isize) -> Self {
        let len = Self::ALL.len() as isize;
        let current = Self::ALL
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0) as isize;
        Self::ALL[(current + delta).rem_euclid(len) as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftIssue {
    MissingItemName,
    MissingPurchaseDate,
    MissingWarrantyPeriod,
    MissingVendor,
    NonNumericWarrantyPeriod,
}

impl DraftIssue {
    pub const fn message(self) -> &'static str {
        match self {
            Self::MissingItemName => "Please fill out the Item Name field.",
            Self::MissingPurchaseDate => "Please fill out the Purchase Date field.",
            Self::MissingWarrantyPeriod => "Please fill out the Warranty Period field.",
            Self::MissingVendor => "Please fill out the Vendor field.",
            Self::NonNumericWarrantyPeriod => "Warranty Period must be a valid number.",
        }
    }

    pub const fn field(self) -> DraftField {
        match self {
            Self::MissingItemName => DraftField::ItemName,
            Self::MissingPurchaseDate => DraftField::PurchaseDate,
            Self::MissingWarrantyPeriod | Self::NonNumericWarrantyPeriod => {
                DraftField::WarrantyPeriodMonths
            }
            Self::MissingVendor => DraftField::Vendor,
        }
    }
}

impl fmt::Display for DraftIssue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl error::Error for DraftIssue {}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WarrantyDraft {
    pub item_name: String,
    pub purchase_date: String,
    pub warranty_period_months: String,
    pub vendor: String,
    pub notes: String,
}

impl WarrantyDraft {
    pub fn from_record(record: &WarrantyRecord) -> Self {
        Self {
            item_name: record.item_name.clone(),
            purchase_date: record.purchase_date.clone(),
            warranty_period_months: record.warranty_period_months.to_string(),
            vendor: record.vendor.clone(),
            notes: record.notes.clone(),
        }
    }

    pub fn field(&self, field: DraftField) -> &str {
        match field {
            DraftField::ItemName => &self.item_name,
            DraftField::PurchaseDate => &self.purchase_date,
            DraftField::WarrantyPeriodMonths => &self.warranty_period_months,
            DraftField::Vendor => &self.vendor,
            DraftField::Notes => &self.notes,
        }
    }

    pub fn field_mut(&mut self, field: DraftField) -> &mut String {
        match field {
            DraftField::ItemName => &mut self.item_name,
            DraftField::PurchaseDate => &mut self.purchase_date,
            DraftField::WarrantyPeriodMonths => &mut self.warranty_period_months,
            DraftField::Vendor => &mut self.vendor,
            DraftField::Notes => &mut self.notes,
        }
    }

    pub fn is_blank(&self) -> bool {
        DraftField::ALL
            .iter()
            .all(|field| self.field(*field).is_empty())
    }

    pub fn validate(&self) -> Result<WarrantyPayload, DraftIssue> {
        if self.item_name.trim().is_empty() {
            return Err(DraftIssue::MissingItemName);
        }
        if self.purchase_date.trim().is_empty() {
            return Err(DraftIssue::MissingPurchaseDate);
        }
        if self.warranty_period_months.trim().is_empty() {
            return Err(DraftIssue::MissingWarrantyPeriod);
        }
        if self.vendor.trim().is_empty() {
            return Err(DraftIssue::MissingVendor);
        }
        if !is_numeric(&self.warranty_period_months) {
            return Err(DraftIssue::NonNumericWarrantyPeriod);
        }
        let months = leading_integer(&self.warranty_period_months)
            .ok_or(DraftIssue::NonNumericWarrantyPeriod)?;

        Ok(WarrantyPayload {
            item_name: self.item_name.clone(),
            purchase_date: self.purchase_date.clone(),
            warranty_period_months: months,
            vendor: self.vendor.clone(),
            notes: self.notes.clone(),
        })
    }
}

fn is_numeric(raw: &str) -> bool {
    raw.trim()
        .parse::<f64>()
        .is_ok_and(|value| value.is_finite())
}

// "12.5" -> 12, "1e2" -> 1; text without leading digits has no integer value.
fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let (sign, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits = rest
        .char_indices()
        .take_while(|(_, ch)| ch.is_ascii_digit())
        .map(|(index, ch)| index + ch.len_utf8())
        .last()
        .map(|end| &rest[..end])?;
    digits.parse::<i64>().ok().map(|value| value * sign)
}
