// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarrantyRecord {
    pub id: WarrantyId,
    pub item_name: String,
    pub purchase_date: String,
    pub warranty_period_months: i64,
    pub vendor: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
    #[serde(default)]
    pub expiry_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarrantyPayload {
    pub item_name: String,
    pub purchase_date: String,
    pub warranty_period_months: i64,
    pub vendor: String,
    pub notes: String,
}

impl WarrantyRecord {
    pub fn payload(&self) -> WarrantyPayload {
        WarrantyPayload {
            item_name: self.item_name.clone(),
            purchase_date: self.purchase_date.clone(),
            warranty_period_months: self.warranty_period_months,
            vendor: self.vendor.clone(),
            notes: self.notes.clone(),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenKind {
    Create,
    Lookup,
    Inventory,
}

impl ScreenKind {
    pub const ALL: [Self; 3] = [Self::Create, Self::Lookup, Self::Inventory];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Create => "add",
            Self::Lookup => "search",
            Self::Inventory => "inventory",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Create => "Add New Warranty",
            Self::Lookup => "Search Warranty by ID",
            Self::Inventory => "All Warranties",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "add" | "create" => Some(Self::Create),
            "search" | "lookup" => Some(Self::Lookup),
            "inventory" | "all" => Some(Self::Inventory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppMode {
    Nav,
    Input,
}
