use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Property names used on the invoice object
pub mod invoice_props {
    pub const NUMBER: &str = "hs_number";
    pub const STATUS: &str = "hs_invoice_status";
    pub const CREATE_DATE: &str = "hs_createdate";
    pub const INVOICE_DATE: &str = "hs_invoice_date";
    pub const AMOUNT_BILLED: &str = "hs_amount_billed";
    pub const AMOUNT_PAID: &str = "hs_amount_paid";
    pub const DUE_DATE: &str = "hs_due_date";
    pub const BALANCE_DUE: &str = "hs_balance_due";
    pub const LOCATION_ID: &str = "location_id";
    pub const INVOICE_ID: &str = "invoice_id";
    pub const OBJECT_ID: &str = "hs_object_id";
}

/// A raw CRM object as returned by the point lookup and search endpoints.
///
/// HubSpot may omit any property or send it as `null`, so every value is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrmObject {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, Option<String>>,
}

impl CrmObject {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: HashMap::new(),
        }
    }

    /// Builder-style setter, mostly handy for fixtures
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.properties.insert(name.to_string(), Some(value.into()));
        self
    }

    /// Non-empty value of a property, if any
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .get(name)
            .and_then(|v| v.as_deref())
            .filter(|v| !v.is_empty())
    }
}

/// The "property" (real estate) custom object, only the field we need
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRecord {
    pub id: String,
    pub location_id: Option<String>,
}

impl From<CrmObject> for PropertyRecord {
    fn from(object: CrmObject) -> Self {
        let location_id = object.property(invoice_props::LOCATION_ID).map(str::to_string);
        Self {
            id: object.id,
            location_id,
        }
    }
}

/// The conference custom object, only the field we need
#[derive(Debug, Clone, PartialEq)]
pub struct ConferenceRecord {
    pub id: String,
    pub invoice_id: Option<String>,
}

impl From<CrmObject> for ConferenceRecord {
    fn from(object: CrmObject) -> Self {
        let invoice_id = object.property(invoice_props::INVOICE_ID).map(str::to_string);
        Self {
            id: object.id,
            invoice_id,
        }
    }
}

/// Typed view over an invoice object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceRecord {
    pub id: String,
    pub number: Option<String>,
    pub status: Option<String>,
    pub create_date: Option<String>,
    pub invoice_date: Option<String>,
    pub amount_billed: Option<String>,
    pub amount_paid: Option<String>,
    pub due_date: Option<String>,
    pub balance_due: Option<String>,
    pub location_id: Option<String>,
    pub invoice_id: Option<String>,
}

impl From<&CrmObject> for InvoiceRecord {
    fn from(object: &CrmObject) -> Self {
        let get = |name: &str| object.property(name).map(str::to_string);
        Self {
            id: object.id.clone(),
            number: get(invoice_props::NUMBER),
            status: get(invoice_props::STATUS),
            create_date: get(invoice_props::CREATE_DATE),
            invoice_date: get(invoice_props::INVOICE_DATE),
            amount_billed: get(invoice_props::AMOUNT_BILLED),
            amount_paid: get(invoice_props::AMOUNT_PAID),
            due_date: get(invoice_props::DUE_DATE),
            balance_due: get(invoice_props::BALANCE_DUE),
            location_id: get(invoice_props::LOCATION_ID),
            invoice_id: get(invoice_props::INVOICE_ID),
        }
    }
}

/// Row shown in the invoice table (field renames only)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    pub id: String,
    pub invoice_number: Option<String>,
    pub status: Option<String>,
    pub create_date: Option<String>,
    pub amount_billed: Option<String>,
    pub due_date: Option<String>,
    pub balance: Option<String>,
}

impl From<InvoiceRecord> for InvoiceSummary {
    fn from(record: InvoiceRecord) -> Self {
        Self {
            id: record.id,
            invoice_number: record.number,
            status: record.status,
            create_date: record.create_date,
            amount_billed: record.amount_billed,
            due_date: record.due_date,
            balance: record.balance_due,
        }
    }
}

/// Single invoice shown in the detail card; keeps the CRM property names
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceDetail {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hs_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hs_invoice_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hs_invoice_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hs_amount_billed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hs_amount_paid: Option<String>,
}

impl From<InvoiceRecord> for InvoiceDetail {
    fn from(record: InvoiceRecord) -> Self {
        Self {
            id: record.id,
            hs_number: record.number,
            hs_invoice_status: record.status,
            hs_invoice_date: record.invoice_date,
            hs_amount_billed: record.amount_billed,
            hs_amount_paid: record.amount_paid,
        }
    }
}
