//! HubSpot invoice lookups for record-page panels.
//!
//! Two flows resolve invoices for a CRM record: by the location of a property
//! record, and by the invoice id stored on a conference record. Both are exposed
//! as serverless-style functions and rendered by [`panel::Panel`].

pub mod associate;
pub mod backfill;
pub mod config;
pub mod crm;
pub mod handler;
pub mod lookup;
pub mod models;
pub mod panel;
pub mod pipeline;
pub mod report;
