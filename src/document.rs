//! Domain document types and payload building.
//!
//! `Document` mirrors the ISMP create-document request. Date fields carry day
//! granularity only (`NaiveDate`, serialized as `YYYY-MM-DD`), no time of day
//! or zone. Fields the API allows to be absent are `Option`; the wire names
//! are camelCase.

use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::Result;

/// A document awaiting submission to the marking API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub description: Option<String>,
    pub doc_id: Option<String>,
    pub doc_status: Option<String>,
    pub doc_type: Option<String>,
    pub import_request: Option<bool>,
    pub owner_inn: Option<String>,
    pub participant_inn: Option<String>,
    pub producer_inn: Option<String>,
    pub production_date: Option<NaiveDate>,
    pub production_type: Option<String>,
    pub reg_date: Option<NaiveDate>,
    pub reg_number: Option<String>,
    pub products: Option<Product>,
}

/// Product block nested inside a [`Document`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub certificate_document_date: Option<NaiveDate>,
    pub certificate_document_number: Option<String>,
    pub production_date: Option<NaiveDate>,
    pub tnved_code: Option<String>,
    pub uit_code: Option<String>,
    pub uitu_code: Option<String>,
}

impl Document {
    /// Build the JSON wire body. Deterministic for a given document.
    pub fn to_body(&self) -> Result<Bytes> {
        let json = serde_json::to_vec(self)?;
        Ok(Bytes::from(json))
    }
}
