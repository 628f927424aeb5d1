//! Pre-admission validation.
//!
//! Required fields are declared explicitly per type instead of discovered by
//! runtime introspection. A rejection short-circuits submission before the
//! envelope ever reaches the queue.

use crate::document::{Document, Product};
use crate::types::{Error, Result};

/// Check a detached signature: must be present and non-blank.
pub fn validate_signature(signature: &str) -> Result<()> {
    if signature.trim().is_empty() {
        return Err(Error::validation("signature must not be blank"));
    }
    Ok(())
}

/// Check a document against the declared required-field lists. Reports every
/// missing field at once rather than stopping at the first.
pub fn validate_document(document: &Document) -> Result<()> {
    let missing = missing_fields(document);
    if missing.is_empty() {
        return Ok(());
    }
    Err(Error::validation(format!(
        "missing required fields: {}",
        missing.join(", ")
    )))
}

fn missing_fields(document: &Document) -> Vec<&'static str> {
    let mut missing = Vec::new();

    push_if_blank(&mut missing, "description", &document.description);
    push_if_blank(&mut missing, "docId", &document.doc_id);
    push_if_blank(&mut missing, "docStatus", &document.doc_status);
    push_if_blank(&mut missing, "docType", &document.doc_type);
    push_if_none(&mut missing, "importRequest", document.import_request.is_none());
    push_if_blank(&mut missing, "ownerInn", &document.owner_inn);
    push_if_blank(&mut missing, "participantInn", &document.participant_inn);
    push_if_blank(&mut missing, "producerInn", &document.producer_inn);
    push_if_none(&mut missing, "productionDate", document.production_date.is_none());
    push_if_blank(&mut missing, "productionType", &document.production_type);
    push_if_none(&mut missing, "regDate", document.reg_date.is_none());
    push_if_blank(&mut missing, "regNumber", &document.reg_number);

    match &document.products {
        None => missing.push("products"),
        Some(products) => collect_product_fields(&mut missing, products),
    }

    missing
}

fn collect_product_fields(missing: &mut Vec<&'static str>, products: &Product) {
    push_if_none(
        missing,
        "products.certificateDocumentDate",
        products.certificate_document_date.is_none(),
    );
    push_if_blank(
        missing,
        "products.certificateDocumentNumber",
        &products.certificate_document_number,
    );
    push_if_none(
        missing,
        "products.productionDate",
        products.production_date.is_none(),
    );
    push_if_blank(missing, "products.tnvedCode", &products.tnved_code);
    push_if_blank(missing, "products.uitCode", &products.uit_code);
    push_if_blank(missing, "products.uituCode", &products.uitu_code);
}

fn push_if_blank(missing: &mut Vec<&'static str>, field: &'static str, value: &Option<String>) {
    if value.as_deref().map_or(true, |s| s.trim().is_empty()) {
        missing.push(field);
    }
}

fn push_if_none(missing: &mut Vec<&'static str>, field: &'static str, is_none: bool) {
    if is_none {
        missing.push(field);
    }
}
