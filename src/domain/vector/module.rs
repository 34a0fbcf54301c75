//! VectorModule - collects one response per item and reduces them to a
//! normalized affinity distribution.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::affinity::{AffinityNormalizer, AffinityTally};

use super::{AssessmentItem, VectorError, VectorKind, VectorResponse, VectorResult};

/// One assessment channel with its fixed, ordered item list.
///
/// Catalogs are validated when the module is constructed, so scoring never
/// has to re-check option payloads.
#[derive(Debug, Clone)]
pub struct VectorModule {
    kind: VectorKind,
    items: Vec<AssessmentItem>,
    responses: Vec<VectorResponse>,
}

impl VectorModule {
    /// Creates a module after validating its catalog.
    ///
    /// # Errors
    ///
    /// Returns `VectorError::InvalidCatalog` when the item list is empty,
    /// an item has no options, ids repeat, or an attachment weight is
    /// negative or non-finite.
    pub fn new(kind: VectorKind, items: Vec<AssessmentItem>) -> Result<Self, VectorError> {
        validate_catalog(kind, &items)?;
        Ok(Self {
            kind,
            items,
            responses: Vec::new(),
        })
    }

    pub fn kind(&self) -> VectorKind {
        self.kind
    }

    pub fn items(&self) -> &[AssessmentItem] {
        &self.items
    }

    /// Responses collected so far, in collection order.
    pub fn responses(&self) -> &[VectorResponse] {
        &self.responses
    }

    /// Records a response. Re-answering an item replaces the earlier
    /// answer in place.
    ///
    /// Scoring always uses the catalog option's attachments; whatever
    /// attachments the response carries are replaced before it is stored.
    ///
    /// # Errors
    ///
    /// - `UnknownItem` / `UnknownOption` when the ids are not in the catalog
    /// - `InvalidWeight` when a carried attachment weight is negative or
    ///   non-finite
    pub fn collect(&mut self, mut response: VectorResponse) -> Result<(), VectorError> {
        let item = self
            .items
            .iter()
            .find(|i| i.id == response.item_id)
            .ok_or_else(|| VectorError::UnknownItem {
                vector: self.kind,
                item_id: response.item_id.clone(),
            })?;

        let option = item
            .option(&response.option_id)
            .ok_or_else(|| VectorError::UnknownOption {
                vector: self.kind,
                item_id: response.item_id.clone(),
                option_id: response.option_id.clone(),
            })?;

        if let Some(bad) = response.affinities.iter().find(|a| !a.is_valid()) {
            return Err(VectorError::InvalidWeight {
                item_id: response.item_id.clone(),
                weight: bad.weight,
            });
        }

        if response.affinities != option.affinities {
            debug!(
                vector = %self.kind,
                item_id = %response.item_id,
                option_id = %response.option_id,
                "Replacing response attachments with catalog attachments"
            );
            response.affinities = option.affinities.clone();
        }

        debug!(
            vector = %self.kind,
            item_id = %response.item_id,
            option_id = %response.option_id,
            "Collected response"
        );

        match self
            .responses
            .iter_mut()
            .find(|r| r.item_id == response.item_id)
        {
            Some(existing) => *existing = response,
            None => self.responses.push(response),
        }
        Ok(())
    }

    /// Answers an item by option id, taking the attachments from the catalog.
    pub fn answer(&mut self, item_id: &str, option_id: &str) -> Result<(), VectorError> {
        let option = self
            .items
            .iter()
            .find(|i| i.id == item_id)
            .ok_or_else(|| VectorError::UnknownItem {
                vector: self.kind,
                item_id: item_id.to_string(),
            })?
            .option(option_id)
            .ok_or_else(|| VectorError::UnknownOption {
                vector: self.kind,
                item_id: item_id.to_string(),
                option_id: option_id.to_string(),
            })?;

        let response = VectorResponse::new(item_id, option_id, option.affinities.clone());
        self.collect(response)
    }

    /// Records a full batch of responses addressed to `vector`.
    ///
    /// The batch is applied response by response; the first invalid
    /// response stops the batch and earlier ones stay recorded.
    pub fn collect_batch(
        &mut self,
        vector: VectorKind,
        responses: Vec<VectorResponse>,
    ) -> Result<(), VectorError> {
        if vector != self.kind {
            return Err(VectorError::VectorMismatch {
                expected: self.kind,
                actual: vector,
            });
        }
        for response in responses {
            self.collect(response)?;
        }
        Ok(())
    }

    /// True iff a response exists for every item.
    pub fn is_complete(&self) -> bool {
        self.items
            .iter()
            .all(|item| self.responses.iter().any(|r| r.item_id == item.id))
    }

    /// Ids of items still awaiting a response, in catalog order.
    pub fn missing_items(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| !self.responses.iter().any(|r| r.item_id == item.id))
            .map(|item| item.id.as_str())
            .collect()
    }

    /// Reduces the collected responses to a `VectorResult`.
    ///
    /// # Edge Cases
    /// - Zero responses: returns the all-zero distribution
    /// - Options with no attachments contribute nothing
    ///
    /// # Errors
    ///
    /// Returns `IncompleteAssessment` when some, but not all, items have
    /// been answered.
    pub fn finalize(&self) -> Result<VectorResult, VectorError> {
        if !self.responses.is_empty() && !self.is_complete() {
            return Err(VectorError::IncompleteAssessment {
                vector: self.kind,
                answered: self.responses.len(),
                required: self.items.len(),
            });
        }

        let mut tally = AffinityTally::new();
        for response in &self.responses {
            for attachment in &response.affinities {
                tally.add(attachment.trauma_type, attachment.weight);
            }
        }

        let distribution = AffinityNormalizer::normalize(&tally);
        Ok(VectorResult::collected(
            self.kind,
            distribution,
            self.responses.clone(),
        ))
    }

    /// Discards collected responses.
    pub fn reset(&mut self) {
        self.responses.clear();
    }
}

fn validate_catalog(kind: VectorKind, items: &[AssessmentItem]) -> Result<(), VectorError> {
    if items.is_empty() {
        return Err(VectorError::invalid_catalog(kind, "no items"));
    }

    let mut item_ids = HashSet::new();
    for item in items {
        if item.id.is_empty() {
            return Err(VectorError::invalid_catalog(kind, "empty item id"));
        }
        if !item_ids.insert(item.id.as_str()) {
            return Err(VectorError::invalid_catalog(
                kind,
                format!("duplicate item '{}'", item.id),
            ));
        }
        if item.options.is_empty() {
            return Err(VectorError::invalid_catalog(
                kind,
                format!("item '{}' has no options", item.id),
            ));
        }

        let mut option_ids = HashSet::new();
        for option in &item.options {
            if !option_ids.insert(option.id.as_str()) {
                return Err(VectorError::invalid_catalog(
                    kind,
                    format!("duplicate option '{}' on item '{}'", option.id, item.id),
                ));
            }
            if let Some(bad) = option.affinities.iter().find(|a| !a.is_valid()) {
                return Err(VectorError::invalid_catalog(
                    kind,
                    format!(
                        "option '{}' on item '{}' has invalid weight {}",
                        option.id, item.id, bad.weight
                    ),
                ));
            }
        }
    }
    Ok(())
}
