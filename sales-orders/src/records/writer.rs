//! Record writer: the strict path used by manual form entry
//!
//! Any coercion failure or missing required field aborts the submission and
//! nothing is written.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{ValidationError, WriteError};
use crate::store::Store;

use super::{Coercion, Entity, FieldNormalizer, NewOrder, NewRepresentative, RawRecord};

/// What to do with an order whose `sales_id` matches no representative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferencePolicy {
    /// Store silently
    Accept,
    /// Store and log a warning
    #[default]
    Warn,
    /// Refuse the order
    Reject,
}

impl FromStr for ReferencePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "accept" => Ok(ReferencePolicy::Accept),
            "warn" => Ok(ReferencePolicy::Warn),
            "reject" => Ok(ReferencePolicy::Reject),
            other => Err(format!(
                "unknown reference policy '{}' (expected accept, warn or reject)",
                other
            )),
        }
    }
}

impl fmt::Display for ReferencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferencePolicy::Accept => write!(f, "accept"),
            ReferencePolicy::Warn => write!(f, "warn"),
            ReferencePolicy::Reject => write!(f, "reject"),
        }
    }
}

/// Validates single form submissions and persists them
pub struct RecordWriter<'a> {
    store: &'a Store,
    normalizer: FieldNormalizer,
    reference_policy: ReferencePolicy,
}

impl<'a> RecordWriter<'a> {
    pub fn new(store: &'a Store, normalizer: FieldNormalizer) -> Self {
        Self {
            store,
            normalizer,
            reference_policy: ReferencePolicy::default(),
        }
    }

    pub fn with_reference_policy(mut self, policy: ReferencePolicy) -> Self {
        self.reference_policy = policy;
        self
    }

    /// Submit a form record for either entity, returning the new id
    pub async fn submit(&self, entity: Entity, input: &RawRecord) -> Result<i64, WriteError> {
        match entity {
            Entity::Representatives => self.add_representative(input).await,
            Entity::Orders => self.add_order(input).await,
        }
    }

    pub async fn add_representative(&self, input: &RawRecord) -> Result<i64, WriteError> {
        let normalized =
            self.normalizer
                .normalize(Entity::Representatives, input, Coercion::Strict)?;
        let rep = NewRepresentative::from_canonical(&normalized.record, self.normalizer.today());

        if rep.name.is_empty() {
            return Err(ValidationError::MissingField { field: "name" }.into());
        }

        let id = self.store.insert_representative(&rep).await?;
        log::info!("Added sales representative {} ({})", id, rep.name);
        Ok(id)
    }

    pub async fn add_order(&self, input: &RawRecord) -> Result<i64, WriteError> {
        let normalized = self
            .normalizer
            .normalize(Entity::Orders, input, Coercion::Strict)?;
        let order = NewOrder::from_canonical(&normalized.record, self.normalizer.today());

        if order.customer_name.is_empty() {
            return Err(ValidationError::MissingField {
                field: "customer_name",
            }
            .into());
        }

        self.check_reference(order.sales_id).await?;

        let id = self.store.insert_order(&order).await?;
        log::info!(
            "Added order {} for {} (sales {})",
            id,
            order.customer_name,
            order.sales_id
        );
        Ok(id)
    }

    async fn check_reference(&self, sales_id: i64) -> Result<(), WriteError> {
        if self.reference_policy == ReferencePolicy::Accept {
            return Ok(());
        }
        if self.store.representative_exists(sales_id).await? {
            return Ok(());
        }

        match self.reference_policy {
            ReferencePolicy::Reject => {
                Err(ValidationError::UnknownRepresentative { id: sales_id }.into())
            }
            _ => {
                log::warn!(
                    "Order references sales representative {} which does not exist",
                    sales_id
                );
                Ok(())
            }
        }
    }
}
