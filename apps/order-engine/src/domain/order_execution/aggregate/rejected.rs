//! Rejection audit record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::order_execution::value_objects::{OrderSpec, OrderStatus, Rejection};
use crate::domain::shared::OrderId;

/// A specification that failed validation.
///
/// Never a live `Order`: the record is created directly in `REJECTED` and
/// keeps the raw spec for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedOrder {
    id: OrderId,
    spec: OrderSpec,
    rejection: Rejection,
    created_at: DateTime<Utc>,
}

impl RejectedOrder {
    /// Create a rejection record.
    #[must_use]
    pub const fn new(
        id: OrderId,
        spec: OrderSpec,
        rejection: Rejection,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            spec,
            rejection,
            created_at,
        }
    }

    /// Assigned order ID.
    #[must_use]
    pub const fn id(&self) -> &OrderId {
        &self.id
    }

    /// Submitted spec.
    #[must_use]
    pub const fn spec(&self) -> &OrderSpec {
        &self.spec
    }

    /// Why it was rejected.
    #[must_use]
    pub const fn rejection(&self) -> &Rejection {
        &self.rejection
    }

    /// Always `Rejected`.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        OrderStatus::Rejected
    }

    /// Submission time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
