use serde::{Deserialize, Serialize};

/// Lifecycle status of an order. `Draft` is the only state the end user can
/// mutate or delete; everything past `New` is driven by admin commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Draft,
    New,
    InProgress,
    Completed,
    Canceled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::New => "NEW",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Canceled => "CANCELED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl std::str::FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(Self::Draft),
            "NEW" => Ok(Self::New),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELED" => Ok(Self::Canceled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Who placed the order, captured from the inbound event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// An order aggregate, owned exclusively by [`OrderService`].
///
/// [`OrderService`]: crate::service::OrderService
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Globally unique id (UUID v4), assigned on first save.
    pub id: String,
    pub chat_id: i64,
    pub status: OrderStatus,
    pub service: Option<String>,
    pub subtype: Option<String>,
    /// Populated when the user submits the free-text description.
    pub description: Option<String>,
    pub requester: Option<Requester>,
    /// Unix millis; never changes after first save.
    pub created_at: i64,
    /// Unix millis; monotonically non-decreasing across saves.
    pub updated_at: i64,
}

impl Order {
    /// A blank order for `chat_id`; id and timestamps are filled in on save.
    pub fn draft(chat_id: i64) -> Self {
        Self {
            id: String::new(),
            chat_id,
            status: OrderStatus::Draft,
            service: None,
            subtype: None,
            description: None,
            requester: None,
            created_at: 0,
            updated_at: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::str::FromStr};

    #[test]
    fn test_status_round_trip() {
        for status in [
            OrderStatus::Draft,
            OrderStatus::New,
            OrderStatus::InProgress,
            OrderStatus::Completed,
            OrderStatus::Canceled,
        ] {
            assert_eq!(OrderStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_status_unknown() {
        assert!(OrderStatus::from_str("SHIPPED").is_err());
    }

    #[test]
    fn test_status_serde_wire_form() {
        let json = serde_json::to_string(&OrderStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
    }
}
