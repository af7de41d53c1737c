use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user creation event
#[derive(Debug, Serialize, Deserialize)]
pub struct UserCreatedEvent {
    /// @description Unique user identifier
    /// @example user-123
    /// @validate required,uuid4
    #[serde(rename = "userId")]
    pub user_id: String,
    /// @description User email address
    /// @example john.doe@example.com
    /// @validate required,email
    pub email: String,
    /// @description User's display name
    /// @example johndoe
    /// @validate required,alphanum,min=3,max=20
    pub username: String,
    /// @description Timestamp when the user was created
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// An order shipment event
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderShippedEvent {
    /// @validate required,uuid4
    #[serde(rename = "orderId")]
    pub order_id: String,
    /// @description Shipping tracking number
    /// @validate required,alphanum,min=5,max=50
    #[serde(rename = "trackingNumber")]
    pub tracking_number: String,
    /// @description Shipping carrier name
    /// @example UPS
    /// @validate required,oneof=UPS|FedEx|USPS|DHL
    pub carrier: String,
    pub items: Vec<ShippedItem>,
}

/// One line item in a shipment
#[derive(Debug, Serialize, Deserialize)]
pub struct ShippedItem {
    /// @validate required,min=1
    #[serde(rename = "productId")]
    pub product_id: String,
    /// @example 2
    /// @validate required,gte=1,lte=1000
    pub quantity: i64,
}

/// A request for user details
#[derive(Debug, Serialize, Deserialize)]
pub struct GetUserRequest {
    /// @description ID of the user to retrieve
    /// @validate required,uuid4
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// The response carrying user details
#[derive(Debug, Serialize, Deserialize)]
pub struct GetUserResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    /// @validate required,email
    pub email: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip)]
    pub internal_flags: u32,
}
