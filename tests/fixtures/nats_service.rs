//! Example NATS service entry point.
//!
//! @title NATS Message Service
//! @version 1.0.0
//! @description A NATS-based message service for handling user and order events
//! @termsofservice https://example.com/terms
//! @contact.name NATS Service Team
//! @contact.email nats-support@example.com
//! @license.name Apache 2.0
//! @license.url https://www.apache.org/licenses/LICENSE-2.0.html
//! @tag users - User management events
//! @tag orders - Order processing events
//! @externaldocs.description NATS Service Documentation
//! @externaldocs.url https://docs.example.com/nats-service
//! @protocol nats
//! @url nats://localhost:4222

mod types;

use types::*;

fn main() {
    let service = Service;
    service.publish_user_created();
}

pub struct Service;

impl Service {
    /// Publishes a user created event
    /// @type pub
    /// @name user.created
    /// @summary User Created Event
    /// @description Publishes an event when a new user is created in the system
    /// @payload UserCreatedEvent
    /// @operation.tag users
    /// @operation.tag events
    /// @channel.title User Creation Channel
    /// @channel.description Channel for broadcasting user creation events
    /// @message.contenttype application/json
    /// @message.title User Created Message
    /// @message.tag user-events
    /// @binding.nats.queue user-creation-queue
    pub fn publish_user_created(&self) {}

    /// Subscribes to order shipment events
    /// @type sub
    /// @name order.{orderId}.shipped
    /// @summary Order Shipped Event
    /// @description Subscribes to events when an order is shipped
    /// @payload OrderShippedEvent
    pub fn subscribe_order_shipped(&self) {}

    /// Sends a request to get user details and waits for a response
    /// @type request
    /// @name user.get
    /// @summary Get User Request
    /// @description Sends a request to retrieve user details by ID
    /// @payload GetUserRequest
    /// @response GetUserResponse
    pub fn request_get_user(&self) {}
}
