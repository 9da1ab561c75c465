//! Rate-limited message delivery.
//!
//! - [`DeliveryLimiter`]: token bucket bounding the outbound send rate.
//! - [`Dispatcher`]: sends one message through the limiter with a single
//!   retry for quota and transient failures.
//! - [`DeliveryTransport`]: raw delivery capability, implemented for Gmail by
//!   [`GmailClient`].

pub mod dispatcher;
pub mod error;
pub mod gmail;
pub mod limiter;
pub mod transport;

pub use dispatcher::{DispatchPolicy, Dispatcher};
pub use error::{DeliveryError, FailureKind, LimiterConfigError};
pub use gmail::GmailClient;
pub use limiter::{DeliveryLimiter, DeliveryPermit, MAX_BACK_OFF};
pub use transport::{AccessToken, DeliveryReceipt, DeliveryTransport, OutboundMessage};
