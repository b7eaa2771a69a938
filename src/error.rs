use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("exchange unavailable: {0}")]
    ExchangeUnavailable(String),

    #[error("notification delivery failed: {0}")]
    NotificationDeliveryFailed(String),
}
