use chrono::Utc;
use tracing::info;

use crate::error::NotifyError;
use crate::exchange::PortfolioSource;
use crate::portfolio::PortfolioSummary;

pub trait MessageSink {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

// Fetch, format, send. The send only happens once the fetch has completed;
// every invocation produces a fresh message, nothing is deduplicated.
pub async fn run<S, N>(source: &S, sink: &N) -> Result<PortfolioSummary, NotifyError>
where
    S: PortfolioSource,
    N: MessageSink,
{
    let summary = source.portfolio().await?;
    info!("{}", summary);

    sink.send(&summary.to_message(Utc::now())).await?;
    info!("Portfolio summary sent ({} holdings)", summary.holdings.len());

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rust_decimal_macros::dec;

    use super::*;
    use crate::portfolio::Holding;

    struct FakeSource {
        summary: Option<PortfolioSummary>,
    }

    impl PortfolioSource for FakeSource {
        async fn portfolio(&self) -> Result<PortfolioSummary, NotifyError> {
            self.summary
                .clone()
                .ok_or_else(|| NotifyError::ExchangeUnavailable(String::from("HTTP 401")))
        }
    }

    struct FakeSink {
        fail: bool,
        sent: Mutex<Vec<String>>,
    }

    impl FakeSink {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl MessageSink for FakeSink {
        async fn send(&self, text: &str) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::NotificationDeliveryFailed(String::from(
                    "chat not found",
                )));
            }
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn summary() -> PortfolioSummary {
        let mut summary = PortfolioSummary::new(940);
        summary.push(Holding::valued(String::from("BTC"), dec!(0.5), Some(dec!(60000))));
        summary
    }

    #[tokio::test]
    async fn test_exchange_failure_skips_send() {
        let source = FakeSource { summary: None };
        let sink = FakeSink::new(false);

        let res = run(&source, &sink).await;
        assert!(matches!(res, Err(NotifyError::ExchangeUnavailable(_))));
        assert!(sink.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_failure_surfaces() {
        let source = FakeSource {
            summary: Some(summary()),
        };
        let sink = FakeSink::new(true);

        let res = run(&source, &sink).await;
        assert!(matches!(
            res,
            Err(NotifyError::NotificationDeliveryFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_repeated_runs_send_fresh_messages() {
        let source = FakeSource {
            summary: Some(summary()),
        };
        let sink = FakeSink::new(false);

        assert!(run(&source, &sink).await.is_ok());
        assert!(run(&source, &sink).await.is_ok());

        let sent = sink.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|message| message.contains("BTC: 0.5")));
    }
}
