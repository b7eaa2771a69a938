use crate::error::NotifyError;
use crate::portfolio::PortfolioSummary;

pub mod bitvavo;

pub trait PortfolioSource {
    async fn portfolio(&self) -> Result<PortfolioSummary, NotifyError>;
}
