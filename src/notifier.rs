use crate::{error::AppResult, models::Purchase};

/// Hands the buyer their download link. Delivery is log-only.
pub async fn send_download_link(purchase: &Purchase, download_url: &str) -> AppResult<()> {
    tracing::info!(
        purchase_id = %purchase.id,
        email = %purchase.email,
        download_url = %download_url,
        "download link sent to buyer"
    );
    Ok(())
}
