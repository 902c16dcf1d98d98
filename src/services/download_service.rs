use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use crate::{
    entity::{
        books::Entity as Books,
        purchases::{ActiveModel, Column, Entity as Purchases, Model as PurchaseModel},
    },
    error::{AppError, AppResult},
    slug::download_filename,
    state::AppState,
    token::IssuedToken,
};

/// Issued tokens are far shorter; anything longer is rejected without a lookup.
const MAX_PRESENTED_TOKEN_LEN: usize = 128;

/// Issued tokens are ASCII alphanumeric, so anything else cannot match a row.
fn is_well_formed(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= MAX_PRESENTED_TOKEN_LEN
        && token.bytes().all(|b| b.is_ascii_alphanumeric())
}

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A resolved download ready to be streamed to the buyer.
#[derive(Debug)]
pub struct DownloadAsset {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Replaces the purchase's token and expiry. The previous token stops working
/// as soon as this is persisted.
pub async fn issue_token<C: ConnectionTrait>(
    db: &C,
    purchase: PurchaseModel,
    now: DateTime<Utc>,
) -> AppResult<(PurchaseModel, String)> {
    let issued = IssuedToken::issue(now);

    let mut active: ActiveModel = purchase.into();
    active.download_token = Set(issued.value.clone());
    active.token_expires_at = Set(issued.expires_at.into());
    active.updated_at = Set(now.into());
    let purchase = active.update(db).await?;

    tracing::debug!(purchase_id = %purchase.id, expires_at = %issued.expires_at, "download token issued");
    Ok((purchase, issued.value))
}

/// Validates `token` at `now` and loads the purchased book's PDF.
///
/// Unknown and expired tokens yield the same [`AppError::DownloadDenied`].
/// A valid token whose file is missing yields [`AppError::AssetUnavailable`].
pub async fn resolve_download(
    state: &AppState,
    token: &str,
    now: DateTime<Utc>,
) -> AppResult<DownloadAsset> {
    if !is_well_formed(token) {
        return Err(AppError::DownloadDenied);
    }

    let purchase = Purchases::find()
        .filter(Column::DownloadToken.eq(token))
        .filter(Column::TokenExpiresAt.gt(now))
        .one(&state.orm)
        .await?
        .ok_or(AppError::DownloadDenied)?;

    let purchase_id = purchase.id;
    let book_id = purchase.book_id;

    if purchase.downloaded {
        tracing::info!(%purchase_id, "additional download for purchase");
    } else {
        let mut active: ActiveModel = purchase.into();
        active.downloaded = Set(true);
        active.updated_at = Set(now.into());
        active.update(&state.orm).await?;
        tracing::info!(%purchase_id, "first download for purchase");
    }

    let Some(book) = Books::find_by_id(book_id).one(&state.orm).await? else {
        tracing::error!(%purchase_id, %book_id, "purchase references a missing book");
        return Err(AppError::AssetUnavailable);
    };

    let Some(bytes) = state.assets.read_digital_book(book.id).await? else {
        tracing::error!(
            %purchase_id,
            book_id = %book.id,
            path = %state.assets.digital_book_path(book.id).display(),
            "digital book file missing"
        );
        return Err(AppError::AssetUnavailable);
    };

    Ok(DownloadAsset {
        filename: download_filename(&book.title),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_alphanumeric_tokens_reach_the_database() {
        assert!(is_well_formed("AbC123xyz"));
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("ab\0cd"));
        assert!(!is_well_formed("abc-def"));
        assert!(!is_well_formed("ñandú"));
        assert!(!is_well_formed(&"a".repeat(MAX_PRESENTED_TOKEN_LEN + 1)));
    }
}
