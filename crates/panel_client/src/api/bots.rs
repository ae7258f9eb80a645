use tracing::info;

use super::models::{Bot, BotDraft};
use super::{ensure_success, get_json, send_json};
use crate::auth::{Gateway, RequestOptions};
use crate::error::Result;

/// CRUD for the user's bots (`bots/`).
#[derive(Clone)]
pub struct BotsApi {
    gateway: Gateway,
}

impl BotsApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Bot>> {
        get_json(&self.gateway, "bots/").await
    }

    pub async fn get(&self, id: i64) -> Result<Bot> {
        get_json(&self.gateway, &format!("bots/{}/", id)).await
    }

    pub async fn create(&self, draft: &BotDraft) -> Result<Bot> {
        let bot: Bot = send_json(&self.gateway, "bots/", RequestOptions::post(), draft).await?;
        info!("[OK] Created bot {} ({})", bot.id, bot.name);
        Ok(bot)
    }

    pub async fn update(&self, id: i64, draft: &BotDraft) -> Result<Bot> {
        let bot: Bot = send_json(
            &self.gateway,
            &format!("bots/{}/", id),
            RequestOptions::put(),
            draft,
        )
        .await?;
        info!("[OK] Updated bot {}", id);
        Ok(bot)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let response = self
            .gateway
            .send(&format!("bots/{}/", id), RequestOptions::delete())
            .await?;
        ensure_success(response).await?;
        info!("[OK] Deleted bot {}", id);
        Ok(())
    }
}
