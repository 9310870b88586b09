//! Wraps teloxide::Bot and implements [`dbot_core::Bot`]. Production code sends via Telegram; tests substitute another Bot impl.

use anyhow::{Context, Result as AnyResult};
use async_trait::async_trait;
use dbot_core::{Bot as CoreBot, Chat, DbotError, Result};
use teloxide::payloads::{SendMessageSetters, SendPhotoSetters};
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, ParseMode};

/// Creates the teloxide bot, pointing it at `api_url` when given (e.g. a local Bot API server or a test mock).
pub fn build_teloxide_bot(token: &str, api_url: Option<&str>) -> AnyResult<teloxide::Bot> {
    let bot = teloxide::Bot::new(token);
    match api_url {
        Some(url) => {
            let url = reqwest::Url::parse(url)
                .with_context(|| format!("Invalid Telegram API URL: {}", url))?;
            Ok(bot.set_api_url(url))
        }
        None => Ok(bot),
    }
}

/// Thin wrapper around teloxide::Bot that implements core's Bot trait.
#[derive(Clone)]
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }
}

fn bot_error(e: teloxide::RequestError) -> DbotError {
    DbotError::Bot(e.to_string())
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_markdown(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text.to_string())
            .parse_mode(ParseMode::MarkdownV2)
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    async fn send_photo(&self, chat: &Chat, image: Vec<u8>, caption: Option<&str>) -> Result<()> {
        let request = self
            .bot
            .send_photo(ChatId(chat.id), InputFile::memory(image).file_name("fine.jpg"));
        let request = match caption {
            Some(caption) => request.caption(caption.to_string()),
            None => request,
        };
        request.await.map_err(bot_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_bot_with_custom_api_url() {
        let bot = build_teloxide_bot("123:abc", Some("http://127.0.0.1:8081/")).unwrap();
        assert_eq!(bot.api_url().as_str(), "http://127.0.0.1:8081/");
        assert_eq!(bot.token(), "123:abc");
    }

    #[test]
    fn test_build_bot_rejects_invalid_url() {
        assert!(build_teloxide_bot("123:abc", Some("not a url")).is_err());
    }

    #[test]
    fn test_build_bot_default_url() {
        let bot = build_teloxide_bot("123:abc", None).unwrap();
        assert_eq!(bot.api_url().host_str(), Some("api.telegram.org"));
    }
}
