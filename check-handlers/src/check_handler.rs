//! Handler answering the lookup commands.

use std::sync::Arc;

use async_trait::async_trait;
use dbot_core::{Bot, Chat, Handler, HandlerResponse, Message, Result};
use tracing::{debug, info, instrument, warn};
use vehicle_check_client::VehicleCheckApi;

use crate::command::{Command, ParsedCommand};
use crate::format::{self, Lookup};
use crate::validation::{is_valid_reg_number, is_valid_sts, is_valid_vin, normalize};

/// Caption of the first photo sent for a fine.
fn photo_caption(num_post: &str) -> String {
    format!("Фото по постановлению {}", num_post)
}

/// Answers `/start`, `/help` and the lookup commands; other text passes through the chain.
///
/// For a lookup command the handler checks the argument count and formats, sends an
/// acknowledgement, performs exactly one API call and sends the rendered result. Invalid
/// input gets a usage hint and never reaches the API.
pub struct CheckCommandHandler {
    api: Arc<dyn VehicleCheckApi>,
    bot: Arc<dyn Bot>,
    bot_username: Option<String>,
}

impl CheckCommandHandler {
    pub fn new(api: Arc<dyn VehicleCheckApi>, bot: Arc<dyn Bot>) -> Self {
        Self {
            api,
            bot,
            bot_username: None,
        }
    }

    /// Own username; commands suffixed with another bot's name are then left alone.
    pub fn with_bot_username(mut self, bot_username: Option<String>) -> Self {
        self.bot_username = bot_username;
        self
    }

    /// Sends escaped MarkdownV2, split into as many messages as the length limit needs, and
    /// returns the whole text as the chain reply.
    async fn reply(&self, chat: &Chat, text: String) -> Result<HandlerResponse> {
        for chunk in format::split_message(&text, format::MESSAGE_LIMIT) {
            self.bot.send_markdown(chat, &chunk).await?;
        }
        Ok(HandlerResponse::Reply(text))
    }

    async fn reply_plain(&self, chat: &Chat, text: &str) -> Result<HandlerResponse> {
        self.reply(chat, format::plain(text)).await
    }

    async fn acknowledge(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot.send_markdown(chat, &format::plain(text)).await
    }

    async fn check_osago_vin(&self, chat: &Chat, vin: &str) -> Result<HandlerResponse> {
        let vin = normalize(vin);
        if !is_valid_vin(&vin) {
            return self.reply_plain(chat, format::VIN_FORMAT_HINT).await;
        }

        self.acknowledge(chat, &format!("Проверяю ОСАГО для VIN: {}...", vin))
            .await?;
        let text = match self.api.check_insurance_by_vin(&vin).await {
            Ok(policies) => format::render_policies(&policies),
            Err(e) => format::render_error(Lookup::Insurance, &e.to_string()),
        };
        self.reply(chat, text).await
    }

    async fn check_osago_reg(&self, chat: &Chat, reg_number: &str) -> Result<HandlerResponse> {
        let reg_number = normalize(reg_number);
        if !is_valid_reg_number(&reg_number) {
            return self.reply_plain(chat, format::REG_FORMAT_HINT).await;
        }

        self.acknowledge(
            chat,
            &format!("Проверяю ОСАГО для гос-номера: {}...", reg_number),
        )
        .await?;
        let text = match self.api.check_insurance_by_reg_number(&reg_number).await {
            Ok(policies) => format::render_policies(&policies),
            Err(e) => format::render_error(Lookup::Insurance, &e.to_string()),
        };
        self.reply(chat, text).await
    }

    async fn check_fines(
        &self,
        chat: &Chat,
        reg_number: &str,
        sts_number: &str,
    ) -> Result<HandlerResponse> {
        let reg_number = normalize(reg_number);
        if !is_valid_reg_number(&reg_number) {
            return self.reply_plain(chat, format::REG_FORMAT_HINT).await;
        }
        if !is_valid_sts(sts_number) {
            return self.reply_plain(chat, format::STS_FORMAT_HINT).await;
        }

        self.acknowledge(
            chat,
            &format!(
                "Проверяю штрафы для гос-номера: {} и СТС: {}...",
                reg_number, sts_number
            ),
        )
        .await?;
        let text = match self.api.check_fines(&reg_number, sts_number).await {
            Ok(report) => format::render_fines(&report, &reg_number),
            Err(e) => format::render_error(Lookup::Fines, &e.to_string()),
        };
        self.reply(chat, text).await
    }

    async fn fine_photo(&self, chat: &Chat, args: &[String]) -> Result<HandlerResponse> {
        let [photo_token, reg_number, num_post, division_id] = args else {
            return self.reply_plain(chat, format::PHOTO_USAGE).await;
        };
        let reg_number = normalize(reg_number);
        if !is_valid_reg_number(&reg_number) {
            return self.reply_plain(chat, format::REG_FORMAT_HINT).await;
        }

        self.acknowledge(
            chat,
            &format!("Запрашиваю фото по постановлению {}...", num_post),
        )
        .await?;
        let photo = match self
            .api
            .get_fine_photo(photo_token, &reg_number, num_post, division_id)
            .await
        {
            Ok(photo) => photo,
            Err(e) => {
                return self
                    .reply(chat, format::render_error(Lookup::Photo, &e.to_string()))
                    .await
            }
        };

        let images = match photo.decode_images() {
            Ok(images) => images,
            Err(e) => {
                warn!(error = %e, "Photo payload is not valid base64");
                return self
                    .reply(
                        chat,
                        format::render_error(Lookup::Photo, "Failed to decode image data."),
                    )
                    .await;
            }
        };

        let caption = photo_caption(num_post);
        for (index, image) in images.into_iter().enumerate() {
            let caption = (index == 0).then_some(caption.as_str());
            self.bot.send_photo(chat, image, caption).await?;
        }
        Ok(HandlerResponse::Reply(caption))
    }
}

/// Usage hint for a command whose argument count is wrong.
fn usage_hint(command: Command) -> Option<&'static str> {
    match command {
        Command::CheckOsagoVin => Some(format::VIN_USAGE),
        Command::CheckOsagoReg => Some(format::REG_USAGE),
        Command::CheckFines => Some(format::FINES_USAGE),
        Command::FinePhoto => Some(format::PHOTO_USAGE),
        Command::Start | Command::Help => None,
    }
}

#[async_trait]
impl Handler for CheckCommandHandler {
    #[instrument(skip(self, message), fields(user_id = message.user.id, chat_id = message.chat.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let Ok(parsed) = ParsedCommand::parse(&message.content) else {
            return Ok(HandlerResponse::Continue);
        };
        let Some(command) = parsed.command() else {
            return Ok(HandlerResponse::Continue);
        };
        if !parsed.is_addressed_to(self.bot_username.as_deref()) {
            debug!(addressee = ?parsed.addressee, "Command is for another bot");
            return Ok(HandlerResponse::Continue);
        }
        info!(command = command.name(), args = parsed.args.len(), "step: command received");

        let chat = &message.chat;
        if let (Some(expected), Some(hint)) = (command.arity(), usage_hint(command)) {
            if parsed.args.len() != expected {
                return self.reply_plain(chat, hint).await;
            }
        }

        match command {
            Command::Start => self.reply(chat, format::render_start(&message.user)).await,
            Command::Help => self.reply(chat, format::render_help()).await,
            Command::CheckOsagoVin => self.check_osago_vin(chat, &parsed.args[0]).await,
            Command::CheckOsagoReg => self.check_osago_reg(chat, &parsed.args[0]).await,
            Command::CheckFines => {
                self.check_fines(chat, &parsed.args[0], &parsed.args[1])
                    .await
            }
            Command::FinePhoto => self.fine_photo(chat, &parsed.args).await,
        }
    }
}
