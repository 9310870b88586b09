//! MarkdownV2 rendering of replies.
//!
//! Every piece of literal or upstream text passes through [`escape`]; markup (`*bold*`, `_italic_`,
//! code spans, links) is added around already-escaped text only.

use dbot_core::User;
use teloxide::utils::markdown::{bold, code_inline, escape, italic};
use vehicle_check_client::{Fine, FinesReport, InsurancePolicy};

/// Shown in place of a missing field.
pub const PLACEHOLDER: &str = "Н/Д";

pub const VIN_USAGE: &str =
    "Пожалуйста, укажите VIN номер после команды. Пример: /check_osago_vin XXXXXXXXXXXXXXXXX";
pub const VIN_FORMAT_HINT: &str =
    "Неверный формат VIN номера. VIN должен состоять из 17 латинских букв (кроме I, O, Q) и цифр.";
pub const REG_USAGE: &str =
    "Пожалуйста, укажите гос-номер после команды. Пример: /check_osago_reg A123BC77";
pub const REG_FORMAT_HINT: &str = "Неверный формат гос-номера. Пример: А123ВС45 или А123ВС456.";
pub const FINES_USAGE: &str = "Пожалуйста, укажите гос-номер и номер СТС после команды. Пример: /check_fines A123BC77 1234567890";
pub const STS_FORMAT_HINT: &str = "Неверный формат номера СТС. Должен состоять из 10 цифр.";
pub const PHOTO_USAGE: &str = "Пожалуйста, укажите токен фото, гос-номер, номер постановления и код подразделения. Пример: /fine_photo TOKEN A123BC77 18810177230000000001 1145";

pub const NO_POLICIES: &str = "Полисы ОСАГО не найдены.";
pub const NO_FINES: &str = "Штрафы не найдены.";

/// Which lookup an error line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Insurance,
    Fines,
    Photo,
}

impl Lookup {
    fn error_prefix(&self) -> &'static str {
        match self {
            Lookup::Insurance => "Ошибка при проверке ОСАГО",
            Lookup::Fines => "Ошибка при проверке штрафов",
            Lookup::Photo => "Ошибка при получении фото",
        }
    }
}

/// Escapes plain text for MarkdownV2.
pub fn plain(text: &str) -> String {
    escape(text)
}

/// `*Label:* value` with the placeholder for a missing value.
fn field_line(label: &str, value: Option<&str>) -> String {
    format!(
        "{} {}\n",
        bold(&escape(&format!("{}:", label))),
        escape(value.unwrap_or(PLACEHOLDER))
    )
}

fn or_placeholder(value: Option<&str>) -> &str {
    value.unwrap_or(PLACEHOLDER)
}

/// Greeting with a mention of the user.
pub fn render_start(user: &User) -> String {
    let mention = format!(
        "[{}](tg://user?id={})",
        escape(&user.display_name()),
        user.id
    );
    format!(
        "Привет, {}{}\n\n{}\n{}",
        mention,
        escape("!"),
        escape("Я помогу тебе проверить ОСАГО и штрафы."),
        escape("Используй /help, чтобы увидеть список доступных команд.")
    )
}

/// Command reference.
pub fn render_help() -> String {
    let entries: [(&str, &str, &str, Option<&str>); 6] = [
        ("/start", "", "Начало работы с ботом", None),
        ("/help", "", "Показать это сообщение", None),
        (
            "/check_osago_vin",
            "VIN",
            "Проверить ОСАГО по VIN номеру.",
            Some("/check_osago_vin XXXXXXXXXXXXXXXXX"),
        ),
        (
            "/check_osago_reg",
            "ГОСНОМЕР",
            "Проверить ОСАГО по гос-номеру.",
            Some("/check_osago_reg A123BC77"),
        ),
        (
            "/check_fines",
            "ГОСНОМЕР НОМЕР_СТС",
            "Проверить штрафы по гос-номеру и номеру СТС.",
            Some("/check_fines A123BC77 1234567890"),
        ),
        (
            "/fine_photo",
            "ТОКЕН ГОСНОМЕР ПОСТАНОВЛЕНИЕ ПОДРАЗДЕЛЕНИЕ",
            "Получить фото нарушения (команда приходит вместе со списком штрафов).",
            None,
        ),
    ];

    let mut text = format!("{}\n", bold(&escape("Доступные команды:")));
    for (command, args, description, example) in entries {
        text.push_str(&escape(command));
        if !args.is_empty() {
            text.push(' ');
            text.push_str(&code_inline(args));
        }
        text.push_str(&escape(&format!(" - {}", description)));
        text.push('\n');
        if let Some(example) = example {
            text.push_str(&format!("    {} {}\n", escape("Пример:"), code_inline(example)));
        }
    }
    text
}

/// Listing of insurance policies, one block per policy.
pub fn render_policies(policies: &[InsurancePolicy]) -> String {
    if policies.is_empty() {
        return escape(NO_POLICIES);
    }

    let mut text = format!("{}\n\n", bold(&escape("Найденные полисы ОСАГО:")));
    for policy in policies {
        text.push_str(&field_line("Компания", policy.company_name.as_deref()));
        text.push_str(&field_line("Серия", policy.policy_serial.as_deref()));
        text.push_str(&field_line("Номер", policy.policy_number.as_deref()));
        text.push_str(&field_line("VIN", policy.display_vin()));
        text.push_str(&field_line("Гос-номер", policy.display_reg_number()));
        let make_model = format!(
            "{} {}",
            or_placeholder(policy.mark.as_deref()),
            or_placeholder(policy.model.as_deref())
        );
        text.push_str(&field_line("Марка/Модель", Some(&make_model)));
        text.push_str(&field_line("Начало действия", policy.start_date.as_deref()));
        text.push_str(&field_line("Окончание действия", policy.end_date.as_deref()));
        text.push_str(&field_line("Статус", policy.status.as_deref()));
        text.push('\n');
    }
    text
}

/// Ready-to-send `/fine_photo` invocation, when the fine has everything the photo lookup needs.
pub fn photo_command(fine: &Fine, reg_number: &str) -> Option<String> {
    let token = fine.available_photo_token()?;
    let num_post = fine.num_post.as_deref()?;
    let division_id = fine.division_id.as_deref()?;
    Some(format!(
        "/fine_photo {} {} {} {}",
        token, reg_number, num_post, division_id
    ))
}

fn render_fine(fine: &Fine, reg_number: &str) -> String {
    let mut text = String::new();
    text.push_str(&field_line("Номер постановления", fine.num_post.as_deref()));
    text.push_str(&field_line("Дата нарушения", fine.date_decision.as_deref()));
    let article = format!(
        "{} - {}",
        or_placeholder(fine.koap_code.as_deref()),
        or_placeholder(fine.koap_text.as_deref())
    );
    text.push_str(&field_line("Статья КоАП", Some(&article)));
    let amount = format!("{} руб.", or_placeholder(fine.sum.as_deref()));
    text.push_str(&field_line("Сумма", Some(&amount)));
    if fine.enable_discount {
        text.push_str(&field_line("Скидка до", fine.date_discount.as_deref()));
    }
    text.push_str(&field_line("Подразделение", fine.division_name.as_deref()));
    if fine.available_photo_token().is_some() {
        match photo_command(fine, reg_number) {
            Some(command) => text.push_str(&format!(
                "{} {}\n",
                italic(&escape("Фото доступно:")),
                code_inline(&command)
            )),
            None => text.push_str(&format!("{}\n", italic(&escape("Фото доступно")))),
        }
    }
    text.push('\n');
    text
}

/// Listing of fines. An empty list shows the service's notice when it sent one.
pub fn render_fines(report: &FinesReport, reg_number: &str) -> String {
    if report.fines.is_empty() {
        return escape(report.message.as_deref().unwrap_or(NO_FINES));
    }

    let mut text = format!("{}\n\n", bold(&escape("Найденные штрафы:")));
    for fine in &report.fines {
        text.push_str(&render_fine(fine, reg_number));
    }
    text
}

/// `Ошибка при …: <message>` line.
pub fn render_error(lookup: Lookup, message: &str) -> String {
    escape(&format!("{}: {}", lookup.error_prefix(), message))
}

/// Telegram's limit on the text of one message, in characters.
pub const MESSAGE_LIMIT: usize = 4096;

/// Splits rendered text into messages of at most `limit` characters.
///
/// Cuts fall between record blocks (blank lines) where possible, then between lines, and only
/// inside a line when a single line is over the limit. An escape sequence is never split.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for block in text.split_inclusive("\n\n") {
        for piece in fit_block(block, limit) {
            let piece_len = piece.chars().count();
            if current_len > 0 && current_len + piece_len > limit {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            current.push_str(&piece);
            current_len += piece_len;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// The block itself when it fits, otherwise its lines, with over-long lines cut.
fn fit_block(block: &str, limit: usize) -> Vec<String> {
    if block.chars().count() <= limit {
        return vec![block.to_string()];
    }
    block
        .split_inclusive('\n')
        .flat_map(|line| {
            if line.chars().count() <= limit {
                vec![line.to_string()]
            } else {
                cut_line(line, limit)
            }
        })
        .collect()
}

fn cut_line(line: &str, limit: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_len = 0;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        // `\x` stays together.
        let mut unit = c.to_string();
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                unit.push(escaped);
            }
        }
        let unit_len = unit.chars().count();
        if piece_len > 0 && piece_len + unit_len > limit {
            pieces.push(std::mem::take(&mut piece));
            piece_len = 0;
        }
        piece.push_str(&unit);
        piece_len += unit_len;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}
