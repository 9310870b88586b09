//! Tests for [`CheckCommandHandler`].
//!
//! Uses a stub [`VehicleCheckApi`] that counts calls and returns canned results, and a recording
//! [`Bot`]; no Telegram or upstream API is contacted.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use check_handlers::CheckCommandHandler;
use chrono::Utc;
use dbot_core::{Bot, Chat, Handler, HandlerResponse, Message, Result as DbotResult, User};
use vehicle_check_client::{
    ApiError, ApiResult, Fine, FinePhoto, FinesReport, InsurancePolicy, VehicleCheckApi,
};

/// Canned API: every call is counted and recorded; results are fixed per operation.
#[derive(Default)]
struct StubApi {
    calls: AtomicUsize,
    requests: Mutex<Vec<String>>,
    insurance: Option<ApiResult<Vec<InsurancePolicy>>>,
    fines: Option<ApiResult<FinesReport>>,
    photo: Option<ApiResult<FinePhoto>>,
}

impl StubApi {
    fn record(&self, request: String) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl VehicleCheckApi for StubApi {
    async fn check_insurance_by_vin(&self, vin: &str) -> ApiResult<Vec<InsurancePolicy>> {
        self.record(format!("vin:{}", vin));
        self.insurance.clone().unwrap_or(Ok(Vec::new()))
    }

    async fn check_insurance_by_reg_number(
        &self,
        reg_number: &str,
    ) -> ApiResult<Vec<InsurancePolicy>> {
        self.record(format!("reg:{}", reg_number));
        self.insurance.clone().unwrap_or(Ok(Vec::new()))
    }

    async fn check_fines(&self, reg_number: &str, sts_number: &str) -> ApiResult<FinesReport> {
        self.record(format!("fines:{}:{}", reg_number, sts_number));
        self.fines.clone().unwrap_or(Ok(FinesReport::default()))
    }

    async fn get_fine_photo(
        &self,
        photo_token: &str,
        reg_number: &str,
        num_post: &str,
        division_id: &str,
    ) -> ApiResult<FinePhoto> {
        self.record(format!(
            "photo:{}:{}:{}:{}",
            photo_token, reg_number, num_post, division_id
        ));
        self.photo
            .clone()
            .unwrap_or(Err(ApiError::Upstream("Failed to retrieve photo".to_string())))
    }
}

/// What the bot was asked to send.
#[derive(Debug, Clone, PartialEq)]
enum Sent {
    Markdown(String),
    Photo { len: usize, caption: Option<String> },
}

#[derive(Default)]
struct RecordingBot {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingBot {
    fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn markdown(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Markdown(text) => Some(text),
                Sent::Photo { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn send_markdown(&self, _chat: &Chat, text: &str) -> DbotResult<()> {
        self.sent.lock().unwrap().push(Sent::Markdown(text.to_string()));
        Ok(())
    }

    async fn send_photo(
        &self,
        _chat: &Chat,
        image: Vec<u8>,
        caption: Option<&str>,
    ) -> DbotResult<()> {
        self.sent.lock().unwrap().push(Sent::Photo {
            len: image.len(),
            caption: caption.map(String::from),
        });
        Ok(())
    }
}

fn message(content: &str) -> Message {
    Message {
        id: "1".to_string(),
        user: User {
            id: 7,
            username: Some("driver".to_string()),
            first_name: Some("Иван".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: 100,
            chat_type: "private".to_string(),
        },
        content: content.to_string(),
        message_type: "text".to_string(),
        created_at: Utc::now(),
    }
}

fn setup(api: StubApi) -> (CheckCommandHandler, Arc<StubApi>, Arc<RecordingBot>) {
    let api = Arc::new(api);
    let bot = Arc::new(RecordingBot::default());
    let handler = CheckCommandHandler::new(api.clone(), bot.clone());
    (handler, api, bot)
}

fn reply_text(response: HandlerResponse) -> String {
    match response {
        HandlerResponse::Reply(text) => text,
        other => panic!("expected Reply, got {:?}", other),
    }
}

/// **Test: wrong argument count gets the usage hint and never calls the API.**
#[tokio::test]
async fn test_wrong_arity_never_calls_api() {
    let (handler, api, bot) = setup(StubApi::default());

    for content in [
        "/check_osago_vin",
        "/check_osago_vin XTA21099012345678 extra",
        "/check_osago_reg",
        "/check_fines A123BC77",
        "/check_fines A123BC77 1234567890 extra",
        "/fine_photo tok A123BC77 1",
    ] {
        let response = handler.handle(&message(content)).await.unwrap();
        let text = reply_text(response);
        assert!(text.starts_with("Пожалуйста, укажите"), "{}: {}", content, text);
    }

    assert_eq!(api.calls(), 0);
    assert_eq!(bot.sent().len(), 6);
}

/// **Test: malformed arguments get the format hint and never call the API.**
#[tokio::test]
async fn test_invalid_format_never_calls_api() {
    let (handler, api, _bot) = setup(StubApi::default());

    let cases = [
        ("/check_osago_vin XTA2109901234567O", "Неверный формат VIN номера"),
        ("/check_osago_reg 123ABC", "Неверный формат гос\\-номера"),
        ("/check_fines A123BC77 12345", "Неверный формат номера СТС"),
        ("/check_fines AAAA 1234567890", "Неверный формат гос\\-номера"),
        ("/fine_photo tok BAD 1 2", "Неверный формат гос\\-номера"),
    ];
    for (content, expected) in cases {
        let text = reply_text(handler.handle(&message(content)).await.unwrap());
        assert!(text.starts_with(expected), "{}: {}", content, text);
    }

    assert_eq!(api.calls(), 0);
}

/// **Test: VIN is upper-cased, acknowledged, looked up once and rendered.**
#[tokio::test]
async fn test_vin_lookup_success() {
    let policy = InsurancePolicy {
        company_name: Some("Ingos".to_string()),
        policy_serial: Some("XXX".to_string()),
        policy_number: Some("123".to_string()),
        ..InsurancePolicy::default()
    };
    let (handler, api, bot) = setup(StubApi {
        insurance: Some(Ok(vec![policy])),
        ..StubApi::default()
    });

    let text = reply_text(
        handler
            .handle(&message("/check_osago_vin xta21099012345678"))
            .await
            .unwrap(),
    );

    assert_eq!(api.requests(), vec!["vin:XTA21099012345678".to_string()]);
    assert!(text.contains("Ingos"));
    assert!(text.contains("XXX"));
    assert!(text.contains("123"));
    assert!(text.contains("Н/Д"));
    let sent = bot.markdown();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], "Проверяю ОСАГО для VIN: XTA21099012345678\\.\\.\\.");
    assert_eq!(sent[1], text);
}

/// **Test: upstream error is rendered as an error line with no record block.**
#[tokio::test]
async fn test_insurance_upstream_error_rendered() {
    let (handler, api, _bot) = setup(StubApi {
        insurance: Some(Err(ApiError::Upstream("not found".to_string()))),
        ..StubApi::default()
    });

    let text = reply_text(
        handler
            .handle(&message("/check_osago_reg а123вс777"))
            .await
            .unwrap(),
    );

    assert_eq!(api.requests(), vec!["reg:А123ВС777".to_string()]);
    assert_eq!(text, "Ошибка при проверке ОСАГО: not found");
    assert!(!text.contains("Компания"));
}

/// **Test: fines lookup with an empty list and no message says no fines were found.**
#[tokio::test]
async fn test_fines_empty_without_message() {
    let (handler, api, _bot) = setup(StubApi {
        fines: Some(Ok(FinesReport::default())),
        ..StubApi::default()
    });

    let text = reply_text(
        handler
            .handle(&message("/check_fines a123bc77 1234567890"))
            .await
            .unwrap(),
    );

    assert_eq!(api.requests(), vec!["fines:A123BC77:1234567890".to_string()]);
    assert_eq!(text, "Штрафы не найдены\\.");
}

/// **Test: fines listing includes a ready /fine_photo command for fines with photos.**
#[tokio::test]
async fn test_fines_listing_with_photo_command() {
    let fine = Fine {
        num_post: Some("18810177230000000001".to_string()),
        sum: Some("500".to_string()),
        division_id: Some("1145".to_string()),
        photo_available: true,
        photo_token: Some("tok".to_string()),
        ..Fine::default()
    };
    let (handler, _api, _bot) = setup(StubApi {
        fines: Some(Ok(FinesReport {
            fines: vec![fine],
            message: Some("ignored when fines exist".to_string()),
        })),
        ..StubApi::default()
    });

    let text = reply_text(
        handler
            .handle(&message("/check_fines A123BC77 1234567890"))
            .await
            .unwrap(),
    );

    assert!(text.contains("*Найденные штрафы:*"));
    assert!(text.contains("*Сумма:* 500 руб\\."));
    assert!(text.contains("`/fine_photo tok A123BC77 18810177230000000001 1145`"));
    assert!(!text.contains("ignored"));
}

/// **Test: a long fines listing goes out as several messages, each within Telegram's limit.**
#[tokio::test]
async fn test_long_fines_listing_is_split() {
    let fines = (0..12)
        .map(|index| Fine {
            num_post: Some(format!("188101772300000{:05}", index)),
            date_decision: Some("2026-09-01 12:30:00".to_string()),
            koap_code: Some("12.9.2".to_string()),
            koap_text: Some(
                "Превышение установленной скорости движения транспортного средства на величину \
                 более 20, но не более 40 километров в час"
                    .to_string(),
            ),
            sum: Some("500".to_string()),
            enable_discount: true,
            date_discount: Some("2026-09-21".to_string()),
            division_name: Some(
                "ЦАФАП ОДД ГИБДД ГУ МВД России по г. Москве (Центр автоматизированной фиксации)"
                    .to_string(),
            ),
            division_id: Some("1145".to_string()),
            photo_available: true,
            photo_token: Some(format!("{:0>64}", index)),
        })
        .collect();
    let (handler, _api, bot) = setup(StubApi {
        fines: Some(Ok(FinesReport {
            fines,
            message: None,
        })),
        ..StubApi::default()
    });

    let text = reply_text(
        handler
            .handle(&message("/check_fines A123BC77 1234567890"))
            .await
            .unwrap(),
    );

    let sent = bot.markdown();
    // Acknowledgement plus at least two parts of the listing.
    assert!(sent.len() >= 3, "sent {} messages", sent.len());
    for part in &sent {
        assert!(part.chars().count() <= 4096, "{} chars", part.chars().count());
    }
    assert_eq!(sent[1..].concat(), text);
    assert_eq!(text.matches("*Номер постановления:*").count(), 12);
}

/// **Test: fines transport error is rendered with the fines prefix.**
#[tokio::test]
async fn test_fines_request_error_rendered() {
    let (handler, _api, _bot) = setup(StubApi {
        fines: Some(Err(ApiError::Request("operation timed out".to_string()))),
        ..StubApi::default()
    });

    let text = reply_text(
        handler
            .handle(&message("/check_fines A123BC77 1234567890"))
            .await
            .unwrap(),
    );

    assert_eq!(
        text,
        "Ошибка при проверке штрафов: Request failed: operation timed out"
    );
}

/// **Test: photo command sends every decoded image, caption on the first only.**
#[tokio::test]
async fn test_fine_photo_sends_images() {
    let (handler, api, bot) = setup(StubApi {
        photo: Some(Ok(FinePhoto {
            image_base64: "aGVsbG8=".to_string(),
            additional_images_base64: vec!["d29ybGQh".to_string()],
        })),
        ..StubApi::default()
    });

    let response = handler
        .handle(&message("/fine_photo tok a123bc77 18810177230000000001 1145"))
        .await
        .unwrap();

    assert_eq!(
        api.requests(),
        vec!["photo:tok:A123BC77:18810177230000000001:1145".to_string()]
    );
    assert_eq!(
        response,
        HandlerResponse::Reply("Фото по постановлению 18810177230000000001".to_string())
    );
    let photos: Vec<Sent> = bot
        .sent()
        .into_iter()
        .filter(|s| matches!(s, Sent::Photo { .. }))
        .collect();
    assert_eq!(
        photos,
        vec![
            Sent::Photo {
                len: 5,
                caption: Some("Фото по постановлению 18810177230000000001".to_string()),
            },
            Sent::Photo {
                len: 6,
                caption: None,
            },
        ]
    );
}

/// **Test: photo lookup failure and undecodable payload are rendered as photo errors.**
#[tokio::test]
async fn test_fine_photo_errors() {
    let (handler, _api, bot) = setup(StubApi::default());
    let text = reply_text(
        handler
            .handle(&message("/fine_photo tok A123BC77 1 2"))
            .await
            .unwrap(),
    );
    assert_eq!(text, "Ошибка при получении фото: Failed to retrieve photo");

    let (handler, _api, _) = setup(StubApi {
        photo: Some(Ok(FinePhoto {
            image_base64: "%%%".to_string(),
            additional_images_base64: Vec::new(),
        })),
        ..StubApi::default()
    });
    let text = reply_text(
        handler
            .handle(&message("/fine_photo tok A123BC77 1 2"))
            .await
            .unwrap(),
    );
    assert_eq!(
        text,
        "Ошибка при получении фото: Failed to decode image data\\."
    );
    assert!(bot
        .sent()
        .iter()
        .all(|s| !matches!(s, Sent::Photo { .. })));
}

/// **Test: /start greets by name, /help lists commands; neither calls the API.**
#[tokio::test]
async fn test_start_and_help() {
    let (handler, api, _bot) = setup(StubApi::default());

    let start = reply_text(handler.handle(&message("/start")).await.unwrap());
    assert!(start.contains("[Иван](tg://user?id=7)"));

    let help = reply_text(handler.handle(&message("/help@vehicle_check_bot")).await.unwrap());
    assert!(help.contains("Доступные команды:"));

    assert_eq!(api.calls(), 0);
}

/// **Test: plain text and unknown commands pass through without a reply.**
#[tokio::test]
async fn test_non_commands_continue() {
    let (handler, api, bot) = setup(StubApi::default());

    for content in ["hello", "", "/weather Moscow"] {
        let response = handler.handle(&message(content)).await.unwrap();
        assert_eq!(response, HandlerResponse::Continue);
    }

    assert_eq!(api.calls(), 0);
    assert!(bot.sent().is_empty());
}
