//! Records returned by the upstream services and the raw response shapes they arrive in.
//!
//! Upstream field types are loose (numbers and strings are used interchangeably), so record
//! fields are read leniently: any JSON scalar becomes its text, `null`/absent/blank becomes `None`.
//! Lists skip elements that are `null` or malformed instead of failing the whole response.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One OSAGO policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsurancePolicy {
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub policy_serial: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub policy_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vin: Option<String>,
    #[serde(default, rename = "vin_mask", deserialize_with = "lenient_string")]
    pub vin_mask: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reg_number: Option<String>,
    #[serde(default, rename = "regNumber_mask", deserialize_with = "lenient_string")]
    pub reg_number_mask: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mark: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
}

impl InsurancePolicy {
    /// Masked VIN if present, else the raw VIN.
    pub fn display_vin(&self) -> Option<&str> {
        self.vin_mask.as_deref().or(self.vin.as_deref())
    }

    /// Masked registration number if present, else the raw one.
    pub fn display_reg_number(&self) -> Option<&str> {
        self.reg_number_mask
            .as_deref()
            .or(self.reg_number.as_deref())
    }
}

/// One traffic fine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Fine {
    /// Decree (resolution) number; also identifies the fine for photo retrieval.
    #[serde(default, deserialize_with = "lenient_string")]
    pub num_post: Option<String>,
    /// Violation date.
    #[serde(default, deserialize_with = "lenient_string")]
    pub date_decision: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub koap_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub koap_text: Option<String>,
    /// Amount in roubles.
    #[serde(default, deserialize_with = "lenient_string")]
    pub sum: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub enable_discount: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date_discount: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub division_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub division_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub photo_available: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    pub photo_token: Option<String>,
}

impl Fine {
    /// Photo token when the service says a photo can be fetched for this fine.
    pub fn available_photo_token(&self) -> Option<&str> {
        if self.photo_available {
            self.photo_token.as_deref()
        } else {
            None
        }
    }
}

/// Successful fines lookup: the fines plus the optional informational notice from the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinesReport {
    pub fines: Vec<Fine>,
    pub message: Option<String>,
}

/// Successful photo lookup: base64 main image plus any additional images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinePhoto {
    pub image_base64: String,
    pub additional_images_base64: Vec<String>,
}

impl FinePhoto {
    /// Decodes the main image followed by the additional ones, in order.
    pub fn decode_images(&self) -> Result<Vec<Vec<u8>>, base64::DecodeError> {
        std::iter::once(&self.image_base64)
            .chain(self.additional_images_base64.iter())
            .map(|encoded| decode_base64_image(encoded))
            .collect()
    }
}

/// Decodes base64 image data, accepting an optional `data:<mime>;base64,` prefix and line breaks.
fn decode_base64_image(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded,
    };
    let cleaned: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD.decode(cleaned)
}

/// Raw OSAGO response: `{success, policies?, error?}`.
#[derive(Debug, Deserialize)]
pub(crate) struct InsuranceResponse {
    #[serde(default)]
    pub success: Option<Value>,
    #[serde(default, deserialize_with = "lenient_records")]
    pub policies: Option<Vec<InsurancePolicy>>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub error: Option<String>,
}

/// Raw fines response: `{fines_done, fines?, message?, error?}`.
#[derive(Debug, Deserialize)]
pub(crate) struct FinesResponse {
    #[serde(default)]
    pub fines_done: Option<Value>,
    #[serde(default, deserialize_with = "lenient_records")]
    pub fines: Option<Vec<Fine>>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub error: Option<String>,
}

/// Raw photo response: `{image_done, image_base64?, additional_images_base64?, error?}`.
#[derive(Debug, Deserialize)]
pub(crate) struct PhotoResponse {
    #[serde(default)]
    pub image_done: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image_base64: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub additional_images_base64: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub error: Option<String>,
}

/// `1` (integer or float) or `true`; the flag convention of the OSAGO and photo responses.
pub(crate) fn is_one(flag: Option<&Value>) -> bool {
    match flag {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        _ => false,
    }
}

/// Strictly boolean `true`; the flag convention of the fines response.
pub(crate) fn is_true(flag: Option<&Value>) -> bool {
    matches!(flag, Some(Value::Bool(true)))
}

fn scalar_text(value: Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(scalar_text))
}

/// Array elements that decode as `T`; `null` and malformed elements are skipped, a non-array is `None`.
fn lenient_records<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(lenient_array(deserializer)?.map(|items| {
        items
            .into_iter()
            .filter(|item| item.is_object())
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()
    }))
}

/// Array of text elements; `null` and blank elements are skipped.
fn lenient_strings<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_array(deserializer)?
        .map(|items| items.into_iter().filter_map(scalar_text).collect()))
}

fn lenient_array<'de, D>(deserializer: D) -> Result<Option<Vec<Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Some(items),
        _ => None,
    })
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => {
            let s = s.trim();
            !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false"))
        }
        _ => false,
    };
    Ok(flag)
}
