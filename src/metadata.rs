use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// rarity 未指定時の値
pub const DEFAULT_RARITY: &str = "common";

/// 正規化済みのアイテムメタデータ（ERC-1155 の uri が指す JSON）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    pub attributes: Vec<Attribute>,
}

/// `display_type` などそれ以外のキーは `extra` にそのまま保持する
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: AttributeValue,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 属性値は文字列か数値のどちらか
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Number(Number),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl Attribute {
    pub fn new(trait_type: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            trait_type: trait_type.into(),
            value,
            extra: Map::new(),
        }
    }
}

/// `POST /metadata` で受け取るアイテム入力。
///
/// `from_json` で型の検証と強制変換を済ませた状態を表す。
/// `attributes` が与えられた場合は rarity / attack より優先してそのまま使う。
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRequest {
    pub token_id: u64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub rarity: Option<String>,
    pub attack: Option<Number>,
    pub attributes: Option<Vec<Attribute>>,
}

impl ItemRequest {
    pub fn from_json(body: &Value) -> Result<Self, StoreError> {
        let Some(fields) = body.as_object() else {
            return Err(StoreError::validation("request body must be a JSON object"));
        };

        let token_id = parse_token_id(fields.get("tokenId"))?;

        let attributes = match fields.get("attributes") {
            None | Some(Value::Null) => None,
            Some(v @ Value::Array(_)) => Some(
                serde_json::from_value::<Vec<Attribute>>(v.clone()).map_err(|e| {
                    StoreError::validation(format!("attributes is invalid: {e}"))
                })?,
            ),
            Some(_) => return Err(StoreError::validation("attributes must be an array")),
        };

        Ok(Self {
            token_id,
            name: optional_string(fields, "name")?,
            description: optional_string(fields, "description")?,
            image: optional_string(fields, "image")?,
            rarity: optional_string(fields, "rarity")?,
            attack: optional_number(fields, "attack")?,
            attributes,
        })
    }

    /// 欠けているフィールドに既定値を入れて最終的なドキュメントを組み立てる
    pub fn normalize(&self) -> ItemMetadata {
        let name = non_empty(&self.name)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Item #{}", self.token_id));

        let attributes = match &self.attributes {
            Some(list) => list.clone(),
            None => vec![
                Attribute::new(
                    "rarity",
                    AttributeValue::Text(
                        non_empty(&self.rarity).unwrap_or(DEFAULT_RARITY).to_string(),
                    ),
                ),
                Attribute::new(
                    "attack",
                    AttributeValue::Number(self.attack.clone().unwrap_or_else(|| Number::from(0))),
                ),
            ],
        };

        ItemMetadata {
            name,
            description: self.description.clone().unwrap_or_default(),
            image: self.image.clone().unwrap_or_default(),
            attributes,
        }
    }
}

/// JSON ボディ中の tokenId を非負整数として解釈する。
/// 整数、小数部 0 の浮動小数、数字だけの文字列を受け付ける。
pub fn parse_token_id(value: Option<&Value>) -> Result<u64, StoreError> {
    match value {
        None | Some(Value::Null) => Err(StoreError::validation("tokenId is required")),
        Some(Value::Number(n)) => {
            if let Some(id) = n.as_u64() {
                return Ok(id);
            }
            match n.as_f64() {
                // u64::MAX as f64 は 2^64 なので等号を含めると飽和した id になる
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => Ok(f as u64),
                _ => Err(invalid_token_id()),
            }
        }
        Some(Value::String(s)) => parse_token_id_str(s),
        Some(_) => Err(invalid_token_id()),
    }
}

/// パスセグメントの id を解釈する
pub fn parse_token_id_str(raw: &str) -> Result<u64, StoreError> {
    raw.trim().parse::<u64>().map_err(|_| invalid_token_id())
}

fn invalid_token_id() -> StoreError {
    StoreError::validation("tokenId must be a non-negative integer")
}

fn optional_string(fields: &Map<String, Value>, key: &str) -> Result<Option<String>, StoreError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(StoreError::validation(format!("{key} must be a string"))),
    }
}

/// 数値、または数値として読める文字列を Number に揃える
fn optional_number(fields: &Map<String, Value>, key: &str) -> Result<Option<Number>, StoreError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n.clone())),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            coerce_number(s)
                .map(Some)
                .ok_or_else(|| StoreError::validation(format!("{key} must be a number")))
        }
        Some(_) => Err(StoreError::validation(format!("{key} must be a number"))),
    }
}

fn coerce_number(s: &str) -> Option<Number> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::from(i));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
