//! Latest zero-address transaction as served by the list endpoint.

use crate::chain::decode_payload;
use crate::http::{ApiResult, HttpClient};
use serde::{Deserialize, Serialize};

/// Read-only view of one transaction with its payload decoded. Fetched on demand, never cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxRecord {
    pub hash: String,
    pub from: String,
    pub to: String,
    pub value: String,
    pub decoded_payload: String,
}

#[derive(Deserialize)]
struct ListResponse {
    data: ListData,
}

#[derive(Deserialize)]
struct ListData {
    result: RawTx,
}

#[derive(Deserialize)]
struct RawTx {
    hash: String,
    from: String,
    to: String,
    /// Some indexers send a number, some a decimal or hex string.
    value: serde_json::Value,
    #[serde(default)]
    data: Option<String>,
}

impl RawTx {
    fn into_record(self) -> ApiResult<TxRecord> {
        let decoded_payload = match self.data.as_deref() {
            None | Some("") => String::new(),
            Some(hex) => match decode_payload(hex) {
                Ok(s) => s,
                Err(e) => return ApiResult::failure(e.to_string()),
            },
        };
        let value = match self.value {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        ApiResult::success(TxRecord {
            hash: self.hash,
            from: self.from,
            to: self.to,
            value,
            decoded_payload,
        })
    }
}

/// GET the list endpoint and narrow `data.result` into a [`TxRecord`].
pub async fn fetch_record(http: &HttpClient, url: &str) -> ApiResult<TxRecord> {
    let res = http
        .request_json::<ListResponse>(url, Default::default())
        .await
        .and_then(|list| list.data.result.into_record());
    if let Some(e) = res.error() {
        log::warn!("records: fetching {} failed: {}", url, e);
    }
    res
}

/// `0x1234...abcd` for display; strings too short to shorten are returned unchanged.
pub fn short_address(address: &str) -> String {
    if address.len() <= 10 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(value: serde_json::Value, data: Option<&str>) -> RawTx {
        RawTx {
            hash: "0xabc".to_string(),
            from: "0x00000000000000000000000000000000000a11ce".to_string(),
            to: "0x0000000000000000000000000000000000000000".to_string(),
            value,
            data: data.map(String::from),
        }
    }

    #[test]
    fn record_decodes_payload_and_value() {
        let rec = raw(serde_json::json!("0"), Some("0x6869"))
            .into_record()
            .into_result()
            .unwrap();
        assert_eq!(rec.decoded_payload, "hi");
        assert_eq!(rec.value, "0");

        let rec = raw(serde_json::json!(0), None).into_record().into_result().unwrap();
        assert_eq!(rec.value, "0");
        assert_eq!(rec.decoded_payload, "");
    }

    #[test]
    fn malformed_payload_fails_the_record() {
        let res = raw(serde_json::json!("0"), Some("0xzz")).into_record();
        assert!(res.error().unwrap().starts_with("malformed payload hex"));
    }

    #[test]
    fn short_address_formats() {
        assert_eq!(
            short_address("0x00000000000000000000000000000000000a11ce"),
            "0x0000...11ce"
        );
        assert_eq!(short_address("0xabc"), "0xabc");
    }
}
