//! HTTP client for the WSFEv1 gateway sidecar.
//!
//! The gateway wraps the authority's SOAP service behind a small JSON
//! API: every call posts `{environment, cuit, method, params}` and gets
//! back `{ok, result}` or `{ok: false, error}`. Read methods retry on
//! transient failures; [`AfipClient::authorize_voucher`] is sent exactly
//! once because a retry could issue a second CAE for the same voucher.

use std::time::Duration;

use bdn_shared::config::AfipConfig;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::AfipError;
use super::request::{
    ServerStatus, VoucherAuthorization, VoucherInfo, VoucherRequest, VoucherTypeInfo,
};

/// Delays before each read attempt, in seconds. Authorization is exempt.
const RETRY_DELAYS_SECS: [u64; 3] = [0, 3, 5];

/// Outbound operations against the electronic invoicing authority.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AfipClient: Send + Sync {
    /// Requests a CAE for one voucher.
    ///
    /// Sent exactly once per call; the caller decides whether a failed
    /// authorization may be re-attempted.
    ///
    /// # Errors
    ///
    /// Returns an error when the gateway is unreachable, the authority
    /// rejects the voucher, or the response cannot be decoded.
    async fn authorize_voucher(
        &self,
        request: &VoucherRequest,
    ) -> Result<VoucherAuthorization, AfipError>;

    /// Last authorized voucher number for a point-of-sale and voucher type,
    /// 0 when none was ever issued.
    ///
    /// # Errors
    ///
    /// Returns an error when the gateway cannot be reached after retries.
    async fn last_voucher_number(
        &self,
        point_of_sale: u32,
        voucher_type: u32,
    ) -> Result<i64, AfipError>;

    /// Authority-side details of an already-issued voucher.
    ///
    /// # Errors
    ///
    /// Returns an error when the voucher is unknown to the authority or
    /// the gateway cannot be reached after retries.
    async fn voucher_info(
        &self,
        point_of_sale: u32,
        voucher_type: u32,
        voucher_number: i64,
    ) -> Result<VoucherInfo, AfipError>;

    /// Voucher types the authority currently accepts.
    ///
    /// # Errors
    ///
    /// Returns an error when the gateway cannot be reached after retries.
    async fn voucher_types(&self) -> Result<Vec<VoucherTypeInfo>, AfipError>;

    /// Health of the authority's backend services.
    ///
    /// # Errors
    ///
    /// Returns an error when the gateway cannot be reached after retries.
    async fn server_status(&self) -> Result<ServerStatus, AfipError>;
}

/// [`AfipClient`] backed by the JSON gateway over HTTP.
#[derive(Debug, Clone)]
pub struct AfipHttpClient {
    http: reqwest::Client,
    endpoint: String,
    cuit: String,
    environment: &'static str,
    api_token: Option<String>,
}

impl AfipHttpClient {
    /// Builds a client from the AFIP section of the application config.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn from_config(config: &AfipConfig) -> Result<Self, AfipError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AfipError::Unavailable(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/wsfev1", config.gateway_url.trim_end_matches('/')),
            cuit: config.cuit.clone(),
            environment: if config.homologation {
                "homologation"
            } else {
                "production"
            },
            api_token: config.api_token.clone(),
        })
    }

    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, AfipError> {
        let body = GatewayRequest {
            environment: self.environment,
            cuit: &self.cuit,
            method,
            params,
        };

        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AfipError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AfipError::Gateway {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: GatewayResponse = response
            .json()
            .await
            .map_err(|e| AfipError::InvalidResponse(e.to_string()))?;
        unwrap_envelope(envelope)
    }

    async fn call_with_retry(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, AfipError> {
        let mut last_err = AfipError::Unavailable("no attempt made".to_string());

        for delay in RETRY_DELAYS_SECS {
            if delay > 0 {
                tokio::time::sleep(Duration::from_secs(delay)).await;
            }
            match self.call(method, params.clone()).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() => last_err = err,
                Err(err) => return Err(err),
            }
        }

        Err(last_err)
    }
}

#[async_trait::async_trait]
impl AfipClient for AfipHttpClient {
    async fn authorize_voucher(
        &self,
        request: &VoucherRequest,
    ) -> Result<VoucherAuthorization, AfipError> {
        let params = serde_json::to_value(request)
            .map_err(|e| AfipError::InvalidResponse(e.to_string()))?;
        let result = self.call("FECAESolicitar", params).await?;
        decode_authorization(result, request.voucher_from)
    }

    async fn last_voucher_number(
        &self,
        point_of_sale: u32,
        voucher_type: u32,
    ) -> Result<i64, AfipError> {
        let params = serde_json::json!({ "PtoVta": point_of_sale, "CbteTipo": voucher_type });
        let result = self
            .call_with_retry("FECompUltimoAutorizado", params)
            .await?;
        decode_last_voucher(result)
    }

    async fn voucher_info(
        &self,
        point_of_sale: u32,
        voucher_type: u32,
        voucher_number: i64,
    ) -> Result<VoucherInfo, AfipError> {
        let params = serde_json::json!({
            "PtoVta": point_of_sale,
            "CbteTipo": voucher_type,
            "CbteNro": voucher_number,
        });
        let result = self.call_with_retry("FECompConsultar", params).await?;
        decode_voucher_info(result)
    }

    async fn voucher_types(&self) -> Result<Vec<VoucherTypeInfo>, AfipError> {
        let result = self
            .call_with_retry("FEParamGetTiposCbte", serde_json::json!({}))
            .await?;
        decode_voucher_types(result)
    }

    async fn server_status(&self) -> Result<ServerStatus, AfipError> {
        let result = self
            .call_with_retry("FEDummy", serde_json::json!({}))
            .await?;
        decode_server_status(result)
    }
}

#[derive(Serialize)]
struct GatewayRequest<'a> {
    environment: &'a str,
    cuit: &'a str,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Deserialize)]
struct GatewayResponse {
    ok: bool,
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<GatewayError>,
}

#[derive(Deserialize)]
struct GatewayError {
    message: String,
    #[serde(default)]
    observations: Vec<String>,
    #[serde(default)]
    transient: bool,
}

fn unwrap_envelope(envelope: GatewayResponse) -> Result<serde_json::Value, AfipError> {
    if envelope.ok {
        return envelope
            .result
            .ok_or_else(|| AfipError::InvalidResponse("missing result field".to_string()));
    }

    match envelope.error {
        Some(error) if error.transient => Err(AfipError::Unavailable(error.message)),
        Some(error) => Err(AfipError::Rejected {
            message: error.message,
            observations: error.observations,
        }),
        None => Err(AfipError::InvalidResponse(
            "failure without error detail".to_string(),
        )),
    }
}

#[derive(Deserialize)]
struct CaeResult {
    #[serde(rename = "CAE")]
    cae: String,
    #[serde(rename = "CAEFchVto")]
    cae_expiry: String,
    #[serde(rename = "CbteDesde", default)]
    voucher_number: Option<i64>,
    #[serde(rename = "Observaciones", default)]
    observations: Vec<String>,
}

fn decode_authorization(
    value: serde_json::Value,
    requested_number: i64,
) -> Result<VoucherAuthorization, AfipError> {
    let result: CaeResult =
        serde_json::from_value(value).map_err(|e| AfipError::InvalidResponse(e.to_string()))?;

    Ok(VoucherAuthorization {
        cae: result.cae,
        cae_expiry: parse_wsfe_date(&result.cae_expiry)?,
        voucher_number: result.voucher_number.unwrap_or(requested_number),
        observations: result.observations,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LastVoucherResult {
    Bare(i64),
    Detailed {
        #[serde(rename = "CbteNro")]
        number: i64,
    },
}

fn decode_last_voucher(value: serde_json::Value) -> Result<i64, AfipError> {
    let result: LastVoucherResult =
        serde_json::from_value(value).map_err(|e| AfipError::InvalidResponse(e.to_string()))?;
    Ok(match result {
        LastVoucherResult::Bare(number) | LastVoucherResult::Detailed { number } => number,
    })
}

#[derive(Deserialize)]
struct VoucherInfoResult {
    #[serde(rename = "CbteDesde")]
    voucher_number: i64,
    #[serde(rename = "CodAutorizacion", default)]
    cae: Option<String>,
    #[serde(rename = "FchVto", default)]
    cae_expiry: Option<String>,
    #[serde(rename = "CbteFch", default)]
    voucher_date: Option<String>,
    #[serde(rename = "ImpTotal", default)]
    total: Option<Decimal>,
}

fn decode_voucher_info(value: serde_json::Value) -> Result<VoucherInfo, AfipError> {
    let result: VoucherInfoResult =
        serde_json::from_value(value).map_err(|e| AfipError::InvalidResponse(e.to_string()))?;

    Ok(VoucherInfo {
        voucher_number: result.voucher_number,
        cae: result.cae,
        cae_expiry: result.cae_expiry.as_deref().map(parse_wsfe_date).transpose()?,
        voucher_date: result
            .voucher_date
            .as_deref()
            .map(parse_wsfe_date)
            .transpose()?,
        total: result.total,
    })
}

#[derive(Deserialize)]
struct VoucherTypeResult {
    #[serde(rename = "Id")]
    id: u32,
    #[serde(rename = "Desc")]
    description: String,
}

fn decode_voucher_types(value: serde_json::Value) -> Result<Vec<VoucherTypeInfo>, AfipError> {
    let results: Vec<VoucherTypeResult> =
        serde_json::from_value(value).map_err(|e| AfipError::InvalidResponse(e.to_string()))?;

    Ok(results
        .into_iter()
        .map(|t| VoucherTypeInfo {
            id: t.id,
            description: t.description,
        })
        .collect())
}

#[derive(Deserialize)]
struct ServerStatusResult {
    #[serde(rename = "AppServer")]
    app_server: String,
    #[serde(rename = "DbServer")]
    db_server: String,
    #[serde(rename = "AuthServer")]
    auth_server: String,
}

fn decode_server_status(value: serde_json::Value) -> Result<ServerStatus, AfipError> {
    let result: ServerStatusResult =
        serde_json::from_value(value).map_err(|e| AfipError::InvalidResponse(e.to_string()))?;

    Ok(ServerStatus {
        app_server: result.app_server,
        db_server: result.db_server,
        auth_server: result.auth_server,
    })
}

fn parse_wsfe_date(raw: &str) -> Result<NaiveDate, AfipError> {
    NaiveDate::parse_from_str(raw, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .map_err(|_| AfipError::InvalidResponse(format!("unparseable authority date '{raw}'")))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    #[test]
    fn envelope_success_yields_result() {
        let envelope = GatewayResponse {
            ok: true,
            result: Some(json!({"CbteNro": 42})),
            error: None,
        };
        assert_eq!(unwrap_envelope(envelope).unwrap(), json!({"CbteNro": 42}));
    }

    #[test]
    fn envelope_transient_failure_is_unavailable() {
        let envelope = GatewayResponse {
            ok: false,
            result: None,
            error: Some(GatewayError {
                message: "AFIP timeout".to_string(),
                observations: Vec::new(),
                transient: true,
            }),
        };
        assert!(matches!(
            unwrap_envelope(envelope),
            Err(AfipError::Unavailable(_))
        ));
    }

    #[test]
    fn envelope_rejection_carries_observations() {
        let envelope = GatewayResponse {
            ok: false,
            result: None,
            error: Some(GatewayError {
                message: "voucher rejected".to_string(),
                observations: vec!["10016: CbteFch out of range".to_string()],
                transient: false,
            }),
        };
        match unwrap_envelope(envelope) {
            Err(AfipError::Rejected { observations, .. }) => {
                assert_eq!(observations.len(), 1);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn decodes_cae_result() {
        let auth = decode_authorization(
            json!({
                "CAE": "75123456789012",
                "CAEFchVto": "20260904",
                "CbteDesde": 43,
            }),
            43,
        )
        .unwrap();

        assert_eq!(auth.cae, "75123456789012");
        assert_eq!(
            auth.cae_expiry,
            NaiveDate::from_ymd_opt(2026, 9, 4).unwrap()
        );
        assert_eq!(auth.voucher_number, 43);
        assert!(auth.observations.is_empty());
    }

    #[test]
    fn cae_result_without_voucher_number_uses_requested() {
        let auth = decode_authorization(
            json!({"CAE": "75123456789012", "CAEFchVto": "2026-09-04"}),
            17,
        )
        .unwrap();
        assert_eq!(auth.voucher_number, 17);
    }

    #[test]
    fn decodes_bare_and_detailed_last_voucher() {
        assert_eq!(decode_last_voucher(json!(41)).unwrap(), 41);
        assert_eq!(decode_last_voucher(json!({"CbteNro": 41})).unwrap(), 41);
        assert_eq!(decode_last_voucher(json!(0)).unwrap(), 0);
    }

    #[test]
    fn decodes_voucher_info() {
        let info = decode_voucher_info(json!({
            "CbteDesde": 42,
            "CodAutorizacion": "75123456789012",
            "FchVto": "20260904",
            "CbteFch": "20260825",
            "ImpTotal": 1210.0,
        }))
        .unwrap();

        assert_eq!(info.voucher_number, 42);
        assert_eq!(info.cae.as_deref(), Some("75123456789012"));
        assert_eq!(info.total, Some(dec!(1210.0)));
    }

    #[test]
    fn decodes_voucher_types_and_server_status() {
        let types = decode_voucher_types(json!([
            {"Id": 1, "Desc": "Factura A"},
            {"Id": 6, "Desc": "Factura B"},
        ]))
        .unwrap();
        assert_eq!(types.len(), 2);
        assert_eq!(types[0].id, 1);
        assert_eq!(types[1].description, "Factura B");

        let status = decode_server_status(json!({
            "AppServer": "OK", "DbServer": "OK", "AuthServer": "OK",
        }))
        .unwrap();
        assert!(status.is_ok());
    }

    #[test]
    fn malformed_result_is_invalid_response() {
        let err = decode_authorization(json!({"unexpected": true}), 1).unwrap_err();
        assert!(matches!(err, AfipError::InvalidResponse(_)));

        let err = parse_wsfe_date("not-a-date").unwrap_err();
        assert!(matches!(err, AfipError::InvalidResponse(_)));
    }
}
