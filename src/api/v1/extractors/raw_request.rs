/*
 * Responsibility
 * - GET /raw の query / header を RawRequest に変換する extractor
 * - path の重複指定は 400 (Path query invalid.)
 * - protection token は header `od-protected-token` が query `odpt` より優先
 *   (header が読めない場合は 400, query には fallback しない)
 * - path の正規化・placeholder 判定は gateway 側 (ここでは行わない)
 */
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::drive::path::PathError;
use crate::services::raw_gateway::RawRequest;
use crate::state::AppState;

pub const PROTECTED_TOKEN_HEADER: &str = "od-protected-token";
const INVALID_TOKEN_HEADER: &str = "Protected token header invalid.";

/// Handler で RawRequest を受け取るための extractor
pub struct RawParams(pub RawRequest);

/// Bool-like query flag: absent, empty, `0`, `false`, `no` and `off` are false.
pub fn parse_flag(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(v) => !matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "" | "0" | "false" | "no" | "off"
        ),
    }
}

pub fn parse_raw_request(query: Option<&str>, header_token: Option<&str>) -> Result<RawRequest, AppError> {
    let mut paths: Vec<String> = Vec::new();
    let mut odpt: Option<String> = None;
    let mut proxy: Option<String> = None;
    let mut redirect: Option<String> = None;
    let mut user: Option<String> = None;

    for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
        // first value wins, except `path` which must be unique
        match key.as_ref() {
            "path" => paths.push(value.into_owned()),
            "odpt" => {
                odpt.get_or_insert_with(|| value.into_owned());
            }
            "proxy" => {
                proxy.get_or_insert_with(|| value.into_owned());
            }
            "redirect" => {
                redirect.get_or_insert_with(|| value.into_owned());
            }
            "user" => {
                user.get_or_insert_with(|| value.into_owned());
            }
            _ => {}
        }
    }

    let path = match paths.len() {
        0 => "/".to_string(),
        1 => paths.remove(0),
        _ => return Err(PathError::Invalid.into()),
    };

    let protection_token = header_token.map(str::to_string).or(odpt);

    Ok(RawRequest {
        path,
        protection_token,
        proxy: parse_flag(proxy.as_deref()),
        redirect: redirect.and_then(|r| r.trim().parse::<u16>().ok()),
        user: user.unwrap_or_default(),
    })
}

impl FromRequestParts<AppState> for RawParams {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // An unreadable header must not quietly fall back to `odpt`.
        let header_token = parts
            .headers
            .get(PROTECTED_TOKEN_HEADER)
            .map(|v| v.to_str())
            .transpose()
            .map_err(|_| AppError::bad_request(INVALID_TOKEN_HEADER))?;

        parse_raw_request(parts.uri.query(), header_token).map(RawParams)
    }
}
