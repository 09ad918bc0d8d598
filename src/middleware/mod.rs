/*
 * Responsibility
 * - middleware の公開インターフェース
 * - http (request-id / trace / timeout), security_headers, cors (raw のみ)
 */
pub mod cors;
pub mod http;
pub mod security_headers;
