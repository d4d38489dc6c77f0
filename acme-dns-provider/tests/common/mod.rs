//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::sync::Arc;

use acme_dns_provider::{
    CloudflareAuth, DnsProvider, ProviderCredentials, ProviderOptions, create_provider,
};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got Err({:?})", res.as_ref().err());
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: Err({:?})",
            format_args!($($msg)+),
            res.as_ref().err()
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

pub const ZONE_ID: &str = "zone-1";
pub const AUTH_EMAIL: &str = "ops@example.com";
pub const AUTH_KEY: &str = "global-key";

/// 指向本地 mock server 的 Cloudflare provider（Global API Key 认证）
pub fn mock_provider(base_url: &str, delete_retries: u32) -> Arc<dyn DnsProvider> {
    let options = ProviderOptions {
        base_url: Some(base_url.to_string()),
        delete_retries,
    };
    let credentials = ProviderCredentials::Cloudflare {
        zone_id: ZONE_ID.to_string(),
        auth: CloudflareAuth::ApiKey {
            email: AUTH_EMAIL.to_string(),
            api_key: AUTH_KEY.to_string(),
        },
    };
    match create_provider(credentials, &options) {
        Ok(provider) => provider,
        Err(e) => panic!("failed to build provider: {e}"),
    }
}

/// Cloudflare 成功响应
pub fn success_body(result: &serde_json::Value) -> String {
    serde_json::json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": result,
    })
    .to_string()
}

/// Cloudflare 失败响应
pub fn failure_body(code: i64, message: &str) -> String {
    serde_json::json!({
        "success": false,
        "errors": [{ "code": code, "message": message }],
        "messages": [],
        "result": null,
    })
    .to_string()
}
