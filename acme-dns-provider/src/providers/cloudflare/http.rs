//! Cloudflare HTTP 请求方法

use reqwest::RequestBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ProviderError, Result};
use crate::http_client::{HttpUtils, is_success_status};
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::types::CloudflareAuth;

use super::{CloudflareProvider, CloudflareResponse};

impl CloudflareProvider {
    /// 附加认证头
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            CloudflareAuth::ApiKey { email, api_key } => builder
                .header("X-Auth-Email", email)
                .header("X-Auth-Key", api_key),
            CloudflareAuth::ApiToken { api_token } => builder.bearer_auth(api_token),
        }
    }

    /// 执行 POST 请求
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        context: ErrorContext,
    ) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let request = self.authorize(self.client.post(&url)).json(body);

        let (status, response_text) =
            HttpUtils::execute_request(request, self.provider_name(), "POST", &url).await?;

        let cf_response: CloudflareResponse<T> =
            self.check_response(status, &response_text, context)?;

        cf_response
            .result
            .ok_or_else(|| self.parse_error("响应中缺少 result 字段"))
    }

    /// 执行 DELETE 请求（网络错误时按配置重试）
    pub(crate) async fn delete(&self, path: &str, context: ErrorContext) -> Result<()> {
        let url = format!("{}{path}", self.base_url);
        let request = self.authorize(self.client.delete(&url));

        let (status, response_text) = HttpUtils::execute_request_with_retry(
            request,
            self.provider_name(),
            "DELETE",
            &url,
            self.delete_retries,
        )
        .await?;

        let _: CloudflareResponse<serde_json::Value> =
            self.check_response(status, &response_text, context)?;

        Ok(())
    }

    /// 先检查 HTTP 状态码，再解析响应体并检查 `success` 字段
    fn check_response<T: DeserializeOwned>(
        &self,
        status: u16,
        response_text: &str,
        context: ErrorContext,
    ) -> Result<CloudflareResponse<T>> {
        if !is_success_status(status) {
            let raw_message =
                serde_json::from_str::<CloudflareResponse<serde_json::Value>>(response_text)
                    .ok()
                    .and_then(|r| r.errors.into_iter().next())
                    .map(|e| e.message);
            log::error!(
                "[{}] HTTP {status}: {}",
                self.provider_name(),
                raw_message.as_deref().unwrap_or("<no error message>")
            );
            return Err(ProviderError::ApiError {
                provider: self.provider_name().to_string(),
                status_code: status,
                raw_message,
            });
        }

        let cf_response: CloudflareResponse<T> =
            HttpUtils::parse_json(response_text, self.provider_name())?;

        if !cf_response.success {
            let raw = cf_response.errors.first().map_or_else(
                || RawApiError::new("Unknown error"),
                |e| RawApiError::with_code(e.code.to_string(), e.message.clone()),
            );
            log::error!("[{}] API 错误: {}", self.provider_name(), raw.message);
            return Err(self.map_error(raw, context));
        }

        Ok(cf_response)
    }
}
