use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use super::ApiError;

/// 请求体的字段级校验
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// 反序列化并校验 JSON 请求体
///
/// JSON 解析或校验失败在处理器执行前以 422 拒绝；
/// 读取请求体本身失败（如超过大小上限）保留其原始状态码
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(reject)?;

        value.validate().map_err(ApiError::Validation)?;
        Ok(Self(value))
    }
}

fn reject(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::BytesRejection(err) => ApiError::Rejected(err.status(), err.body_text()),
        other => ApiError::Validation(other.body_text()),
    }
}
