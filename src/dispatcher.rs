use crate::{
    api::Backend,
    errors::Error,
    message::request::{BaseResponse, DebugRequest, SubmitRequest},
};

/// Sends the action that makes the backend push a result. Both calls return
/// the application code of the acknowledgement; the verdict itself arrives
/// on the push channel.
#[allow(async_fn_in_trait)]
pub trait Dispatcher {
    async fn submit(&self, request: &SubmitRequest) -> Result<i64, Error>;

    async fn debug(&self, request: &DebugRequest) -> Result<i64, Error>;
}

impl Dispatcher for Backend {
    async fn submit(&self, request: &SubmitRequest) -> Result<i64, Error> {
        tracing::info!(
            sid = %request.sid,
            question = %request.question_id,
            language = %request.language,
            "submitting for judging"
        );
        let response: BaseResponse<serde_json::Value> =
            self.post("/api/question_submit/", request).await?;
        Ok(response.code)
    }

    async fn debug(&self, request: &DebugRequest) -> Result<i64, Error> {
        tracing::info!(
            sid = %request.sid,
            language = %request.language,
            cases = request.input_list.len(),
            "starting debug run"
        );
        let response: BaseResponse<serde_json::Value> =
            self.post("/api/question_submit/debug", request).await?;
        Ok(response.code)
    }
}
