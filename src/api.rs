use crate::{
    errors::Error,
    message::request::{
        BaseResponse, DeleteRequest, LongId, Page, QuestionEditRequest, QuestionQuery,
        SubmissionQuery, SubmissionRecord,
    },
    question::{QuestionDraft, QuestionRecord, QuestionView},
};
use reqwest::{header, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

/// HTTP side of the judge backend.
pub struct Backend {
    client: reqwest::Client,
    host: String,
    access_token: Option<String>,
}

impl Backend {
    pub fn new(host: String, access_token: Option<String>) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("oj-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            host,
            access_token,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub(crate) async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<BaseResponse<T>, Error> {
        let request = self.client.post(format!("{}{path}", self.host)).json(body);
        self.send(path, request).await
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<BaseResponse<T>, Error> {
        let request = self.client.get(format!("{}{path}", self.host)).query(query);
        self.send(path, request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        path: &str,
        mut request: RequestBuilder,
    ) -> Result<BaseResponse<T>, Error> {
        if let Some(token) = &self.access_token {
            request = request.header(header::AUTHORIZATION, token.as_str());
        }
        tracing::debug!(path, "sending request");
        let response = request.send().await.map_err(|e| {
            Error::Request(format!(
                "network request failed, please check the connection: {e}"
            ))
        })?;
        read_response(response).await
    }

    pub async fn question(&self, id: &str) -> Result<QuestionView, Error> {
        let response = self
            .get::<QuestionView>("/api/question/get/vo", &[("id", id)])
            .await?;
        into_data(response)
    }

    pub async fn submissions(
        &self,
        query: &SubmissionQuery,
    ) -> Result<Page<SubmissionRecord>, Error> {
        let response = self
            .post::<_, Page<SubmissionRecord>>("/api/question/question_submit/list/page", query)
            .await?;
        into_data(response)
    }

    /// Public question list, annotated with the caller's submission status.
    pub async fn questions(
        &self,
        query: &QuestionQuery,
    ) -> Result<Page<QuestionRecord>, Error> {
        let response = self
            .post::<_, Page<QuestionRecord>>("/api/question/list/page/vo/submit_status", query)
            .await?;
        into_data(response)
    }

    /// Questions created by the caller.
    pub async fn my_questions(
        &self,
        query: &QuestionQuery,
    ) -> Result<Page<QuestionRecord>, Error> {
        let response = self
            .post::<_, Page<QuestionRecord>>("/api/question/my/list/page/vo", query)
            .await?;
        into_data(response)
    }

    pub async fn add_question(&self, draft: &QuestionDraft) -> Result<LongId, Error> {
        let request = QuestionEditRequest { id: None, draft };
        let response = self.post::<_, LongId>("/api/question/add", &request).await?;
        let id = into_data(response)?;
        tracing::info!(%id, title = %draft.title, "question added");
        Ok(id)
    }

    pub async fn edit_question(&self, id: &str, draft: &QuestionDraft) -> Result<(), Error> {
        let request = QuestionEditRequest {
            id: Some(id),
            draft,
        };
        let response = self.post::<_, bool>("/api/question/edit", &request).await?;
        into_confirmed(response)?;
        tracing::info!(id, title = %draft.title, "question edited");
        Ok(())
    }

    pub async fn delete_question(&self, id: &str) -> Result<(), Error> {
        let response = self
            .post::<_, bool>("/api/question/delete", &DeleteRequest { id })
            .await?;
        into_confirmed(response)?;
        tracing::info!(id, "question deleted");
        Ok(())
    }
}

async fn read_response<T: DeserializeOwned>(response: Response) -> Result<BaseResponse<T>, Error> {
    match response.status() {
        StatusCode::UNAUTHORIZED => Err(Error::Request(
            "login expired, please log in again".to_string(),
        )),
        status if !status.is_success() => Err(Error::Request(format!(
            "request failed: {}",
            status.as_u16()
        ))),
        _ => response
            .json()
            .await
            .map_err(|e| Error::Request(format!("unexpected response body: {e}"))),
    }
}

/// Unwraps a response whose payload is required.
pub fn into_data<T>(response: BaseResponse<T>) -> Result<T, Error> {
    if response.code != 0 {
        return Err(Error::Rejected {
            code: response.code,
            message: response.message,
        });
    }
    response
        .data
        .ok_or_else(|| Error::Request("response carried no data".to_string()))
}

/// Unwraps a response whose payload only says whether the change was made.
pub fn into_confirmed(response: BaseResponse<bool>) -> Result<(), Error> {
    let code = response.code;
    let message = response.message.clone();
    match into_data(response)? {
        true => Ok(()),
        false => Err(Error::Rejected { code, message }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> Response {
        http::Response::builder()
            .status(status)
            .body(body.to_string())
            .unwrap()
            .into()
    }

    #[tokio::test]
    async fn unauthorized_means_login_expired() {
        let result = read_response::<bool>(response(401, "")).await;
        assert_eq!(
            result.unwrap_err(),
            Error::Request("login expired, please log in again".to_string())
        );
    }

    #[tokio::test]
    async fn other_failures_carry_the_status() {
        let result = read_response::<bool>(response(502, "bad gateway")).await;
        assert_eq!(
            result.unwrap_err(),
            Error::Request("request failed: 502".to_string())
        );
    }

    #[tokio::test]
    async fn success_body_is_decoded() {
        let result =
            read_response::<bool>(response(200, r#"{"code": 50001, "message": "repeated"}"#)).await;
        let body = result.unwrap();
        assert_eq!(body.code, 50001);
        assert_eq!(body.message.as_deref(), Some("repeated"));

        let result = read_response::<bool>(response(200, "<html>")).await;
        assert!(matches!(result, Err(Error::Request(_))));
    }

    #[test]
    fn confirmation_requires_true() {
        let done: BaseResponse<bool> =
            serde_json::from_str(r#"{"code": 0, "data": true}"#).unwrap();
        assert_eq!(into_confirmed(done), Ok(()));

        let refused: BaseResponse<bool> =
            serde_json::from_str(r#"{"code": 0, "data": false, "message": "not yours"}"#).unwrap();
        assert_eq!(
            into_confirmed(refused),
            Err(Error::Rejected {
                code: 0,
                message: Some("not yours".to_string())
            })
        );
    }

    #[test]
    fn non_zero_code_is_rejection() {
        let response: BaseResponse<u64> =
            serde_json::from_str(r#"{"code": 40101, "message": "no auth"}"#).unwrap();
        assert_eq!(
            into_data(response),
            Err(Error::Rejected {
                code: 40101,
                message: Some("no auth".to_string())
            })
        );
    }

    #[test]
    fn zero_code_yields_data() {
        let response: BaseResponse<u64> =
            serde_json::from_str(r#"{"code": 0, "data": 7}"#).unwrap();
        assert_eq!(into_data(response), Ok(7));

        let response: BaseResponse<u64> = serde_json::from_str(r#"{"code": 0}"#).unwrap();
        assert!(into_data(response).is_err());
    }
}
