use crate::{
    channel::{Connector, ResultChannel},
    dispatcher::Dispatcher,
    errors::Error,
    interpreter,
    language::Language,
    message::request::{DebugRequest, SubmitRequest},
    session::{Effect, Outcome, SessionKind, SessionStatus, SubmissionSession},
    sid,
};
use std::time::Duration;

/// Everything a user works with on one question: code, language, ad-hoc
/// cases, and the latest judge and debug sessions.
///
/// Each kind of action owns one slot. Starting an action replaces the slot,
/// and a session's channel never outlives the call that opened it.
pub struct Workbench<C, D> {
    connector: C,
    dispatcher: D,
    result_timeout: Option<Duration>,
    pub language: Language,
    pub code: String,
    pub case_inputs: Vec<String>,
    case_outputs: Vec<String>,
    judge: Option<SubmissionSession>,
    debug: Option<SubmissionSession>,
}

impl<C: Connector, D: Dispatcher> Workbench<C, D> {
    pub fn new(connector: C, dispatcher: D, language: Language) -> Self {
        Self {
            connector,
            dispatcher,
            result_timeout: None,
            language,
            code: language.snippet().to_string(),
            case_inputs: Vec::new(),
            case_outputs: Vec::new(),
            judge: None,
            debug: None,
        }
    }

    pub fn with_result_timeout(mut self, limit: Option<Duration>) -> Self {
        self.result_timeout = limit;
        self
    }

    pub fn case_outputs(&self) -> &[String] {
        &self.case_outputs
    }

    pub async fn submit(&mut self, question_id: &str) -> &SubmissionSession {
        self.judge = None;
        let mut session = SubmissionSession::new(sid::generate(), SessionKind::Judge);
        let request = SubmitRequest {
            question_id: question_id.to_string(),
            language: self.language,
            code: self.code.clone(),
            sid: session.sid().clone(),
        };

        let dispatcher = &self.dispatcher;
        self.run(&mut session, || dispatcher.submit(&request), interpreter::judge)
            .await;

        self.judge.insert(session)
    }

    pub async fn run_debug(&mut self) -> Result<&SubmissionSession, Error> {
        if self.code.trim().is_empty() {
            return Err(Error::Precondition(
                "please write some code first".to_string(),
            ));
        }

        let inputs = if self.case_inputs.is_empty() {
            vec![String::new()]
        } else {
            self.case_inputs.clone()
        };
        self.debug = None;
        self.case_outputs = vec![String::new(); inputs.len()];

        let mut session = SubmissionSession::new(sid::generate(), SessionKind::Debug);
        let slots = inputs.len();
        let request = DebugRequest {
            code: self.code.clone(),
            language: self.language,
            input_list: inputs,
            sid: session.sid().clone(),
        };

        let dispatcher = &self.dispatcher;
        self.run(&mut session, || dispatcher.debug(&request), |body| {
            interpreter::debug(body, slots)
        })
        .await;

        if let SessionStatus::Completed(Outcome::Debug(debug)) = session.status() {
            self.case_outputs = debug.outputs.clone();
        }
        Ok(&*self.debug.insert(session))
    }

    /// Drives one session: open the channel, send the action once it is open,
    /// wait for the single result, then close on every path.
    async fn run<F, Fut>(
        &self,
        session: &mut SubmissionSession,
        dispatch: F,
        interpret: impl Fn(&str) -> Result<Outcome, Error>,
    ) where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<i64, Error>>,
    {
        session.begin();
        let mut channel = match self.connector.open(session.sid()).await {
            Ok(channel) => channel,
            Err(error) => {
                session.on_transport_error(error);
                return;
            }
        };

        if session.on_open() == Effect::Dispatch {
            let effect = match dispatch().await {
                Ok(0) => {
                    session.on_dispatched();
                    Effect::None
                }
                Ok(code) => session.on_rejected(Error::Rejected {
                    code,
                    message: None,
                }),
                Err(error) => session.on_dispatch_failed(error),
            };

            if effect != Effect::Close {
                match self.receive(&mut channel).await {
                    Ok(body) => {
                        session.on_message(interpret(&body));
                    }
                    Err(error) => {
                        session.on_transport_error(error);
                    }
                }
            }
        }

        channel.close().await;
        session.on_closed();
    }

    async fn receive(&self, channel: &mut C::Channel) -> Result<String, Error> {
        match self.result_timeout {
            Some(limit) => tokio::time::timeout(limit, channel.first_message())
                .await
                .unwrap_or_else(|_| {
                    Err(Error::Transport(format!(
                        "no result within {} seconds",
                        limit.as_secs()
                    )))
                }),
            None => channel.first_message().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::DUPLICATE_SUBMISSION,
        session::{ChannelState, Level, NO_OUTPUT},
        sid::SessionId,
        verdict::Verdict,
    };
    use std::{cell::RefCell, collections::VecDeque, rc::Rc};

    type Log = Rc<RefCell<Vec<String>>>;

    enum Push {
        Message(&'static str),
        Fail,
        Silent,
    }

    struct FakeConnector {
        log: Log,
        pushes: RefCell<VecDeque<Push>>,
        refuse: bool,
    }

    struct FakeChannel {
        log: Log,
        push: Push,
        open: bool,
    }

    impl Connector for FakeConnector {
        type Channel = FakeChannel;

        async fn open(&self, sid: &SessionId) -> Result<FakeChannel, Error> {
            if self.refuse {
                return Err(Error::Transport("connection refused".to_string()));
            }
            self.log.borrow_mut().push(format!("open {sid}"));
            let push = self.pushes.borrow_mut().pop_front().unwrap_or(Push::Silent);
            Ok(FakeChannel {
                log: self.log.clone(),
                push,
                open: true,
            })
        }
    }

    impl ResultChannel for FakeChannel {
        async fn first_message(&mut self) -> Result<String, Error> {
            assert!(self.open, "read from a closed channel");
            self.log.borrow_mut().push("read".to_string());
            match self.push {
                Push::Message(body) => Ok(body.to_string()),
                Push::Fail => Err(Error::Transport("reset".to_string())),
                Push::Silent => std::future::pending().await,
            }
        }

        async fn close(&mut self) {
            if self.open {
                self.open = false;
                self.log.borrow_mut().push("close".to_string());
            }
        }
    }

    struct FakeDispatcher {
        log: Log,
        code: Result<i64, Error>,
        debug_requests: RefCell<Vec<(String, Vec<String>)>>,
    }

    impl Dispatcher for FakeDispatcher {
        async fn submit(&self, request: &SubmitRequest) -> Result<i64, Error> {
            self.log.borrow_mut().push(format!("submit {}", request.sid));
            self.code.clone()
        }

        async fn debug(&self, request: &DebugRequest) -> Result<i64, Error> {
            self.log.borrow_mut().push(format!("debug {}", request.sid));
            self.debug_requests
                .borrow_mut()
                .push((request.sid.to_string(), request.input_list.clone()));
            self.code.clone()
        }
    }

    fn bench(
        pushes: Vec<Push>,
        code: Result<i64, Error>,
    ) -> (Workbench<FakeConnector, FakeDispatcher>, Log) {
        let log = Log::default();
        let connector = FakeConnector {
            log: log.clone(),
            pushes: RefCell::new(pushes.into()),
            refuse: false,
        };
        let dispatcher = FakeDispatcher {
            log: log.clone(),
            code,
            debug_requests: RefCell::new(Vec::new()),
        };
        let mut workbench = Workbench::new(connector, dispatcher, Language::Cpp);
        workbench.code = "int main() {}".to_string();
        (workbench, log)
    }

    fn entries(log: &Log) -> Vec<String> {
        log.borrow().clone()
    }

    #[tokio::test]
    async fn channel_opens_before_dispatch() {
        let (mut workbench, log) = bench(vec![Push::Message(r#"{"status": 2}"#)], Ok(0));
        let sid = workbench.submit("1").await.sid().clone();
        assert_eq!(
            entries(&log),
            vec![
                format!("open {sid}"),
                format!("submit {sid}"),
                "read".to_string(),
                "close".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn accepted_closes_after_single_message() {
        let (mut workbench, log) = bench(vec![Push::Message(r#"{"status": 2}"#)], Ok(0));
        let session = workbench.submit("1").await;
        let SessionStatus::Completed(Outcome::Judge(judge)) = session.status() else {
            panic!("unexpected status {:?}", session.status());
        };
        assert_eq!(judge.verdict, Verdict::Accepted);
        assert_eq!(session.channel(), Some(ChannelState::Closed));
        assert_eq!(entries(&log).iter().filter(|e| *e == "read").count(), 1);
        assert_eq!(entries(&log).last().map(String::as_str), Some("close"));
    }

    #[tokio::test]
    async fn duplicate_submission_closes_without_waiting() {
        let (mut workbench, log) = bench(
            vec![Push::Message(r#"{"status": 2}"#)],
            Ok(DUPLICATE_SUBMISSION),
        );
        let session = workbench.submit("1").await;
        assert_eq!(session.status(), &SessionStatus::Idle);
        assert_eq!(session.notices()[0].level, Level::Warning);
        assert_eq!(
            session.notices()[0].text,
            "duplicate submission, please do not resubmit"
        );
        assert!(!entries(&log).contains(&"read".to_string()));
        assert_eq!(entries(&log).last().map(String::as_str), Some("close"));
    }

    #[tokio::test]
    async fn generic_rejection_and_send_failure() {
        let (mut workbench, _) = bench(vec![], Ok(40000));
        let session = workbench.submit("1").await;
        assert_eq!(session.status(), &SessionStatus::Idle);
        assert_eq!(session.notices()[0].level, Level::Error);

        let (mut workbench, log) =
            bench(vec![], Err(Error::Request("network down".to_string())));
        let session = workbench.submit("1").await;
        assert_eq!(session.status(), &SessionStatus::Idle);
        assert!(session.notices()[0].text.contains("network down"));
        assert_eq!(entries(&log).last().map(String::as_str), Some("close"));
    }

    #[tokio::test]
    async fn malformed_push_is_generic_failure() {
        let (mut workbench, log) = bench(vec![Push::Message(r#"{"status": "#)], Ok(0));
        let session = workbench.submit("1").await;
        assert_eq!(
            session.status(),
            &SessionStatus::Completed(Outcome::Failed(
                "failed to parse judge result".to_string()
            ))
        );
        assert_eq!(session.notices().len(), 1);
        assert_eq!(entries(&log).last().map(String::as_str), Some("close"));
    }

    #[tokio::test]
    async fn transport_errors_revert_to_idle() {
        let (mut workbench, log) = bench(vec![Push::Fail], Ok(0));
        let session = workbench.submit("1").await;
        assert_eq!(session.status(), &SessionStatus::Idle);
        assert_eq!(session.channel(), Some(ChannelState::Closed));
        assert_eq!(entries(&log).last().map(String::as_str), Some("close"));

        let (mut workbench, log) = bench(vec![], Ok(0));
        workbench.connector.refuse = true;
        let session = workbench.submit("1").await;
        assert_eq!(session.status(), &SessionStatus::Idle);
        assert!(entries(&log).is_empty(), "nothing is dispatched without a channel");
    }

    #[tokio::test(start_paused = true)]
    async fn silent_backend_times_out() {
        let (workbench, log) = bench(vec![Push::Silent], Ok(0));
        let mut workbench = workbench.with_result_timeout(Some(Duration::from_secs(5)));
        let session = workbench.submit("1").await;
        assert_eq!(session.status(), &SessionStatus::Idle);
        assert!(session.notices()[0].text.contains("no result within 5 seconds"));
        assert_eq!(entries(&log).last().map(String::as_str), Some("close"));
    }

    #[tokio::test]
    async fn debug_outputs_follow_inputs() {
        let (mut workbench, _) =
            bench(vec![Push::Message(r#"{"outputList": ["3", "7"]}"#)], Ok(0));
        workbench.case_inputs = vec!["1 2".to_string(), "3 4".to_string()];
        workbench.run_debug().await.unwrap();
        assert_eq!(workbench.case_outputs(), ["3", "7"]);
    }

    #[tokio::test]
    async fn debug_pads_missing_outputs() {
        let (mut workbench, _) = bench(
            vec![Push::Message(r#"{"outputList": ["1"], "message": "done"}"#)],
            Ok(0),
        );
        workbench.case_inputs = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let session = workbench.run_debug().await.unwrap();
        assert_eq!(session.notices()[0].level, Level::Info);
        assert_eq!(workbench.case_outputs(), ["1", NO_OUTPUT, NO_OUTPUT]);
    }

    #[tokio::test]
    async fn debug_requires_code_and_defaults_inputs() {
        let (mut workbench, log) = bench(vec![Push::Message("{}")], Ok(0));
        workbench.code = "   \n".to_string();
        assert!(matches!(
            workbench.run_debug().await,
            Err(Error::Precondition(_))
        ));
        assert!(entries(&log).is_empty());

        workbench.code = "int main() {}".to_string();
        workbench.run_debug().await.unwrap();
        let requests = workbench.dispatcher.debug_requests.borrow();
        assert_eq!(requests[0].1, vec![String::new()]);
    }

    #[tokio::test]
    async fn sequential_debug_runs_reset_outputs() {
        let (mut workbench, _) = bench(
            vec![
                Push::Message(r#"{"outputList": ["first", "second"]}"#),
                Push::Fail,
            ],
            Ok(0),
        );
        workbench.case_inputs = vec!["x".to_string(), "y".to_string()];
        let first = workbench.run_debug().await.unwrap().sid().clone();
        assert_eq!(workbench.case_outputs(), ["first", "second"]);

        let second = workbench.run_debug().await.unwrap().sid().clone();
        assert_ne!(first, second);
        assert_eq!(workbench.case_outputs(), ["", ""]);

        let requests = workbench.dispatcher.debug_requests.borrow();
        assert_eq!(requests.len(), 2);
        assert_ne!(requests[0].0, requests[1].0);
    }
}
