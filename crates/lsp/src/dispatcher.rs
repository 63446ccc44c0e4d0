use crate::from_json;
use crate::server::LspServerState;
use crate::server::LspServerStateSnapshot;
use crate::server::Task;
use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;

fn result_to_response<R>(
    id: lsp_server::RequestId,
    result: Result<R::Result>,
) -> lsp_server::Response
where
    R: lsp_types::request::Request + 'static,
    R::Params: DeserializeOwned + 'static,
    R::Result: Serialize + 'static,
{
    match result {
        Ok(resp) => lsp_server::Response::new_ok(id, &resp),
        Err(e) => lsp_server::Response::new_err(
            id,
            lsp_server::ErrorCode::InternalError as i32,
            e.to_string(),
        ),
    }
}

/// Routes one client request to its handler.
///
/// `shutdown` runs on the main loop through [`RequestDispatcher::on_sync`].
/// `textDocument/rename` and `textDocument/prepareRename` only read document
/// markers, so [`RequestDispatcher::on`] runs them on the thread pool against
/// a snapshot of the open documents and the response comes back through the
/// task channel. Whatever is left when [`RequestDispatcher::finish`] runs is
/// answered with `MethodNotFound`.
#[must_use = "RequestDispatcher::finish not called"]
pub(crate) struct RequestDispatcher<'a> {
    state: &'a mut LspServerState,
    request: Option<lsp_server::Request>,
}

impl<'a> RequestDispatcher<'a> {
    pub fn new(state: &'a mut LspServerState, request: lsp_server::Request) -> Self {
        RequestDispatcher {
            state,
            request: Some(request),
        }
    }

    // Takes the request if its method is `R::METHOD`; bad params are answered
    // with `InvalidParams` right away.
    fn parse<R>(&mut self) -> Option<(lsp_server::RequestId, R::Params)>
    where
        R: lsp_types::request::Request + 'static,
        R::Params: DeserializeOwned + 'static,
    {
        let req = self.request.take_if(|req| req.method == R::METHOD)?;

        match from_json(R::METHOD, req.params) {
            Ok(params) => Some((req.id, params)),
            Err(err) => {
                let response = lsp_server::Response::new_err(
                    req.id,
                    lsp_server::ErrorCode::InvalidParams as i32,
                    err.to_string(),
                );
                self.state.respond(response);
                None
            }
        }
    }

    // Handlers that mutate server state, such as `shutdown`.
    pub fn on_sync<R>(
        &mut self,
        f: fn(&mut LspServerState, R::Params) -> Result<R::Result>,
    ) -> Result<&mut Self>
    where
        R: lsp_types::request::Request + 'static,
        R::Params: DeserializeOwned + 'static,
        R::Result: Serialize + 'static,
    {
        let Some((id, params)) = self.parse::<R>() else {
            return Ok(self);
        };
        let result = f(self.state, params);
        let response = result_to_response::<R>(id, result);
        self.state.respond(response);
        Ok(self)
    }

    // Read-only handlers, run off the main loop.
    pub fn on<R>(
        &mut self,
        f: fn(LspServerStateSnapshot, R::Params) -> Result<R::Result>,
    ) -> Result<&mut Self>
    where
        R: lsp_types::request::Request + 'static,
        R::Params: DeserializeOwned + 'static + Send,
        R::Result: Serialize + 'static,
    {
        let Some((id, params)) = self.parse::<R>() else {
            return Ok(self);
        };

        self.state.thread_pool.execute({
            let snapshot = self.state.snapshot();
            let sender = self.state.task_sender.clone();

            move || {
                let result = f(snapshot, params);
                let response = result_to_response::<R>(id, result);
                if let Err(err) = sender.send(Task::Response(response)) {
                    tracing::error!(
                        "failed to hand {} response back to the main loop: {}",
                        R::METHOD,
                        err
                    );
                }
            }
        });

        Ok(self)
    }

    // If the request was not handled, report back that this is an unknown request.
    pub fn finish(&mut self) {
        if let Some(req) = self.request.take() {
            tracing::error!("unknown request: {:?}", req);
            let response = lsp_server::Response::new_err(
                req.id,
                lsp_server::ErrorCode::MethodNotFound as i32,
                "unknown request".to_string(),
            );
            self.state.respond(response);
        }
    }
}

/// Routes one document sync notification (`didOpen`, `didChange`, `didSave`,
/// `didClose`) to its handler. Notifications always run on the main loop
/// since they change the set of open documents.
#[must_use = "NotificationDispatcher::finish not called"]
pub(crate) struct NotificationDispatcher<'a> {
    state: &'a mut LspServerState,
    notification: Option<lsp_server::Notification>,
}

impl<'a> NotificationDispatcher<'a> {
    pub fn new(state: &'a mut LspServerState, notification: lsp_server::Notification) -> Self {
        NotificationDispatcher {
            state,
            notification: Some(notification),
        }
    }

    /// Try to dispatch the event as the given Notification type.
    pub fn on<N>(
        &mut self,
        handle_notification_fn: fn(&mut LspServerState, N::Params) -> Result<()>,
    ) -> anyhow::Result<&mut Self>
    where
        N: lsp_types::notification::Notification + 'static,
        N::Params: DeserializeOwned + Send + 'static,
    {
        let Some(notification) = self.notification.take() else {
            return Ok(self);
        };
        let params = match notification.extract::<N::Params>(N::METHOD) {
            Ok(it) => it,
            Err(lsp_server::ExtractError::JsonError { method, error }) => {
                tracing::error!("invalid notification\nMethod: {method}\n error: {error}");
                return Ok(self);
            }
            Err(lsp_server::ExtractError::MethodMismatch(notification)) => {
                self.notification = Some(notification);
                return Ok(self);
            }
        };
        handle_notification_fn(self.state, params)?;
        Ok(self)
    }

    /// Logs notifications nothing handled. `$/` notifications may be ignored.
    pub fn finish(&mut self) {
        if let Some(notification) = &self.notification
            && !notification.method.starts_with("$/")
        {
            tracing::error!("unhandled notification: {:?}", notification);
        }
    }
}
