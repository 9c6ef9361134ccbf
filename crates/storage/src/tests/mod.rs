use std::{cell::RefCell, collections::VecDeque};

use crate::rest::{Request, Response, SendError, SendRequest};


/// Returns the queued responses in order and records every request. Without a queued response,
/// the connection is considered lost.
#[derive(Default)]
pub struct MockSendRequest {
    requests: RefCell<Vec<Request>>,
    responses: RefCell<VecDeque<Result<Response, SendError>>>,
}

impl MockSendRequest {
    pub fn new(responses: impl IntoIterator<Item = Result<Response, SendError>>) -> Self {
        Self {
            requests: RefCell::new(vec![]),
            responses: RefCell::new(responses.into_iter().collect()),
        }
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }
}

impl SendRequest for MockSendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, SendError> {
        self.requests.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(SendError::NoConnection))
    }
}

pub fn ok(body: &serde_json::Value) -> Result<Response, SendError> {
    Ok(Response {
        status: 200,
        body: body.to_string(),
    })
}

pub fn status(status: u16, body: &str) -> Result<Response, SendError> {
    Ok(Response {
        status,
        body: body.to_string(),
    })
}
