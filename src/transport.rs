//! Classification of `ureq` failures shared by the store and LLM clients.

use std::io;

/// Why an outbound HTTP call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Failure {
    /// The agent's timeout elapsed.
    Timeout,
    /// Nothing is listening at the address (refused connection, DNS).
    Unreachable,
    /// The server answered with a non-2xx status.
    Status { code: u16, body: String },
    /// Anything else (TLS, malformed URL, protocol errors).
    Other(String),
}

/// Map a `ureq` error onto a [`Failure`].
pub(crate) fn classify(err: ureq::Error) -> Failure {
    match err {
        ureq::Error::Status(code, resp) => Failure::Status {
            code,
            body: resp.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(transport) => {
            if transport_timed_out(&transport) {
                return Failure::Timeout;
            }
            match transport.kind() {
                ureq::ErrorKind::ConnectionFailed | ureq::ErrorKind::Dns => Failure::Unreachable,
                _ => Failure::Other(transport.to_string()),
            }
        }
    }
}

/// Whether an I/O error from reading a response body is a timeout.
pub(crate) fn io_timed_out(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
}

fn transport_timed_out(transport: &ureq::Transport) -> bool {
    let mut source = std::error::Error::source(transport);
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            return io_timed_out(io_err);
        }
        source = err.source();
    }
    false
}
