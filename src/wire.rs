use std::sync::Arc;
use std::time::Instant;

use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tracing::{debug, error};
use ulid::Ulid;

use crate::engine::{Desk, DeskError};
use crate::limits::MAX_REQUEST_LINE_BYTES;
use crate::model::{Booking, BookingDraft};
use crate::observability;

/// One request per line, newline-delimited JSON, tagged by `op`.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Request {
    Create {
        booking: BookingDraft,
    },
    Extend {
        id: Ulid,
        #[serde(rename = "additionalNights")]
        additional_nights: u32,
    },
    Get {
        id: Ulid,
    },
    Bookings {
        #[serde(rename = "unitID")]
        unit_id: String,
    },
    Health,
}

/// One response per request, tagged by `status`. Every outcome of the error
/// taxonomy gets its own status so callers can branch without string
/// matching.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Created { booking: Booking },
    Extended { booking: Booking },
    Found { booking: Booking },
    Bookings { bookings: Vec<Booking> },
    Alive,
    Rejected { reason: &'static str },
    NotFound,
    Invalid { error: String },
    Error { error: String },
}

impl Response {
    fn status_label(&self) -> &'static str {
        match self {
            Response::Created { .. } => "created",
            Response::Extended { .. } => "extended",
            Response::Found { .. } => "found",
            Response::Bookings { .. } => "bookings",
            Response::Alive => "alive",
            Response::Rejected { .. } => "rejected",
            Response::NotFound => "not_found",
            Response::Invalid { .. } => "invalid",
            Response::Error { .. } => "error",
        }
    }
}

/// Serve one client connection until it closes or sends an oversized line.
pub async fn process_connection(
    socket: TcpStream,
    desk: Arc<Desk>,
) -> Result<(), LinesCodecError> {
    let mut framed = Framed::new(
        socket,
        LinesCodec::new_with_max_length(MAX_REQUEST_LINE_BYTES),
    );

    while let Some(line) = framed.next().await {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => {
                let op = observability::op_label(&request);
                let start = Instant::now();
                let response = dispatch(&desk, request).await;
                metrics::histogram!(observability::REQUEST_DURATION_SECONDS, "op" => op)
                    .record(start.elapsed().as_secs_f64());
                metrics::counter!(
                    observability::REQUESTS_TOTAL,
                    "op" => op,
                    "status" => response.status_label()
                )
                .increment(1);
                response
            }
            Err(e) => {
                debug!("unparseable request: {e}");
                Response::Invalid {
                    error: format!("bad request: {e}"),
                }
            }
        };

        let payload = serde_json::to_string(&response).unwrap_or_else(|e| {
            format!(r#"{{"status":"error","error":"encoding failure: {e}"}}"#)
        });
        framed.send(payload).await?;
    }

    Ok(())
}

async fn dispatch(desk: &Desk, request: Request) -> Response {
    match request {
        Request::Create { booking } => match desk.create_booking(booking).await {
            Ok(booking) => Response::Created { booking },
            Err(e) => failure(e),
        },
        Request::Extend {
            id,
            additional_nights,
        } => match desk.extend_booking(id, additional_nights).await {
            Ok(booking) => Response::Extended { booking },
            Err(e) => failure(e),
        },
        Request::Get { id } => match desk.booking(id).await {
            Ok(Some(booking)) => Response::Found { booking },
            Ok(None) => Response::NotFound,
            Err(e) => failure(e),
        },
        Request::Bookings { unit_id } => match desk.unit_bookings(&unit_id).await {
            Ok(bookings) => Response::Bookings { bookings },
            Err(e) => failure(e),
        },
        Request::Health => Response::Alive,
    }
}

fn failure(e: DeskError) -> Response {
    match e {
        DeskError::Rejected(reason) => Response::Rejected { reason },
        DeskError::NotFound(_) => Response::NotFound,
        DeskError::InvalidInput(msg) | DeskError::LimitExceeded(msg) => Response::Invalid {
            error: msg.to_string(),
        },
        DeskError::Store(e) => {
            error!("store failure: {e}");
            Response::Error {
                error: e.to_string(),
            }
        }
    }
}
