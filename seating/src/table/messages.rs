//! Table actor message types.

use super::{
    errors::SeatingResult,
    models::{ReservationId, Table},
};
use tokio::sync::oneshot;

/// Messages that can be sent to a TableActor
#[derive(Debug)]
pub enum TableMessage {
    /// Seat a reservation at this table
    Seat {
        reservation_id: ReservationId,
        response: oneshot::Sender<SeatingResult<Table>>,
    },

    /// Finish the seated reservation and free this table
    Release {
        response: oneshot::Sender<SeatingResult<()>>,
    },

    /// Stop the actor
    Close { response: oneshot::Sender<()> },
}
