//! Commands sent from the pool to a relay task.

use shared_types::{Filter, TransportEvent};
use tokio::sync::oneshot;

use crate::domain::RelayError;

pub(crate) type Reply<T> = oneshot::Sender<Result<T, RelayError>>;

pub(crate) enum RelayCommand {
    Subscribe {
        subscription_id: String,
        filters: Vec<Filter>,
    },
    Unsubscribe {
        subscription_id: String,
    },
    Query {
        subscription_id: String,
        filters: Vec<Filter>,
        reply: Reply<Vec<TransportEvent>>,
    },
    CancelQuery {
        subscription_id: String,
    },
    Publish {
        event: TransportEvent,
        reply: Reply<()>,
    },
    Shutdown,
}
