//! Start trigger backed by the lifecycle monitor.

use crate::command::ports::{StartTrigger, StartTriggerError};
use crate::lifecycle::services::StartRequester;

impl StartTrigger for StartRequester {
    fn request_start(&self) -> Result<(), StartTriggerError> {
        Self::request_start(self).map_err(|_not_running| StartTriggerError::Closed)
    }
}
