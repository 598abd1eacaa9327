use std::sync::Arc;

use crate::config::Config;
use crate::rate_limit::ContactRateLimiter;
use crate::writer::WorkbookWriter;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub writer: WorkbookWriter,
    pub limiter: ContactRateLimiter,
}
