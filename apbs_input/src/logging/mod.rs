//! Global logging for the APBS input front end
//!
//! A process-wide [`LoggingService`] is installed once by
//! [`init_global_logging`]. Until then every log call is a no-op, so the
//! library stays silent when embedded.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

/// File currently being processed on this thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContext {
    pub file_path: PathBuf,
}

thread_local! {
    static FILE_CONTEXT: RefCell<Option<FileContext>> = const { RefCell::new(None) };
}

pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let logging_service = Arc::new(service::create_configured_service());

    GLOBAL_LOGGER
        .set(logging_service.clone())
        .map_err(|_| "Global logger already initialized")?;

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Logging initialized",
    ));

    Ok(())
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

pub fn set_file_context(file_path: PathBuf) {
    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(FileContext { file_path });
    });
}

pub fn clear_file_context() {
    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with `file_path` attached to every event logged on this thread
pub fn with_file_context<F, R>(file_path: PathBuf, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_file_context(file_path);
    let result = f();
    clear_file_context();
    result
}

pub fn get_current_file_context() -> Option<FileContext> {
    FILE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

fn dispatch(mut event: LogEvent, span: Option<crate::utils::Span>, context: Vec<(&str, &str)>) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };

    if let Some(s) = span {
        event = event.with_span(s);
    }

    for (key, value) in context {
        event = event.with_context(key, value);
    }

    if config::include_file_context() {
        if let Some(file_ctx) = get_current_file_context() {
            event = event.with_context("file", &file_ctx.file_path.display().to_string());
        }
    }

    logger.log_event(event);
}

pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    dispatch(LogEvent::error(code, message), span, context);
}

pub fn log_warning_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    dispatch(LogEvent::warning(code, message), span, context);
}

pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    dispatch(LogEvent::success(code, message), None, context);
}

pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(LogEvent::info(message), None, context);
}

pub fn log_debug_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(LogEvent::debug(message), None, context);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_context_management() {
        let file_path = PathBuf::from("apbs.in");

        assert!(get_current_file_context().is_none());

        set_file_context(file_path.clone());
        assert_eq!(
            get_current_file_context().map(|c| c.file_path),
            Some(file_path)
        );

        clear_file_context();
        assert!(get_current_file_context().is_none());
    }

    #[test]
    fn test_with_file_context() {
        let file_path = PathBuf::from("solvation.in");

        let result = with_file_context(file_path.clone(), || {
            assert_eq!(
                get_current_file_context().map(|c| c.file_path),
                Some(file_path.clone())
            );
            42
        });

        assert_eq!(result, 42);
        assert!(get_current_file_context().is_none());
    }
}
