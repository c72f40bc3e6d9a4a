use std::path::Path;

use tracing::{error, info, warn};

use crate::lookup::LookupError;
use crate::processor::ProcessError;
use crate::report::ReportError;

/// An operational event worth surfacing to the logs.
///
/// Components construct the event where it happens and hand it to [`emit`];
/// the log message and fields live here rather than inline at the call site.
pub trait InternalEvent {
    fn emit(self);
}

pub fn emit(event: impl InternalEvent) {
    event.emit();
}

#[derive(Debug)]
pub struct LookupTableLoaded<'a> {
    pub path: &'a Path,
    pub entries: usize,
    pub skipped: usize,
}

impl InternalEvent for LookupTableLoaded<'_> {
    fn emit(self) {
        info!(
            message = "Loaded lookup table.",
            path = %self.path.display(),
            entries = self.entries,
            skipped = self.skipped,
        );
    }
}

#[derive(Debug)]
pub struct LookupRowSkipped<'a> {
    pub row: &'a str,
    pub line: u64,
}

impl InternalEvent for LookupRowSkipped<'_> {
    fn emit(self) {
        warn!(
            message = "Skipping malformed row in lookup table.",
            row = %self.row,
            line = self.line,
        );
    }
}

#[derive(Debug)]
pub struct LookupLoadFailed<'a> {
    pub path: &'a Path,
    pub error: &'a LookupError,
}

impl InternalEvent for LookupLoadFailed<'_> {
    fn emit(self) {
        error!(
            message = "Failed to load lookup table.",
            path = %self.path.display(),
            error = %self.error,
        );
    }
}

#[derive(Debug)]
pub struct FlowLineSkipped<'a> {
    pub line: &'a str,
    pub number: u64,
}

impl InternalEvent for FlowLineSkipped<'_> {
    fn emit(self) {
        warn!(
            message = "Skipping malformed line in flow log.",
            line = %self.line,
            number = self.number,
        );
    }
}

#[derive(Debug)]
pub struct FlowLogProcessed<'a> {
    pub path: &'a Path,
    pub records: u64,
    pub skipped: u64,
}

impl InternalEvent for FlowLogProcessed<'_> {
    fn emit(self) {
        info!(
            message = "Processed flow log.",
            path = %self.path.display(),
            records = self.records,
            skipped = self.skipped,
        );
    }
}

#[derive(Debug)]
pub struct FlowLogFailed<'a> {
    pub path: &'a Path,
    pub error: &'a ProcessError,
}

impl InternalEvent for FlowLogFailed<'_> {
    fn emit(self) {
        error!(
            message = "Failed to process flow log.",
            path = %self.path.display(),
            error = %self.error,
        );
    }
}

#[derive(Debug)]
pub struct ReportWritten<'a> {
    pub path: &'a Path,
}

impl InternalEvent for ReportWritten<'_> {
    fn emit(self) {
        info!(message = "Report written.", path = %self.path.display());
    }
}

#[derive(Debug)]
pub struct ReportWriteFailed<'a> {
    pub path: &'a Path,
    pub error: &'a ReportError,
}

impl InternalEvent for ReportWriteFailed<'_> {
    fn emit(self) {
        error!(
            message = "Failed to write report.",
            path = %self.path.display(),
            error = %self.error,
        );
    }
}
