use snafu::Snafu;
use tracing::error;

use crate::cli::Opts;
use crate::lookup::{LookupError, LookupTable};
use crate::processor::{FlowLogProcessor, ProcessError};
use crate::report::{ReportError, ReportWriter};

/// Failure of any pipeline stage, propagated unchanged to the caller.
#[derive(Debug, Snafu)]
pub enum RunError {
    #[snafu(transparent)]
    Lookup { source: LookupError },

    #[snafu(transparent)]
    Process { source: ProcessError },

    #[snafu(transparent)]
    Report { source: ReportError },
}

impl RunError {
    /// sysexits-style code the process terminates with.
    pub fn exit_code(&self) -> exitcode::ExitCode {
        match self {
            Self::Lookup {
                source: LookupError::Empty { .. },
            } => exitcode::DATAERR,
            Self::Lookup {
                source: LookupError::Open { source, .. } | LookupError::Read { source, .. },
            } => csv_exit_code(source),
            Self::Process {
                source: ProcessError::Open { source, .. } | ProcessError::Read { source, .. },
            } => io_exit_code(source),
            Self::Report {
                source: ReportError::Create { source, .. } | ReportError::Write { source, .. },
            } => io_exit_code(source),
        }
    }
}

fn csv_exit_code(error: &csv::Error) -> exitcode::ExitCode {
    match error.kind() {
        csv::ErrorKind::Io(error) => io_exit_code(error),
        _ => exitcode::DATAERR,
    }
}

fn io_exit_code(error: &std::io::Error) -> exitcode::ExitCode {
    match error.kind() {
        std::io::ErrorKind::NotFound => exitcode::NOINPUT,
        std::io::ErrorKind::PermissionDenied => exitcode::NOPERM,
        _ => exitcode::IOERR,
    }
}

/// Wires the pipeline together: lookup table, then flow log, then report.
#[derive(Debug)]
pub struct Application {
    opts: Opts,
}

impl Application {
    pub fn new(opts: Opts) -> Self {
        Self { opts }
    }

    /// Runs the pipeline and reports the outcome as a process exit code.
    pub fn run(self) -> exitcode::ExitCode {
        match self.execute() {
            Ok(()) => exitcode::OK,
            Err(error) => {
                let code = error.exit_code();
                error!(message = "Run failed.", %error);
                code
            }
        }
    }

    /// The pipeline itself, with the first fatal error propagated unchanged.
    pub fn execute(&self) -> Result<(), RunError> {
        let lookup = LookupTable::load(&self.opts.lookup_file)?;

        let summary = FlowLogProcessor::new(&lookup).process(&self.opts.flow_log_file)?;

        ReportWriter::new(&self.opts.output_file).write(&summary)?;

        Ok(())
    }
}
