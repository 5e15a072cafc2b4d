/// Diagnostics handler
///
/// Everything here goes to stderr. Stdout carries exactly one line, the
/// final version string, so CI pipelines can consume it directly.
#[derive(Default)]
pub struct Output {
    pub verbose: bool,
}

impl Output {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        eprintln!("warning: {}", message);
    }

    /// Print a verbose message (only if verbose mode is on)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("{}", message);
        }
    }
}

/// Print an error message to stderr
pub fn print_error(err: &anyhow::Error) {
    eprintln!("error: {}", err);

    // Print cause chain
    for cause in err.chain().skip(1) {
        eprintln!("  caused by: {}", cause);
    }
}
