//! Error handling utilities

use tracing::error;

use crate::error::PortableError;

/// Exit status for an error that reached `main`
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<PortableError>())
        .map(PortableError::exit_code)
        .unwrap_or(1)
}

/// Handle fatal errors and exit with appropriate status code
///
/// # Verbose Mode Behavior
/// - `verbose = 0`: top-level message only
/// - `verbose >= 1`: full error chain
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {}", error);

    eprintln!("Error: {error}");
    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    } else if let Some(transient) = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<PortableError>())
        .filter(|e| e.is_transient())
    {
        eprintln!("The failure looks transient ({transient}); re-run the same job to resume.");
    }

    std::process::exit(exit_code_for(&error))
}
