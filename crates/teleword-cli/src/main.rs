mod cli;

use teleword_bot::{SendError, SendErrorKind};

/// Exit code for failures outside the send taxonomy (e.g. runtime setup).
const EXIT_INTERNAL: i32 = 1;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{e:#}"); // pretty anyhow chain
        let code = match e.downcast_ref::<SendError>() {
            Some(err) => {
                if err.kind == SendErrorKind::Usage {
                    eprintln!("\n{}\n\nFor more information, try '--help'.", cli::usage());
                }
                err.exit_code()
            }
            None => EXIT_INTERNAL,
        };
        std::process::exit(code);
    }
}
