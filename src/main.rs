//! pointstracker main entrypoint.

use pointstracker::run;
use pointstracker::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(e);
        std::process::exit(1);
    }
}
