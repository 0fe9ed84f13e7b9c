//! # play
//!
//! Launch TypeScript playground files with tsx.
//!
//! ## Usage
//!
//! - Run `index.ts`: `play`
//! - Run another file: `play -f scratch`, `play --file utils/parse`
//! - Re-run on change: `play -w -f scratch`
//! - List files under the configured root: `play --list`
//!
//! Settings come from `play.json` and `PLAY_*` environment variables.

fn main() {
    std::process::exit(tsplay::cli::run_cli());
}
