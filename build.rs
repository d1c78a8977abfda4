//! Build script for man page generation.
//!
//! Renders `wifi-telemetry.1` plus one page per subcommand
//! (`wifi-telemetry-listen.1`, `wifi-telemetry-simulate.1`) into `OUT_DIR`
//! using `clap_mangen`. The CLI definitions come from the `cli-defs` crate so
//! the build script never has to compile the runtime library.

use std::{env, fs, io, path::Path};

use clap::{Command, CommandFactory};
use clap_mangen::Man;
use cli_defs::Cli;

fn render(cmd: Command, out_dir: &Path, page_name: &str) -> io::Result<()> {
    let mut file = fs::File::create(out_dir.join(format!("{page_name}.1")))?;
    Man::new(cmd).title(page_name.to_uppercase()).render(&mut file)
}

fn main() -> io::Result<()> {
    println!("cargo::rerun-if-changed=cli-defs");
    println!("cargo::rerun-if-changed=build.rs");

    // Cargo does not set OUT_DIR for IDE analysis runs.
    let Some(out_dir) = env::var_os("OUT_DIR") else {
        return Ok(());
    };
    let out_dir = Path::new(&out_dir);
    let bin_name = env::var("CARGO_PKG_NAME").unwrap_or_else(|_| "wifi-telemetry".into());

    let cmd = Cli::command();
    for sub in cmd.get_subcommands() {
        let page = format!("{bin_name}-{}", sub.get_name());
        render(sub.clone(), out_dir, &page)?;
    }
    render(cmd, out_dir, &bin_name)
}
