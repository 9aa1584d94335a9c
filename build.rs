//! Renders `bbqrflow.1` and one `bbqrflow-<subcommand>.1` page per
//! subcommand into `$OUT_DIR/man`.

use std::{
    env,
    fs,
    path::{Path, PathBuf},
};

use clap::{Command, CommandFactory};
use clap_mangen::Man;

#[path = "src/cli.rs"]
#[allow(dead_code, reason = "only the command definition is used here")]
mod cli;

type BuildResult = Result<(), Box<dyn std::error::Error>>;

fn render(page: Man, path: &Path) -> BuildResult {
    let mut buf = Vec::new();
    page.render(&mut buf)?;
    fs::write(path, buf)?;
    Ok(())
}

fn main() -> BuildResult {
    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = env::var_os("OUT_DIR").ok_or("OUT_DIR is not set")?;
    let man_dir = PathBuf::from(out_dir).join("man");
    fs::create_dir_all(&man_dir)?;

    let cmd: Command = cli::Cli::command();
    let root = cmd.get_name().to_owned();
    for sub in cmd.get_subcommands() {
        let page = format!("{root}-{}", sub.get_name());
        render(
            Man::new(sub.clone()).title(page.to_uppercase()),
            &man_dir.join(format!("{page}.1")),
        )?;
    }
    render(Man::new(cmd), &man_dir.join(format!("{root}.1")))
}
