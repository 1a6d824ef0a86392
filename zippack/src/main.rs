//TODO: update clap to remove the need for this
#![allow(dangerous_implicit_autorefs)]

use std::path::Path;

use anyhow::Context;
use chrono::NaiveDateTime;
use clap::{
    crate_description, crate_name, crate_version, App, AppSettings, Arg, ArgMatches, SubCommand,
};
use zippack::fs::{create_dir_all, save_file};
use zippack::{dos_date_time, PackOptions, Packer, Timestamp};

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DEMO_FILES: [(&str, &[u8]); 3] = [
    ("file_1.txt", b"content 1"),
    ("dir_2/file_2.txt", b"content 2"),
    ("dir_2/dir_3/file_3.txt", b"content 3"),
];

fn options(matches: &ArgMatches) -> anyhow::Result<PackOptions> {
    let mut options = PackOptions::default();
    if let Some(time) = matches.value_of("time") {
        let parsed = NaiveDateTime::parse_from_str(time, TIME_FORMAT)
            .with_context(|| format!("Invalid --time '{}', expected YYYY-MM-DDTHH:MM:SS", time))?;
        options = options.timestamp(Timestamp::Fixed(dos_date_time(&parsed)?));
    }
    if let Some(suffix) = matches.value_of("strip-suffix") {
        options = options.encryption_suffix(suffix);
    }
    Ok(options)
}

fn pack(options: PackOptions, dir: &str, archive: &str) -> anyhow::Result<()> {
    let summary = Packer::new(options)
        .pack(dir, archive)
        .with_context(|| format!("Failed to pack '{}'", dir))?;
    println!("'{}' has been successfully created ({} entries, {} bytes)", archive, summary.entries, summary.size);
    Ok(())
}

/// Lay out a small tree under `dir` to pack
fn demo_tree(dir: &str) -> anyhow::Result<()> {
    let dir = Path::new(dir);
    create_dir_all(dir.join("dir_2/dir_3"))?;
    for (name, content) in DEMO_FILES.iter() {
        save_file(dir.join(name), content)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let arg_dir = Arg::with_name("dir")
        .help("Directory to pack")
        .required(true)
        .value_name("DIR");

    let arg_archive = Arg::with_name("archive")
        .help("Archive file to create (replaced if it exists)")
        .required(true)
        .value_name("ARCHIVE");

    let arg_time = Arg::with_name("time")
        .help("Timestamp for every entry instead of the current time")
        .long("time")
        .takes_value(true)
        .value_name("YYYY-MM-DDTHH:MM:SS");

    let arg_suffix = Arg::with_name("strip-suffix")
        .help("Suffix to strip from entry names, e.g. '.rem'")
        .long("strip-suffix")
        .takes_value(true)
        .value_name("SUFFIX");

    let matches = App::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("pack")
                .about("Pack a directory into a stored ZIP archive")
                .arg(&arg_time)
                .arg(&arg_suffix)
                .arg(&arg_dir)
                .arg(&arg_archive),
        )
        .subcommand(
            SubCommand::with_name("demo")
                .about("Create a sample tree in DIR and pack it")
                .arg(&arg_time)
                .arg(&arg_dir)
                .arg(&arg_archive),
        )
        .get_matches();

    if let Some(matches) = matches.subcommand_matches("pack") {
        pack(
            options(matches)?,
            matches.value_of("dir").unwrap(),
            matches.value_of("archive").unwrap(),
        )
    } else if let Some(matches) = matches.subcommand_matches("demo") {
        let dir = matches.value_of("dir").unwrap();
        demo_tree(dir).context("Failed to create demo file structure")?;
        pack(options(matches)?, dir, matches.value_of("archive").unwrap())
    } else {
        Ok(())
    }
}
