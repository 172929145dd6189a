use clap::{crate_description, crate_version, value_parser, Arg, ArgAction, ArgMatches, Command};
use pretty_env_logger::env_logger::Builder;
use snafu::ResultExt;
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::exit;

use dozone_rs::common::{IoSnafu, Result, SyncSnafu, ZoneName};
use dozone_rs::service::{confirm, describe_plan};
use dozone_rs::zonefile::read_zone_file;
use dozone_rs::Config;

fn set_logger_level(b: &mut Builder) {
    let mut b = b;
    if env::var("RUST_LOG").is_err() {
        b = b.filter_level(log::LevelFilter::Info)
    }
    b.init();
}

fn setup_logger() {
    // Adapted from env_logger examples. <3 Systemd support
    match std::env::var("RUST_LOG_STYLE") {
        Ok(s) if s == "SYSTEMD" => {
            let builder = &mut pretty_env_logger::env_logger::builder();
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "<{}>{}: {}",
                    match record.level() {
                        log::Level::Error => 3,
                        log::Level::Warn => 4,
                        log::Level::Info => 6,
                        log::Level::Debug => 7,
                        log::Level::Trace => 7,
                    },
                    record.target(),
                    record.args()
                )
            });
            set_logger_level(builder);
        }
        _ => {
            let builder = &mut pretty_env_logger::formatted_builder();
            set_logger_level(builder);
        }
    };
}

fn command() -> Command {
    Command::new("dozone")
        .about(format!(
            "{}\n{} {}",
            crate_description!(),
            "The API token is read from DIGITALOCEAN_ACCESS_TOKEN.",
            "Prefix the value with @ to read it from a file.",
        ))
        .arg(
            Arg::new("zonefile")
                .value_parser(value_parser!(PathBuf))
                .required_unless_present("download")
                .help("Zone file describing the desired state")
                .long_help(
                    "Zone file describing the desired state. Entries that cannot be parsed \
                     or use an unsupported record type are skipped with a warning; remote \
                     records they would have matched are deleted.",
                ),
        )
        .arg(
            Arg::new("yes")
                .action(ArgAction::SetTrue)
                .short('y')
                .long("yes")
                .help("Don't ask before committing"),
        )
        .arg(
            Arg::new("dry-run")
                .action(ArgAction::SetTrue)
                .long("dry-run")
                .help("Show changes without applying them"),
        )
        .arg(
            Arg::new("check")
                .action(ArgAction::SetTrue)
                .short('t')
                .long("test")
                .help("Check the zone file and the configuration"),
        )
        .arg(
            Arg::new("download")
                .long("download")
                .value_name("ZONE")
                .conflicts_with_all(["zonefile", "dry-run", "check"])
                .help("Print the remote zone as a zone file"),
        )
        .arg(
            Arg::new("origin")
                .long("origin")
                .value_name("NAME")
                .help("Origin for relative names if the zone file has no $ORIGIN"),
        )
        .arg(
            Arg::new("replace-cnames")
                .action(ArgAction::SetTrue)
                .long("replace-cnames")
                .help("Rewrite CNAME records on every run"),
        )
        .arg(
            Arg::new("debug-http")
                .action(ArgAction::SetTrue)
                .long("debug-http")
                .help("Log API requests and responses"),
        )
        .version(crate_version!())
}

pub(crate) fn main() {
    let args = command().get_matches();

    setup_logger();

    let mut config = match Config::from_env() {
        Ok(c) => c,
        Err(err) => {
            eprintln!("{err}");
            exit(2);
        }
    };
    if args.get_flag("debug-http") {
        config.digitalocean.debug_http = true;
    }
    if args.get_flag("replace-cnames") {
        config.sync.replace_cnames = true;
    }

    if let Err(err) = run(&args, config) {
        eprintln!("Error: {err}");
        exit(1);
    }
}

fn run(args: &ArgMatches, config: Config) -> Result<()> {
    let mut service = config.get_service()?;

    if let Some(zone) = args.get_one::<String>("download") {
        print!("{}", service.download(&ZoneName::new(zone))?);
        return Ok(());
    }

    let origin = args.get_one::<String>("origin").map(|o| ZoneName::new(o));
    let path = args
        .get_one::<PathBuf>("zonefile")
        .expect("zonefile is required without --download");
    let desired = read_zone_file(path, origin.as_ref())?;

    if args.get_flag("check") {
        tracing::info!(
            zone = desired.name.as_str(),
            records = desired.records.len(),
            skipped = desired.skipped,
            "Configuration is valid."
        );
        return Ok(());
    }

    let zone = desired.name.clone();
    let dry_run = args.get_flag("dry-run");
    let plan = service.plan(desired, dry_run)?;

    let mut stdout = io::stdout();
    if dry_run {
        describe_plan(&plan, &mut stdout).context(IoSnafu {
            message: "Failed to print plan",
        })?;
        println!("{} change(s).", plan.len());
        return Ok(());
    }

    if !args.get_flag("yes") {
        let accepted = confirm(&plan, &mut io::stdin().lock(), &mut stdout).context(IoSnafu {
            message: "Failed to read confirmation",
        })?;
        if !accepted {
            return SyncSnafu {
                message: "Aborting",
            }
            .fail();
        }
    }

    service.apply(&zone, plan)?;
    println!("Zone synced.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_consistent() {
        command().debug_assert();
    }

    #[test]
    fn download_does_not_need_a_zone_file() {
        let args = command()
            .try_get_matches_from(["dozone", "--download", "example.com"])
            .unwrap();
        assert_eq!(args.get_one::<String>("download").unwrap(), "example.com");
    }

    #[test]
    fn zone_file_is_required_otherwise() {
        assert!(command().try_get_matches_from(["dozone", "--yes"]).is_err());

        let args = command()
            .try_get_matches_from(["dozone", "-y", "--replace-cnames", "zone.txt"])
            .unwrap();
        assert!(args.get_flag("yes"));
        assert!(args.get_flag("replace-cnames"));
        assert!(!args.get_flag("dry-run"));
    }
}
