use clap::{CommandFactory, Parser};
use cracknames::{
    directory, prefix_progname_to_error_if_needed, Context, CrackFlags, Cracker, FsmoRole,
    NameFormat, NameRequest, NameResult,
};
use once_cell::sync::Lazy;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const PROGNAME: &str = "crackname";

static ARGS: Lazy<Args> = Lazy::new(Args::parse);

#[derive(Parser)]
#[command(name = PROGNAME, version)]
struct Args {
    /// format the names are offered in (Default is unknown, which guesses)
    #[arg(short = 'f', long = "offered", default_value_t = NameFormat::Unknown)]
    offered: NameFormat,
    /// format to crack the names into
    #[arg(short = 'd', long = "desired", default_value_t = NameFormat::Fqdn1779)]
    desired: NameFormat,
    /// searches every partition, as a global catalog would
    #[arg(short = 'g', default_value_t = false)]
    gcverify: bool,
    /// only performs conversions that need no directory access
    #[arg(short = 's', default_value_t = false)]
    syntactical_only: bool,

    /// lists the owners of the operation master roles
    #[arg(short = 'r', long = "list-roles", default_value_t = false)]
    list_roles: bool,
    /// shows the NTDS settings, host name and reference of a server object
    #[arg(short = 'i', long = "server-info", default_value_t = false)]
    server_info: bool,

    /// specifies the directory (Default is the configured one)
    #[arg(short = 'D', long = "directory")]
    directory: Option<String>,
    /// specifies the default naming context of the directory
    #[arg(short = 'b', long = "base-dn")]
    base_dn: Option<String>,

    names: Vec<String>,
}

fn main() -> ExitCode {
    prefix_progname_to_error_if_needed(PROGNAME, run())
}

fn run() -> anyhow::Result<()> {
    if ARGS.list_roles && ARGS.server_info {
        return usage();
    }
    if ARGS.list_roles != ARGS.names.is_empty() {
        return usage();
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let context =
        Context::init().map_err(|e| anyhow::anyhow!("{} while reading the configuration", e))?;
    let Some(directory_name) = ARGS.directory.as_deref().or(context.directory.as_deref()) else {
        return usage();
    };
    let base_dn = ARGS.base_dn.as_deref().or(context.base_dn.as_deref());
    let directory = directory::resolve(directory_name, base_dn)
        .map_err(|e| anyhow::anyhow!("{:#} while opening directory {}", e, directory_name))?;
    let cracker = Cracker::new(directory.as_ref(), &context);

    if ARGS.list_roles {
        let results = cracker.list_roles()?;
        for (role, result) in FsmoRole::ALL.iter().zip(results) {
            show_result(&role.to_string(), &result);
        }
        return Ok(());
    }
    if ARGS.server_info {
        for name in &ARGS.names {
            let results = cracker.describe_server(name)?;
            for (label, result) in ["ntds-settings", "dns-host-name", "server-reference"]
                .iter()
                .zip(results)
            {
                show_result(label, &result);
            }
        }
        return Ok(());
    }

    let mut flags = CrackFlags::NONE;
    if ARGS.gcverify {
        flags = flags | CrackFlags::GCVERIFY;
    }
    if ARGS.syntactical_only {
        flags = flags | CrackFlags::SYNTACTICAL_ONLY;
    }
    let requests = ARGS
        .names
        .iter()
        .map(|name| NameRequest::new(&unescape(name), ARGS.offered, ARGS.desired).with_flags(flags))
        .collect::<Vec<NameRequest>>();
    for (name, result) in ARGS.names.iter().zip(cracker.crack_names(&requests)?) {
        show_result(name, &result);
    }
    Ok(())
}

fn usage() -> anyhow::Result<()> {
    Err(anyhow::anyhow!(Args::command().render_help()))
}

// Lets extended canonical names be typed as `example.com/Users\nalice`
fn unescape(name: &str) -> String {
    match ARGS.offered {
        NameFormat::CanonicalEx => name.replace("\\n", "\n"),
        _ => name.to_owned(),
    }
}

fn show_result(label: &str, result: &NameResult) {
    println!(
        "{}: {} {} {}",
        label.escape_debug(),
        result.status,
        result.dns_domain_name.as_deref().unwrap_or("-"),
        result
            .result_name
            .as_deref()
            .map(|name| name.escape_debug().to_string())
            .unwrap_or_else(|| "-".to_owned())
    );
}
