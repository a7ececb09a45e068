// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use colored::Colorize;
use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};

use pyload_cli::commands::{print_commands, CommandDispatcher};
use pyload_cli::config::Preferences;
use pyload_cli::error::{describe_connect_error, is_connection_lost, ClientError};
use pyload_cli::i18n::{self, tr};
use pyload_cli::input;
use pyload_cli::logging;
use pyload_cli::remote::{HttpClient, RemoteClient};
use pyload_cli::screen::{enter_dashboard, restore_terminal, TerminalScreen};
use pyload_cli::session::{Session, SessionEnd, REFRESH_INTERVAL};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes following sysexits.h conventions
mod exit_codes {
    /// Success - operation completed successfully
    pub const SUCCESS: i32 = 0;
    /// General error - unspecified error
    pub const ERROR: i32 = 1;
    /// Usage error - invalid command line arguments
    pub const USAGE: i32 = 64;
    /// Service unavailable - core not reachable or connection lost
    pub const SERVICE_UNAVAILABLE: i32 = 69;
    /// Permission denied - the core refused the login
    pub const NO_PERMISSION: i32 = 77;
}

use exit_codes::*;

#[derive(Parser, Debug)]
#[command(name = "pyload-cli")]
#[command(version = VERSION)]
#[command(disable_help_flag = true)]
struct Cli {
    /// Start in interactive mode
    #[arg(short = 'i', long)]
    interactive: bool,

    /// Specify username
    #[arg(short = 'u', long)]
    username: Option<String>,

    /// Password
    #[arg(long = "pw")]
    password: Option<String>,

    /// Specify address
    #[arg(short = 'a', long = "address")]
    address: Option<String>,

    /// Specify port
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Set user interface language
    #[arg(short = 'l', long)]
    language: Option<String>,

    /// Display this help screen
    #[arg(short = 'h', long)]
    help: bool,

    /// List all available commands
    #[arg(short = 'c', long)]
    commands: bool,

    /// Command and its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn print_help(prefs: &Preferences) {
    println!();
    println!("pyLoad CLI {} Copyright (c) pyLoad Team", VERSION);
    println!();
    println!("Usage: pyload-cli [options] [command]");
    println!();
    println!("<Commands>");
    println!("See pyload-cli -c for a complete listing.");
    println!();
    println!("<Options>");
    println!("  -i, --interactive     Start in interactive mode");
    println!();
    println!("  -u, --username=       Specify Username");
    println!("  --pw=<password>       Password");
    println!("  -a, --address=        Specify address (current={})", prefs.addr);
    println!("  -p, --port            Specify port (current={})", prefs.port);
    println!();
    println!("  -l, --language        Set user interface language (current={})", prefs.language);
    println!("  -h, --help            Display this help screen");
    println!("  -c, --commands        List all available commands");
    println!("  -V, --version         Print version");
    println!();
}

fn exit_code_for(err: &ClientError) -> i32 {
    match err {
        ClientError::WrongLogin => NO_PERMISSION,
        ClientError::NoConnection { .. } | ClientError::NoSsl | ClientError::ConnectionClosed => {
            SERVICE_UNAVAILABLE
        }
        _ => ERROR,
    }
}

fn report_connect_error(err: &ClientError) {
    tracing::warn!(error = %err, "connection failed");
    eprintln!("{}", describe_connect_error(err));
}

/// Ask for whatever the failed attempt left unknown.
fn prompt_login(err: &ClientError, prefs: &mut Preferences, username: &mut String, password: &mut String) -> Result<()> {
    if let ClientError::NoConnection { .. } = err {
        let current = prefs.addr.clone();
        prefs.addr = inquire::Text::new(tr("Address: "))
            .with_default(&current)
            .prompt()
            .context("Address prompt cancelled")?;
        prefs.port = inquire::CustomType::<u16>::new(tr("Port: "))
            .with_default(prefs.port)
            .with_error_message("Please enter a port number")
            .prompt()
            .context("Port prompt cancelled")?;
    }
    if username.is_empty() {
        *username = inquire::Text::new(tr("Username: "))
            .prompt()
            .context("Username prompt cancelled")?;
    }
    if password.is_empty() {
        *password = inquire::Password::new(tr("Password: "))
            .without_confirmation()
            .prompt()
            .context("Password prompt cancelled")?;
    }
    Ok(())
}

/// Log in, prompting once for missing details in interactive mode.
fn connect(cli: &Cli, prefs: &mut Preferences) -> Result<HttpClient, i32> {
    let mut username = cli.username.clone().unwrap_or_default();
    let mut password = cli.password.clone().unwrap_or_default();

    let err = match HttpClient::connect(&prefs.addr, prefs.port, &username, &password) {
        Ok(client) => return Ok(client),
        Err(err) => err,
    };
    if !cli.interactive || err == ClientError::NoSsl {
        report_connect_error(&err);
        return Err(exit_code_for(&err));
    }
    if err == ClientError::WrongLogin && cli.username.is_some() && cli.password.is_some() {
        println!("{}", tr("Login data is wrong."));
        username.clear();
        password.clear();
    }

    if let Err(e) = prompt_login(&err, prefs, &mut username, &mut password) {
        eprintln!("{} {:#}", "[!]".yellow(), e);
        return Err(ERROR);
    }
    HttpClient::connect(&prefs.addr, prefs.port, &username, &password).map_err(|err| {
        report_connect_error(&err);
        exit_code_for(&err)
    })
}

fn run_command(client: &HttpClient, command: &[String]) -> i32 {
    let Some((name, args)) = command.split_first() else {
        return SUCCESS;
    };
    let workdir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let stdout = io::stdout();
    let mut dispatcher = CommandDispatcher::new(client, stdout.lock()).with_workdir(workdir);
    let code = match dispatcher.run(name, args) {
        Ok(()) => SUCCESS,
        Err(e) if is_connection_lost(&e) => {
            eprintln!("{}", tr("pyLoad was terminated"));
            SERVICE_UNAVAILABLE
        }
        Err(e) => {
            tracing::error!(command = %name, error = %format!("{:#}", e), "command failed");
            eprintln!("{} {:#}", "[!]".red(), e);
            ERROR
        }
    };
    client.close();
    code
}

fn run_dashboard(client: HttpClient) -> i32 {
    let client: Arc<dyn RemoteClient> = Arc::new(client);
    if let Err(e) = enter_dashboard() {
        restore_terminal();
        eprintln!("{} Could not take over the terminal: {}", "[!]".red(), e);
        return ERROR;
    }

    let session = Session::new(Arc::clone(&client), Box::new(TerminalScreen::new()));
    let (tx, rx) = mpsc::channel();

    let reader = input::spawn_reader(tx, || {
        tracing::info!("interrupted");
        restore_terminal();
        std::process::exit(SUCCESS);
    });
    let refresh = session.refresh_loop(REFRESH_INTERVAL).spawn(|| {
        restore_terminal();
        println!("{}", tr("pyLoad was terminated"));
        std::process::exit(SERVICE_UNAVAILABLE);
    });
    if let Err(e) = reader.and(refresh) {
        restore_terminal();
        eprintln!("{} Could not start the dashboard: {}", "[!]".red(), e);
        return ERROR;
    }

    let end = session.run(rx);
    restore_terminal();
    match end {
        SessionEnd::ConnectionLost => {
            println!("{}", tr("pyLoad was terminated"));
            SERVICE_UNAVAILABLE
        }
        // The kill path closed the connection already.
        SessionEnd::Killed => SUCCESS,
        SessionEnd::Quit | SessionEnd::Interrupted | SessionEnd::InputClosed => {
            client.close();
            SUCCESS
        }
    }
}

fn main() {
    let log_path = logging::init_logging();
    let mut prefs = Preferences::load();
    i18n::set_language(&prefs.language);

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayVersion => e.exit(),
        Err(e) => {
            tracing::warn!(error = %e, "rejected command line");
            let args: Vec<String> = std::env::args().skip(1).collect();
            println!("Unknown Argument(s) \"{}\"", args.join(" "));
            print_help(&prefs);
            std::process::exit(USAGE);
        }
    };

    prefs.override_with(cli.address.clone(), cli.port, cli.language.clone());
    if cli.language.is_some() {
        i18n::set_language(&prefs.language);
    }
    tracing::info!(version = VERSION, log = ?log_path, addr = %prefs.addr, port = prefs.port, "starting");

    if cli.help {
        print_help(&prefs);
        std::process::exit(SUCCESS);
    }
    if cli.commands {
        let code = match print_commands(&mut io::stdout()) {
            Ok(()) => SUCCESS,
            Err(_) => ERROR,
        };
        std::process::exit(code);
    }

    let client = match connect(&cli, &mut prefs) {
        Ok(client) => client,
        Err(code) => std::process::exit(code),
    };
    tracing::info!(addr = %prefs.addr, port = prefs.port, "connected");

    if let Err(e) = prefs.save() {
        tracing::warn!(error = %format!("{:#}", e), "preferences not saved");
        eprintln!("{} {}", "[!]".yellow(), tr("Couldn't write user config file"));
    }

    let code = if cli.command.is_empty() {
        run_dashboard(client)
    } else {
        if cli.interactive {
            println!("{}", tr("Interactive mode ignored since you passed some commands."));
        }
        run_command(&client, &cli.command)
    };
    std::process::exit(code);
}
