//! eppctl CLI entry point.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use epp_core::init_tracing;
use epp_protocol::{TransferDomain, TransferExtension};

use epp_client::cli::{Cli, Command, ConfigAction, ContactAction, DomainAction, PollAction};
use epp_client::config::ClientConfig;
use epp_client::error::{ClientError, ClientResult};
use epp_client::handlers::{self, Report, session::run_in_session};
use epp_client::poll::DrainOptions;
use epp_client::EppClient;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.tracing_config()) {
        eprintln!("warning: failed to initialize logging: {}", e);
    }

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<bool> {
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = if cli.config.is_some() {
        ClientConfig::load_from(&config_path)?
    } else {
        ClientConfig::load()?
    };

    if let Command::Config { ref action } = cli.command {
        match action {
            ConfigAction::Dump => handlers::config::dump(&config, &config_path)?,
            ConfigAction::Validate => handlers::config::validate(&config)?,
            ConfigAction::Path => handlers::config::path(&config_path)?,
        }
        return Ok(true);
    }

    let mut endpoint = config.endpoint(cli.server.as_deref())?;
    if cli.dry_run {
        endpoint = endpoint.with_dry_run(true);
    }
    let mut client = EppClient::connect(endpoint)?;

    let report = dispatch(cli.command, &config, &mut client).await?;
    print(&report);
    Ok(report.success)
}

async fn dispatch(
    command: Command,
    config: &ClientConfig,
    client: &mut EppClient,
) -> ClientResult<Report> {
    match command {
        Command::Hello => Report::ok(&client.hello().await?),
        Command::Login { new_password } => {
            handlers::session::login(client, new_password.as_deref()).await
        }
        Command::Contact { action } => contact(action, config, client).await,
        Command::Domain { action } => domain(action, config, client).await,
        Command::Poll { action } => poll(action, client).await,
        Command::Config { .. } => Ok(Report {
            json: serde_json::Value::Null,
            success: true,
        }),
    }
}

async fn contact(
    action: ContactAction,
    config: &ClientConfig,
    client: &mut EppClient,
) -> ClientResult<Report> {
    match action {
        ContactAction::Check { handles } => {
            run_in_session(client, |c| {
                Box::pin(async move { Report::command(&c.contacts_check(&handles).await?) })
            })
            .await
        }
        ContactAction::Create { fixture } => {
            let contact = config.contact_fixture(&fixture).ok_or_else(|| {
                ClientError::config(format!("no contact fixture `{}`", fixture))
            })?;
            run_in_session(client, |c| {
                Box::pin(async move { Report::command(&c.contact_create(&contact).await?) })
            })
            .await
        }
        ContactAction::Info { handle } => {
            run_in_session(client, |c| {
                Box::pin(async move { Report::command(&c.contact_info(&handle).await?) })
            })
            .await
        }
        ContactAction::Delete { handle } => {
            run_in_session(client, |c| {
                Box::pin(async move { Report::command(&c.contact_delete(&handle).await?) })
            })
            .await
        }
    }
}

async fn domain(
    action: DomainAction,
    config: &ClientConfig,
    client: &mut EppClient,
) -> ClientResult<Report> {
    match action {
        DomainAction::Check { names } => {
            run_in_session(client, |c| {
                Box::pin(async move { Report::command(&c.domains_check(&names).await?) })
            })
            .await
        }
        DomainAction::Create { fixture } => {
            let domain = config.domain_fixture(&fixture).cloned().ok_or_else(|| {
                ClientError::config(format!("no domain fixture `{}`", fixture))
            })?;
            run_in_session(client, |c| {
                Box::pin(async move { Report::command(&c.domain_create(&domain).await?) })
            })
            .await
        }
        DomainAction::Info { name, auth_info } => {
            run_in_session(client, |c| {
                Box::pin(async move {
                    Report::command(&c.domain_info(&name, auth_info.as_deref()).await?)
                })
            })
            .await
        }
        DomainAction::Delete { name } => {
            run_in_session(client, |c| {
                Box::pin(async move { Report::command(&c.domain_delete(&name).await?) })
            })
            .await
        }
        DomainAction::Transfer {
            name,
            op,
            auth_info,
            new_registrant,
            new_auth_info,
        } => {
            let domain = TransferDomain { name, auth_info };
            let extension = new_registrant.map(|new_registrant| TransferExtension {
                new_registrant,
                new_auth_info,
            });
            run_in_session(client, |c| {
                Box::pin(async move {
                    Report::command(
                        &c.domain_transfer(&domain, &op, extension.as_ref())
                            .await?,
                    )
                })
            })
            .await
        }
    }
}

async fn poll(action: PollAction, client: &mut EppClient) -> ClientResult<Report> {
    match action {
        PollAction::Check => {
            run_in_session(client, |c| {
                Box::pin(async move {
                    match c.poll_check().await? {
                        Some(outcome) => Ok(Report {
                            success: outcome.request.is_success()
                                && outcome.ack.as_ref().is_none_or(|ack| ack.is_success()),
                            json: serde_json::to_value(&outcome)?,
                        }),
                        None => Report::ok(&serde_json::Value::Null),
                    }
                })
            })
            .await
        }
        PollAction::Drain {
            max,
            delay_ms,
            timeout,
        } => {
            let mut options = DrainOptions::default()
                .with_max_messages(max)
                .with_delay(Duration::from_millis(delay_ms));
            if let Some(secs) = timeout {
                options = options.with_timeout(Duration::from_secs(secs));
            }
            run_in_session(client, |c| {
                Box::pin(async move { Report::ok(&c.drain_queue(options).await?) })
            })
            .await
        }
    }
}

fn print(report: &Report) {
    match serde_json::to_string_pretty(&report.json) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", report.json),
    }
}
