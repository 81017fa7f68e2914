//! `calypshome login`: verify credentials with a fresh session.

use serde::Serialize;

use calypshome_api::CalypshomeClient;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct LoginReport<'a> {
    base_url: &'a str,
    username: &'a str,
    authenticated: bool,
}

pub async fn handle(client: &CalypshomeClient, global: &GlobalOpts) -> Result<(), CliError> {
    client.login().await?;

    let report = LoginReport {
        base_url: client.base_url().as_str(),
        username: client.session().credentials().username(),
        authenticated: true,
    };

    let out = output::render_single(
        &global.output,
        &report,
        |r| format!("Logged in to {} as {}", r.base_url, r.username),
        |r| r.username.to_owned(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
