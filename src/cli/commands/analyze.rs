use anyhow::Result;
use colored::Colorize;

use crate::cli::ui::render_result;
use crate::client::{ChatBackend, Classifier};
use crate::session::Session;
use crate::shell::Form;
use crate::store::CredentialStore;

pub fn handle(
    classifier: Classifier<impl ChatBackend>,
    store: impl CredentialStore,
    url: &str,
) -> Result<()> {
    let session = Session::load(&store);

    let result = classifier
        .analyze(&session, url)
        .map_err(|e| anyhow::anyhow!("{}: {}", e.title(), e))?;

    let mut form = Form {
        url: url.trim().to_string(),
        ..Default::default()
    };
    form.show(&result);

    println!();
    println!("{}", "=== Analysis Result ===".bold().cyan());
    println!();
    render_result(&form);
    println!();

    Ok(())
}
