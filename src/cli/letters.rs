use std::path::PathBuf;

use super::Context;
use crate::error::AppError;
use crate::letters;
use crate::session::Session;
use crate::vault::Vault;

pub fn write_letters(
    ctx: &Context,
    session: &Session,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let profile = match Vault::open(&ctx.data_dir).load() {
        Ok(p) => p,
        Err(AppError::NotFound(_)) => {
            println!("No stored profile. Run `data-scrubber profile collect` first.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let drafts = letters::draft_pending(session, &profile);
    if drafts.is_empty() {
        println!("No pending brokers list an `email` contact; nothing to draft.");
        return Ok(());
    }

    let dir = output.unwrap_or_else(|| ctx.data_dir.join("emails"));
    let written = letters::write_letters(&dir, &drafts)?;
    for (letter, path) in drafts.iter().zip(&written) {
        println!("✉️  {} <{}> -> {}", letter.broker, letter.to, path.display());
    }
    println!("\n{} draft(s) written to {}", written.len(), dir.display());
    Ok(())
}
