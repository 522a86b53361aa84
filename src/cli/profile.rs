use dialoguer::{Confirm, Input, theme::ColorfulTheme};

use super::Context;
use crate::error::AppError;
use crate::vault::profile::{UserProfile, mask, split_list};
use crate::vault::{Vault, VaultMode};

pub fn collect(ctx: &Context) -> anyhow::Result<()> {
    let theme = ColorfulTheme::default();
    let vault = Vault::open(&ctx.data_dir);
    if vault.has_profile()
        && !Confirm::with_theme(&theme)
            .with_prompt("A profile is already stored. Replace it?")
            .default(false)
            .interact()?
    {
        return Ok(());
    }
    println!("\nYour details are used to fill in opt-out requests and never leave this machine.\n");

    let full_name: String = Input::with_theme(&theme)
        .with_prompt("Full name")
        .validate_with(|s: &String| {
            if s.trim().is_empty() {
                Err("full name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let ask = |prompt: &str| -> anyhow::Result<Vec<String>> {
        let answer: String = Input::with_theme(&theme)
            .with_prompt(format!("{prompt} (comma-separated, optional)"))
            .allow_empty(true)
            .interact_text()?;
        Ok(split_list(&answer))
    };

    let profile = UserProfile {
        full_name: full_name.trim().to_string(),
        emails: ask("Email addresses")?,
        usernames: ask("Usernames")?,
        phone_numbers: ask("Phone numbers")?,
        addresses: ask("Postal addresses")?,
    };

    match vault.store(&profile)? {
        VaultMode::Encrypted => println!("🔒 Profile encrypted and saved."),
        VaultMode::Plaintext => println!(
            "⚠️  This build has no encryption support; your profile was saved UNENCRYPTED."
        ),
    }
    Ok(())
}

pub fn show(ctx: &Context) -> anyhow::Result<()> {
    let vault = Vault::open(&ctx.data_dir);
    let profile = match vault.load() {
        Ok(p) => p,
        Err(AppError::NotFound(_)) => {
            println!("No stored profile. Run `data-scrubber profile collect` first.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("Name:      {}", profile.full_name);
    for line in summary_lines(&profile) {
        println!("{line}");
    }
    if vault.mode() == VaultMode::Plaintext {
        println!("\n⚠️  Stored unencrypted at {}", vault.plaintext_path().display());
    }
    Ok(())
}

fn summary_lines(profile: &UserProfile) -> Vec<String> {
    [
        ("Emails:", &profile.emails),
        ("Usernames:", &profile.usernames),
        ("Phones:", &profile.phone_numbers),
        ("Addresses:", &profile.addresses),
    ]
    .into_iter()
    .map(|(label, values)| {
        let shown = if values.is_empty() {
            "-".to_string()
        } else {
            values.iter().map(|v| mask(v)).collect::<Vec<_>>().join(", ")
        };
        format!("{label:<10} {shown}")
    })
    .collect()
}
