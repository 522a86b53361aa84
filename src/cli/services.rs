use dialoguer::{Confirm, MultiSelect, theme::ColorfulTheme};

use super::Context;
use crate::config::{self, FREE_SERVICES, PAID_SERVICES};
use crate::services::{ServiceKind, ServiceSelection};

/// Ask which paid services and free helpers the user relies on, then save.
pub fn setup(ctx: &Context) -> anyhow::Result<ServiceSelection> {
    let theme = ColorfulTheme::default();
    println!(
        "\n{}, let's set up your removal support options.\n",
        ctx.user_name
    );

    let paid = if Confirm::with_theme(&theme)
        .with_prompt("Do you use any paid data-removal services?")
        .default(false)
        .interact()?
    {
        MultiSelect::with_theme(&theme)
            .with_prompt("Select the ones you use (space to toggle, enter to confirm)")
            .items(PAID_SERVICES)
            .interact()?
    } else {
        Vec::new()
    };

    let free_names: Vec<&str> = FREE_SERVICES.iter().map(|(name, _)| *name).collect();
    let free = MultiSelect::with_theme(&theme)
        .with_prompt("Include free helper sites?")
        .items(&free_names)
        .interact()?;

    let selection = selection_from_choices(&paid, &free);
    selection.save(&ctx.services_path())?;
    println!(
        "\nThank you, {}! We'll use these services to guide your opt-outs:",
        ctx.user_name
    );
    print_selection(&selection);
    Ok(selection)
}

fn selection_from_choices(paid: &[usize], free: &[usize]) -> ServiceSelection {
    ServiceSelection::new(
        paid.iter().filter_map(|&i| PAID_SERVICES.get(i).copied()),
        free.iter().filter_map(|&i| FREE_SERVICES.get(i).map(|(n, _)| *n)),
    )
}

pub fn list(ctx: &Context) -> anyhow::Result<()> {
    let selection = ctx.services()?;
    print_selection(&selection);
    Ok(())
}

pub fn add(ctx: &Context, name: &str, free: bool) -> anyhow::Result<()> {
    let path = ctx.services_path();
    let mut selection = ServiceSelection::load(&path)?.unwrap_or_default();
    let kind = if free { ServiceKind::Free } else { ServiceKind::Paid };

    if selection.insert(kind, name.to_string()) {
        selection.save(&path)?;
        println!("Added {name}.");
    } else {
        println!("{name} is already selected.");
    }
    Ok(())
}

pub fn remove(ctx: &Context, name: &str) -> anyhow::Result<()> {
    let path = ctx.services_path();
    let mut selection = ServiceSelection::load(&path)?.unwrap_or_default();

    if selection.remove(name) {
        selection.save(&path)?;
        println!("Removed {name}.");
    } else {
        anyhow::bail!("'{}' is not one of your services", name);
    }
    Ok(())
}

/// Open the landing page of every selected free helper we know a URL for.
pub fn open_helpers(ctx: &Context) -> anyhow::Result<()> {
    let selection = ctx.services()?;
    let mut opened = 0usize;
    for name in &selection.free_services {
        match config::free_service_url(name) {
            Some(url) => {
                println!("Opening {name}: {url}");
                if let Err(e) = webbrowser::open(url) {
                    println!("  Could not launch a browser ({e}); visit the link above.");
                }
                opened += 1;
            }
            None => println!("No known site for {name}, skipping."),
        }
    }
    if opened == 0 {
        println!("No free helpers selected. Run `data-scrubber setup` to pick some.");
    }
    Ok(())
}

pub fn print_selection(selection: &ServiceSelection) {
    let show = |list: &[String]| {
        if list.is_empty() {
            "None".to_string()
        } else {
            list.join(", ")
        }
    };
    println!("🛡️  Paid services:  {}", show(selection.paid_services.as_slice()));
    println!("🛡️  Free helpers:   {}", show(selection.free_services.as_slice()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_from_choices_ignores_out_of_range() {
        let sel = selection_from_choices(&[4, 0, 9], &[1]);
        assert_eq!(sel.paid_services, ["OneRep", "Incogni"]);
        assert_eq!(sel.free_services, ["JustDeleteMe"]);
    }
}
