use std::path::Path;

use comfy_table::{Cell, Table};
use dialoguer::{Confirm, Input, theme::ColorfulTheme};

use crate::coverage::Labeled;
use crate::error::AppError;
use crate::report::terminal::marker;
use crate::session::{Session, Transition};

pub fn list_brokers(session: &Session) {
    let view = session.view();

    if view.pending.is_empty() && view.handled.is_empty() {
        println!("No brokers yet. Add one with `data-scrubber broker add --name <NAME> --link <URL>`.");
        return;
    }

    println!(
        "\n{}, here's an overview of data-broker sites:",
        session.user_name()
    );
    println!(
        "• Brokers still needing manual opt-out: {}",
        view.pending.len()
    );
    println!("• Already completed / covered: {}\n", view.handled.len());

    if view.pending.is_empty() {
        println!("🎉 No uncovered brokers left!");
    } else {
        println!("👉 Brokers you may want to tackle next:");
        println!("{}", pending_table(&view.pending));
    }

    if !view.handled.is_empty() {
        println!("\n✓ Brokers already handled:");
        let mut table = Table::new();
        table.set_header(vec!["Name", "State", "Covered By"]);
        for l in &view.handled {
            let covered_by = l.record.covered_by.to_string();
            table.add_row(vec![
                Cell::new(&l.record.name),
                Cell::new(marker(l.coverage)),
                Cell::new(if covered_by.is_empty() { "-".to_string() } else { covered_by }),
            ]);
        }
        println!("{table}");
    }
    println!("\nBroker list: {}", session.store().path().display());
}

fn pending_table(pending: &[Labeled<'_>]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Name", "Opt-out Link"]);
    for (idx, l) in pending.iter().enumerate() {
        table.add_row(vec![
            Cell::new(idx),
            Cell::new(&l.record.name),
            Cell::new(&l.record.opt_out_link),
        ]);
    }
    table
}

pub fn add_broker(session: &mut Session, name: &str, link: &str) -> anyhow::Result<()> {
    let id = session.add_broker(name, link)?;
    let record = session.record(id)?;
    if record.covered_by.is_empty() {
        println!("🟡 {} added and marked as Pending.", record.name);
    } else {
        println!(
            "✅ {} added; already covered by {}.",
            record.name, record.covered_by
        );
    }
    Ok(())
}

/// Open a pending broker's opt-out page and ask whether the user finished.
/// Returns `true` if the broker was marked completed.
pub fn open_broker(session: &mut Session, index: Option<usize>) -> anyhow::Result<bool> {
    let pending = session.pending();
    if pending.is_empty() {
        println!(
            "Nice work, {}! There are no remaining brokers.",
            session.user_name()
        );
        return Ok(false);
    }

    let ids: Vec<usize> = pending.iter().map(|l| l.id).collect();
    let choice = match index {
        Some(i) => parse_choice(&i.to_string(), ids.len())?,
        None => {
            println!("{}", pending_table(&pending));
            prompt_choice(ids.len())?
        }
    };

    let record = session.present(ids[choice])?;
    let (name, link) = (record.name.clone(), record.opt_out_link.clone());
    println!("🌐 Opening: {name} – {link}");
    if let Err(e) = webbrowser::open(&link) {
        println!("Could not launch a browser ({e}); open the link above yourself.");
    }

    let done = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Did you complete the opt-out for {name}?"))
        .default(false)
        .interact()?;
    if !done {
        println!("No problem, {name} stays on your list.");
        return Ok(false);
    }

    match session.confirm_completion(ids[choice]) {
        Ok(Transition::Completed) => println!("✅ Marked {name} as complete!"),
        Ok(Transition::AlreadyCompleted) => println!("{name} was already complete."),
        Err(e @ AppError::PermissionDenied { .. }) => {
            println!("⚠️  {name} is marked complete for this session, but saving failed.");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    }
    Ok(true)
}

pub fn export(session: &Session, path: &Path) -> anyhow::Result<()> {
    session.export(path)?;
    println!(
        "Exported {} broker(s) to {}",
        session.records().len(),
        path.display()
    );
    Ok(())
}

fn prompt_choice(len: usize) -> anyhow::Result<usize> {
    loop {
        let input: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Which broker would you like to open? (#)")
            .interact_text()?;
        match parse_choice(&input, len) {
            Ok(choice) => return Ok(choice),
            Err(e) => println!("❌ {e}"),
        }
    }
}

/// Validate a list position typed by the user.
fn parse_choice(input: &str, len: usize) -> Result<usize, AppError> {
    let choice: usize = input.trim().parse().map_err(|_| {
        AppError::InvalidInput("please enter a number shown in the list".into())
    })?;
    if choice >= len {
        return Err(AppError::InvalidInput(format!(
            "pick a number from 0 to {}",
            len.saturating_sub(1)
        )));
    }
    Ok(choice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice(" 2 ", 3).unwrap(), 2);
        assert!(matches!(parse_choice("3", 3), Err(AppError::InvalidInput(_))));
        assert!(matches!(parse_choice("-1", 3), Err(AppError::InvalidInput(_))));
        assert!(matches!(parse_choice("two", 3), Err(AppError::InvalidInput(_))));
        assert!(parse_choice("0", 0).is_err());
    }
}
