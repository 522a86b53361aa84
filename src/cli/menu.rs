use dialoguer::{Input, theme::ColorfulTheme};

use super::{Context, broker, services, show_quote};
use crate::services::ServiceSelection;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    View,
    Open,
    Add,
    Quote,
    Exit,
}

const MENU: [(MenuChoice, &str); 5] = [
    (MenuChoice::View, "View data brokers"),
    (MenuChoice::Open, "Launch an opt-out link"),
    (MenuChoice::Add, "Add a data broker"),
    (MenuChoice::Quote, "Motivational quote"),
    (MenuChoice::Exit, "Exit"),
];

fn parse_choice(input: &str) -> Option<MenuChoice> {
    let n: usize = input.trim().parse().ok()?;
    MENU.get(n.checked_sub(1)?).map(|(c, _)| *c)
}

pub async fn run(ctx: &Context) -> anyhow::Result<()> {
    println!("\n🧽 Welcome to data-scrubber, {}!", ctx.user_name);

    let selection = match ServiceSelection::load(&ctx.services_path())? {
        Some(s) => s,
        None => services::setup(ctx)?,
    };
    let mut session = ctx.open_session(selection)?;
    let quotes = ctx.quotes().await;
    let theme = ColorfulTheme::default();

    loop {
        println!();
        for (i, (_, label)) in MENU.iter().enumerate() {
            println!("  {}. {label}", i + 1);
        }
        let input: String = Input::with_theme(&theme)
            .with_prompt("Choose an option")
            .interact_text()?;

        let Some(choice) = parse_choice(&input) else {
            println!("❌ Please enter a number between 1 and {}.", MENU.len());
            continue;
        };

        match choice {
            MenuChoice::View => broker::list_brokers(&session),
            MenuChoice::Open => match broker::open_broker(&mut session, None) {
                Ok(true) => show_quote(&quotes),
                Ok(false) => {}
                Err(e) => println!("❌ {e:#}"),
            },
            MenuChoice::Add => {
                if let Err(e) = add_interactive(&theme, &mut session) {
                    println!("❌ {e:#}");
                } else {
                    show_quote(&quotes);
                }
            }
            MenuChoice::Quote => show_quote(&quotes),
            MenuChoice::Exit => {
                println!("Goodbye, {}. Every opt-out counts!", ctx.user_name);
                return Ok(());
            }
        }
    }
}

fn add_interactive(theme: &ColorfulTheme, session: &mut Session) -> anyhow::Result<()> {
    let name: String = Input::with_theme(theme)
        .with_prompt("Broker name")
        .interact_text()?;
    let link: String = Input::with_theme(theme)
        .with_prompt("Opt-out link (http...)")
        .interact_text()?;
    broker::add_broker(session, &name, &link)
}

/// Ask for a display name when none was given on the command line.
pub fn prompt_user_name() -> anyhow::Result<String> {
    let name: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("What's your name?")
        .default("Friend".into())
        .interact_text()?;
    Ok(name.trim().to_string())
}
