// UI layer: interactive terminal flows built on `dialoguer`. Each flow owns
// the prompting and printing; state and requests go through the booking,
// profile and session modules so nothing here decides behavior.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use crossterm::style::Stylize;
use dialoguer::{Confirm, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use crate::api::ApiClient;
use crate::booking::BookingScreen;
use crate::config::AppConfig;
use crate::confirmation::Confirmation;
use crate::error::{ProfileError, SessionError};
use crate::models::SessionRequest;
use crate::profile::{Focus, ProfileField, ProfileScreen};
use crate::session::Session;
use crate::slots::HourSlot;

/// Main menu. Runs until the user picks "Exit".
pub fn main_menu(mut api: ApiClient, config: &AppConfig) -> Result<()> {
    let mut session = match Session::load(&config.session_file) {
        Ok(session) => session,
        Err(err) => {
            warn!(error = %err, "ignoring unreadable session file");
            None
        }
    };
    if let Some(s) = &session {
        api.set_token(&s.token);
        println!("Welcome back {}!", s.user.name);
    }

    loop {
        let signed_in = session.is_some();
        let items = if signed_in {
            vec![
                "Book appointment",
                "Edit profile",
                "Change avatar",
                "Sign out",
                "Exit",
            ]
        } else {
            vec!["Sign in", "Exit"]
        };
        let selection = Select::new().items(&items).default(0).interact()?;

        match (signed_in, items[selection]) {
            (_, "Exit") => break,
            (false, _) => {
                if let Some(s) = handle_sign_in(&api)? {
                    api.set_token(&s.token);
                    if let Err(err) = s.save(&config.session_file) {
                        warn!(error = %err, "could not persist session");
                    }
                    session = Some(s);
                }
            }
            (true, "Sign out") => {
                api.clear_token();
                session = None;
                Session::forget(&config.session_file).context("Removing session file")?;
                println!("Signed out.");
            }
            (true, choice) => {
                let Some(s) = session.as_mut() else { continue };
                match choice {
                    "Book appointment" => handle_booking(&api)?,
                    "Edit profile" => handle_profile(&api, s)?,
                    "Change avatar" => handle_avatar(&api, s)?,
                    _ => {}
                }
                if let Err(err) = s.save(&config.session_file) {
                    warn!(error = %err, "could not persist session");
                }
            }
        }
    }
    Ok(())
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn handle_sign_in(api: &ApiClient) -> Result<Option<Session>> {
    let email: String = Input::new().with_prompt("E-mail").interact_text()?;
    let password: String = Password::new().with_prompt("Password").interact()?;
    let req = SessionRequest { email, password };

    let pb = spinner("Signing in...");
    let result = api.sign_in(&req).map_err(SessionError::SignIn);
    pb.finish_and_clear();

    match result {
        Ok(resp) => {
            println!("Welcome {}!", resp.user.name);
            Ok(Some(resp.into()))
        }
        Err(e) => {
            println!("{}", e);
            Ok(None)
        }
    }
}

fn handle_booking(api: &ApiClient) -> Result<()> {
    let today = Local::now().date_naive();
    let mut screen = BookingScreen::new(api, String::new(), today);

    let pb = spinner("Loading providers...");
    let providers = screen.load_providers().map(|p| p.to_vec());
    pb.finish_and_clear();
    let providers = match providers {
        Ok(p) if !p.is_empty() => p,
        Ok(_) => {
            println!("No providers available.");
            return Ok(());
        }
        Err(e) => {
            println!("{}", e);
            return Ok(());
        }
    };

    let names: Vec<&str> = providers.iter().map(|p| p.name.as_str()).collect();
    let idx = Select::new()
        .with_prompt("Provider")
        .items(&names)
        .default(0)
        .interact()?;
    report(screen.select_provider(&providers[idx].id));

    loop {
        print_schedule(&screen);
        let actions = [
            "Choose hour",
            "Choose another date",
            "Choose another provider",
            "Book",
            "Back",
        ];
        let action = Select::new().items(&actions).default(0).interact()?;
        match action {
            0 => {
                let open: Vec<&HourSlot> =
                    screen.periods().iter().filter(|s| s.available).collect();
                if open.is_empty() {
                    println!("No free hours on this day.");
                    continue;
                }
                let labels: Vec<&str> = open.iter().map(|s| s.label.as_str()).collect();
                let pick = Select::new().with_prompt("Hour").items(&labels).interact()?;
                report(screen.select_hour(open[pick].hour));
            }
            1 => {
                let date = prompt_date(screen.selection().date())?;
                report(screen.select_date(date));
            }
            2 => {
                let current = providers
                    .iter()
                    .position(|p| p.id == screen.selection().provider_id())
                    .unwrap_or(0);
                let idx = Select::new()
                    .with_prompt("Provider")
                    .items(&names)
                    .default(current)
                    .interact()?;
                report(screen.select_provider(&providers[idx].id));
            }
            3 => {
                let pb = spinner("Booking...");
                let result = screen.submit();
                pb.finish_and_clear();
                match result {
                    Ok(Some(confirmation)) => {
                        show_confirmation(&confirmation)?;
                        return Ok(());
                    }
                    Ok(None) => {}
                    Err(e) => println!("{}", e),
                }
            }
            _ => return Ok(()),
        }
    }
}

fn report<E: std::fmt::Display>(result: std::result::Result<(), E>) {
    if let Err(e) = result {
        println!("{}", e);
    }
}

fn prompt_date(current: NaiveDate) -> Result<NaiveDate> {
    loop {
        let raw: String = Input::new()
            .with_prompt("Date (YYYY-MM-DD)")
            .default(current.format("%Y-%m-%d").to_string())
            .interact_text()?;
        match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) => return Ok(date),
            Err(_) => println!("{:?} is not a date", raw),
        }
    }
}

fn print_schedule<A: crate::api::BookingApi>(screen: &BookingScreen<'_, A>) {
    let selection = screen.selection();
    println!();
    println!("{}", selection.date().format("%A, %B %-d").to_string().bold());
    let periods = screen.periods();
    if !screen.availability_is_current() {
        println!("  {}", "hours below are from the previous search".dark_grey());
    }
    if periods.is_empty() {
        println!("  no hours reported for this day");
        return;
    }
    for (title, slots) in [("Morning", &periods.morning), ("Afternoon", &periods.afternoon)] {
        let line: Vec<String> = slots
            .iter()
            .map(|slot| {
                if selection.hour() == Some(slot.hour) {
                    format!("[{}]", slot.label).yellow().bold().to_string()
                } else if slot.available {
                    slot.label.as_str().green().to_string()
                } else {
                    slot.label.as_str().dark_grey().to_string()
                }
            })
            .collect();
        println!("  {:<10} {}", title, line.join("  "));
    }
}

fn show_confirmation(confirmation: &Confirmation) -> Result<()> {
    println!();
    println!("{} {}", "✔".green(), confirmation.title().bold());
    println!("  {}", confirmation.describe());
    Confirm::new().with_prompt("OK").default(true).interact()?;
    Ok(())
}

fn handle_profile(api: &ApiClient, session: &mut Session) -> Result<()> {
    let mut screen = ProfileScreen::new(api, session);
    let mut form = screen.initial_form();

    loop {
        let mut focus = Focus::Field(ProfileField::Name);
        while let Focus::Field(field) = focus {
            let value: String = if field.is_secret() {
                Password::new()
                    .with_prompt(field.prompt())
                    .allow_empty_password(true)
                    .interact()?
            } else {
                Input::new()
                    .with_prompt(field.prompt())
                    .default(form.field(field).to_string())
                    .allow_empty(true)
                    .interact_text()?
            };
            *form.field_mut(field) = value;
            focus = field.focus_next();
        }

        let pb = spinner("Saving...");
        let result = screen.submit(form.clone());
        pb.finish_and_clear();
        match result {
            Ok(user) => {
                println!("Profile updated, {}.", user.name);
                return Ok(());
            }
            Err(ProfileError::Validation(errors)) => {
                for (field, message) in errors.iter() {
                    println!("  {}: {}", field.prompt(), message.red());
                }
                if !Confirm::new().with_prompt("Fix and try again?").default(true).interact()? {
                    return Ok(());
                }
            }
            Err(e) => {
                println!("{}", e);
                return Ok(());
            }
        }
    }
}

fn handle_avatar(api: &ApiClient, session: &mut Session) -> Result<()> {
    let raw: String = Input::new()
        .with_prompt("Image file path (empty to cancel)")
        .allow_empty(true)
        .interact_text()?;
    let path = Some(raw.trim()).filter(|p| !p.is_empty()).map(PathBuf::from);

    let mut screen = ProfileScreen::new(api, session);
    let pb = spinner("Uploading...");
    let result = screen.change_avatar(path.as_deref());
    pb.finish_and_clear();
    match result {
        Ok(Some(_)) => println!("Avatar updated."),
        Ok(None) => {}
        Err(e) => println!("{}", e),
    }
    Ok(())
}
