use std::collections::BTreeMap;
use std::sync::Arc;

use compass_coach::catalog::QUESTIONS;
use compass_coach::config::{APP_NAME, AppConfig, PRICE_MYR};
use compass_coach::engine::WizardEngine;
use compass_coach::error::Error;
use compass_coach::notify::Mailer;
use compass_coach::referral::{NoReferral, ReferralSource, UrlReferral};
use compass_coach::report::REPORT_FILE_NAME;
use compass_coach::session::{Action, Answer, Referral, Session, Stage};
use compass_coach::store::CsvLeadStore;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env();
    let engine = WizardEngine::new(
        Arc::new(CsvLeadStore::new(config.leads_path.clone())),
        Mailer::new(config.mail.clone()),
    );

    // Attribution comes from an entry URL passed as the first argument,
    // e.g. "https://host/?ref=partner&utm_source=newsletter".
    let referral = capture_referral();
    let mut session = Session::new(referral);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match session.stage {
            Stage::Landing => {
                println!("\n🧭 {APP_NAME}");
                println!("Get a personalized Compass Report for your business. RM{PRICE_MYR}.");
                if session.referral.is_attributed() {
                    println!("Referral: {:?}", session.referral);
                }
                println!("(In this demo, payment is simulated.)");
                let input = prompt(&mut lines, "Press Enter to start the diagnostic, or 'q' to quit: ").await?;
                if input.eq_ignore_ascii_case("q") {
                    return Ok(());
                }
                apply(&engine, &mut session, Action::Start).await;
            }

            Stage::Pay => {
                println!("\n💳 Payment");
                println!("This demo simulates payment of RM{PRICE_MYR}.");
                if !config.stripe_publishable_key.is_empty() {
                    println!("Stripe test mode enabled. (Real checkout not wired in this demo.)");
                } else {
                    println!("Stripe keys not set; using demo mode.");
                }
                prompt(&mut lines, "Press Enter to simulate payment: ").await?;
                apply(&engine, &mut session, Action::ConfirmPayment).await;
            }

            Stage::Auth => {
                println!("\n👤 Sign up / Log in");
                let email = prompt(&mut lines, "Email: ").await?;
                let full_name = prompt(&mut lines, "Full Name: ").await?;
                let phone = prompt(&mut lines, "Phone: ").await?;
                let password = prompt(&mut lines, "Password: ").await?;
                apply(
                    &engine,
                    &mut session,
                    Action::SubmitIdentity { email, full_name, phone, password },
                )
                .await;
            }

            Stage::Survey => {
                println!("\n🗂️ Business Compass – Answer a few questions");
                println!("Rate each area from 1 (low) to 5 (high), and add notes if needed.");
                let mut answers = BTreeMap::new();
                for q in &QUESTIONS {
                    let score = prompt_score(&mut lines, q.label).await?;
                    let note = prompt(&mut lines, &format!("Notes – {}: ", q.label)).await?;
                    answers.insert(q.key.to_string(), Answer { score, note });
                }
                apply(&engine, &mut session, Action::SubmitAnswers(answers)).await;
            }

            Stage::Report => {
                println!("\n📄 Your Compass Report");
                let pdf = match engine.report_bytes(&mut session) {
                    Ok(pdf) => pdf,
                    Err(e) => {
                        // Broken survey invariant; nothing sensible to render.
                        anyhow::bail!("report generation failed: {e}");
                    }
                };
                tokio::fs::write(REPORT_FILE_NAME, &pdf).await?;
                println!("Report generated! Saved as {REPORT_FILE_NAME}.");

                let mut emailed = false;
                let answer = prompt(&mut lines, "Email you the report? [y/N]: ").await?;
                if answer.eq_ignore_ascii_case("y") {
                    let outcome = engine.email_report(&mut session).await?;
                    println!("{}", outcome.message);
                    emailed = outcome.sent;
                }

                println!("Next step: book your AI Coaching call → {}", config.booking_url);
                prompt(&mut lines, "Press Enter to finish: ").await?;
                apply(&engine, &mut session, Action::Finish { emailed }).await;
            }

            Stage::Done => {
                println!("\n✅ All set!");
                println!("Thank you. Your responses were saved. We’ll see you on the call.");
                let input = prompt(&mut lines, "Type 'r' to start over, anything else to exit: ").await?;
                if input.eq_ignore_ascii_case("r") {
                    let referral = capture_referral();
                    apply(&engine, &mut session, Action::StartOver { referral }).await;
                } else {
                    return Ok(());
                }
            }
        }
    }
}

fn capture_referral() -> Referral {
    match std::env::args().nth(1) {
        Some(entry) => match UrlReferral::parse(&entry) {
            Ok(source) => source.referral(),
            Err(e) => {
                tracing::warn!("ignoring unparseable entry URL: {e}");
                NoReferral.referral()
            }
        },
        None => NoReferral.referral(),
    }
}

/// Apply an action; validation errors are shown and leave the stage as-is.
async fn apply(engine: &WizardEngine, session: &mut Session, action: Action) {
    if let Err(Error::Session(e)) = engine.apply(session, action).await {
        println!("⚠️  {e}");
    }
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, label: &str) -> anyhow::Result<String> {
    use std::io::Write;
    print!("{label}");
    std::io::stdout().flush()?;
    match lines.next_line().await? {
        Some(line) => Ok(line.trim().to_string()),
        None => anyhow::bail!("stdin closed"),
    }
}

async fn prompt_score(lines: &mut Lines<BufReader<Stdin>>, label: &str) -> anyhow::Result<u8> {
    loop {
        let input = prompt(lines, &format!("{label} [1-5, default 3]: ")).await?;
        if input.is_empty() {
            return Ok(3);
        }
        match input.parse::<u8>() {
            Ok(score @ 1..=5) => return Ok(score),
            _ => println!("Please enter a number from 1 to 5."),
        }
    }
}
