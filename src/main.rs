use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use tokio::io::{AsyncBufReadExt, BufReader};

use fit_onboard::config::AppConfig;
use fit_onboard::onboarding::{
    ActivityLevel, AdvanceOutcome, FitnessGoal, FlowSnapshot, LaunchRoute, LaunchRouter,
    OnboardingController, OnboardingStep,
};
use fit_onboard::store::{Database, LibSqlBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let db: Arc<dyn Database> = Arc::new(
        LibSqlBackend::new_local(&config.db_path)
            .await
            .with_context(|| format!("Failed to open database at {}", config.db_path.display()))?,
    );

    let router = LaunchRouter::new(Arc::clone(&db));

    if router.route().await? == LaunchRoute::Onboarding {
        let (done_tx, mut done_rx) = tokio::sync::oneshot::channel();
        let controller = router.onboarding().with_completion(move || {
            let _ = done_tx.send(());
        });

        run_onboarding(&controller).await?;

        if done_rx.try_recv().is_err() {
            eprintln!("Onboarding not finished. Run again to pick up from the start.");
            return Ok(());
        }
        if router.route().await? != LaunchRoute::Summary {
            anyhow::bail!("onboarding completed but the completion flag is not set");
        }
    }

    println!("{}", router.summary().await?.render());
    Ok(())
}

/// Prompt for each step on stdin until the flow completes or input ends.
async fn run_onboarding(controller: &OnboardingController) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let snap = controller.snapshot().await;
        if snap.step.is_terminal() {
            return Ok(());
        }
        print_prompt(&snap);

        let Some(line) = lines.next_line().await? else {
            return Ok(()); // EOF
        };
        let input = line.trim();

        match input {
            "/quit" => return Ok(()),
            "/back" => {
                if controller.go_back().await.is_none() {
                    eprintln!("Already at the first step.");
                }
                continue;
            }
            _ => {}
        }

        if let Err(msg) = apply_input(controller, snap.step, input).await {
            eprintln!("{msg}");
            continue;
        }

        match controller.advance().await {
            Ok(AdvanceOutcome::Moved { .. }) => {}
            Ok(AdvanceOutcome::Blocked(step)) => eprintln!("{}", blocked_hint(step)),
            Ok(AdvanceOutcome::Completed(_)) => return Ok(()),
            Err(e) => eprintln!("Could not save your profile: {e}. Press Enter to try again."),
        }
    }
}

fn print_prompt(snap: &FlowSnapshot) {
    println!("\n[{}] {}", snap.title, snap.step.prompt());
    match snap.step {
        OnboardingStep::Name => {
            if !snap.draft.name.is_empty() {
                println!("  (current: {})", snap.draft.name);
            }
        }
        OnboardingStep::Goal => {
            for (i, goal) in FitnessGoal::ALL.iter().enumerate() {
                let mark = if *goal == snap.draft.fitness_goal { '*' } else { ' ' };
                println!(" {mark}{}. {goal}", i + 1);
            }
        }
        OnboardingStep::DateOfBirth => {
            println!("  YYYY-MM-DD (current: {})", snap.draft.date_of_birth);
        }
        OnboardingStep::Activity => {
            for (i, level) in ActivityLevel::ALL.iter().enumerate() {
                let mark = if *level == snap.draft.activity_level { '*' } else { ' ' };
                println!(" {mark}{}. {level}", i + 1);
            }
        }
        OnboardingStep::Terms => {
            let current = if snap.draft.agreed_to_terms { "yes" } else { "no" };
            println!("  y/n (current: {current})");
        }
        OnboardingStep::Complete => {}
    }
    println!("  Enter to continue, /back to go back, /quit to stop.");
}

/// Write one line of input into the draft field owned by `step`. Empty input
/// keeps the current value, except on the name step.
async fn apply_input(
    controller: &OnboardingController,
    step: OnboardingStep,
    input: &str,
) -> Result<(), String> {
    match step {
        OnboardingStep::Name => {
            let name = input.to_string();
            controller.edit(|d| d.set_name(name)).await;
        }
        OnboardingStep::Goal if !input.is_empty() => {
            let goal = pick(&FitnessGoal::ALL, input)?;
            controller.edit(|d| d.set_fitness_goal(goal)).await;
        }
        OnboardingStep::DateOfBirth if !input.is_empty() => {
            let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .map_err(|_| format!("Not a date: {input} (expected YYYY-MM-DD)"))?;
            controller.edit(|d| d.set_date_of_birth(date)).await;
        }
        OnboardingStep::Activity if !input.is_empty() => {
            let level = pick(&ActivityLevel::ALL, input)?;
            controller.edit(|d| d.set_activity_level(level)).await;
        }
        OnboardingStep::Terms if !input.is_empty() => {
            let agreed = match input.to_ascii_lowercase().as_str() {
                "y" | "yes" => true,
                "n" | "no" => false,
                _ => return Err(format!("Please answer y or n, not {input}")),
            };
            controller.edit(|d| d.set_agreed_to_terms(agreed)).await;
        }
        _ => {}
    }
    Ok(())
}

/// Accept a 1-based menu number or anything the type parses from.
fn pick<T>(options: &[T], input: &str) -> Result<T, String>
where
    T: Copy + std::str::FromStr<Err = String>,
{
    if let Ok(n) = input.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| options.get(i).copied())
            .ok_or_else(|| format!("Choose a number between 1 and {}", options.len()));
    }
    input.parse::<T>()
}

fn blocked_hint(step: OnboardingStep) -> &'static str {
    match step {
        OnboardingStep::Name => "Please enter your name.",
        OnboardingStep::DateOfBirth => "You must be at least 13 years old.",
        OnboardingStep::Terms => "You must agree to the terms to continue.",
        _ => "Cannot continue yet.",
    }
}
