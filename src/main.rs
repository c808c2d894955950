use inner_companion::cli::{handle_line, LineOutcome, GREETING};
use inner_companion::{build_session, logging, Config};
use std::error::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?;

    if let Err(e) = logging::init_logging(&config.log_dir) {
        eprintln!("Failed to initialize logging: {}", e);
    }
    let _ = logging::cleanup_old_logs();

    let mut session = build_session(&config)?;
    println!("{}\n", GREETING);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match handle_line(&mut session, &line).await {
            LineOutcome::Print(text) => println!("{}", text),
            LineOutcome::Failed(text) => eprintln!("{}", text),
            LineOutcome::Silent => {}
            LineOutcome::Quit => break,
        }
    }

    logging::log_session(Some(&config.user_id), &format!(
        "Session ended after {} turns",
        session.turn_count()
    ));
    Ok(())
}
