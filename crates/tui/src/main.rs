use color_eyre::eyre::WrapErr;
use ratatui::crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use ratatui::crossterm::execute;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use zapdesk::app::App;
use zapdesk::company::FileCompanyStore;
use zapdesk::config::{self, Config};
use zapdesk::logging;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let config_path = config::config_path();
    let mut config = Config::load_or_default(&config_path);
    config.apply_env_overrides();
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("{e:#}"))
        .wrap_err_with(|| format!("invalid configuration in {}", config_path.display()))?;

    let data_dir = config::data_dir();
    if let Err(e) = logging::init(&data_dir) {
        eprintln!("Logging disabled: {e:#}");
    }

    let rt = tokio::runtime::Runtime::new()?;
    let store = Arc::new(FileCompanyStore::new(
        config.companies_file(),
        config.company.default_name.clone(),
    ));
    let mut app = App::new(config, store, &data_dir);

    let mut terminal = ratatui::init();
    execute!(io::stdout(), EnableMouseCapture)?;

    let result = run(&rt, &mut terminal, &mut app);

    app.shutdown();
    let _ = execute!(io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

fn run(
    rt: &tokio::runtime::Runtime,
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
) -> color_eyre::Result<()> {
    // Background tasks spawn onto this runtime from the UI thread.
    let _guard = rt.enter();
    rt.block_on(app.init())
        .map_err(|e| color_eyre::eyre::eyre!("{e:#}"))?;

    loop {
        terminal.draw(|frame| app.render(frame))?;

        if event::poll(Duration::from_millis(50))? {
            let event = event::read()?;
            if matches!(event, Event::Resize(_, _)) {
                continue;
            }
            match app.handle_event(event) {
                Ok(true) => break,
                Ok(false) => {}
                Err(e) => tracing::warn!("Event handling failed: {e:#}"),
            }
        }

        app.process_events();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
