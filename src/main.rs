use chrono::Utc;
use clap::Parser;
use jumuia_booking::core::{schedule, search};
use jumuia_booking::utils::error::{BookingError, ErrorCategory};
use jumuia_booking::utils::{logger, validation::Validate};
use jumuia_booking::{
    AppConfig, AppState, CliConfig, Command, ConfigProvider, DocumentStore, FirestoreStore,
    LocalConvention, MemoryStore, NoticeLevel, Reservation, ReservationRequest, ReservationService, StoreKind,
    Sweeper,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting jumuia-booking");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file is valid TOML");
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let outcome = match config.store.kind {
        StoreKind::Firestore => {
            let store = FirestoreStore::new(config.firestore_settings())?;
            run(store, &config, cli.command).await
        }
        StoreKind::Memory => {
            let store = MemoryStore::new();
            store
                .seed_names(config.groups_collection(), config.memory.groups.clone())
                .await;
            store
                .seed_names(config.rooms_collection(), config.memory.rooms.clone())
                .await;
            run(store, &config, cli.command).await
        }
    };

    if let Err(e) = outcome {
        // 驗證錯誤是使用者輸入問題，不記成系統錯誤
        if !e.is_validation() {
            tracing::error!("❌ {} (Category: {:?})", e, e.category());
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        }
        if let Some(message) = user_message(&e) {
            eprintln!("❌ {}", message);
        }

        let exit_code = match e.category() {
            ErrorCategory::Configuration => 1,
            ErrorCategory::Validation => 2,
            ErrorCategory::Store => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

/// 驗證錯誤已經以通知印出，不再重複
fn user_message(e: &BookingError) -> Option<String> {
    if e.is_validation() {
        None
    } else {
        Some(e.user_friendly_message())
    }
}

fn load_config(path: &str) -> jumuia_booking::Result<AppConfig> {
    if Path::new(path).exists() {
        tracing::info!("📁 Loading configuration from: {}", path);
        AppConfig::from_file(path)
    } else {
        tracing::info!("No configuration file at {}, using defaults", path);
        AppConfig::from_toml_str("")
    }
}

async fn run<S>(store: S, config: &AppConfig, command: Command) -> jumuia_booking::Result<()>
where
    S: DocumentStore + 'static,
{
    let service = ReservationService::new(store, config);
    let convention = service.local_convention();

    match command {
        Command::Groups => {
            let names = service
                .fetch_reference_list(&service.collections().groups)
                .await?;
            names.iter().for_each(|name| println!("{}", name));
        }
        Command::Rooms => {
            let names = service
                .fetch_reference_list(&service.collections().rooms)
                .await?;
            names.iter().for_each(|name| println!("{}", name));
        }
        Command::List { search } => {
            let reservations = service.fetch_reservations().await?;
            print_reservations(&reservations, &search, convention);
        }
        Command::Slots => {
            schedule::generate_time_slots(convention.hour_at(Utc::now()))
                .iter()
                .for_each(|slot| println!("{}", slot));
        }
        Command::Reserve {
            group,
            date,
            time,
            room,
        } => {
            let mut state = AppState::new();
            service.initialize(&mut state, Utc::now()).await;
            warn_unknown(&state.group_names, &group, "group");
            warn_unknown(&state.room_names, &room, "room");

            let request = ReservationRequest::new(group, date, time, room);
            let result = service
                .submit_reservation(&mut state, &request, Utc::now())
                .await;
            print_notices(&mut state);
            result?;
        }
        Command::Sweep => {
            let report = service.sweep_expired(Utc::now()).await?;
            println!(
                "🧹 Removed {} of {} expired reservations",
                report.deleted.len(),
                report.matched
            );
            for (id, e) in &report.failed {
                eprintln!("⚠️ Could not delete {}: {}", id, e);
            }
        }
        Command::Watch { search } => {
            let mut state = AppState::new();
            service.initialize(&mut state, Utc::now()).await;
            print_notices(&mut state);
            print_reservations(&state.reservations, &search, convention);

            let service = Arc::new(service);
            let state = Arc::new(Mutex::new(state));
            let handle = Sweeper::spawn(service, state.clone(), config.sweep_interval());
            let mut sweeps = handle.subscribe();

            tracing::info!(
                "🔍 Sweeping every {:?}, press Ctrl-C to stop",
                config.sweep_interval()
            );
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    changed = sweeps.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let mut guard = state.lock().await;
                        print_notices(&mut guard);
                        print_reservations(&guard.reservations, &search, convention);
                    }
                }
            }

            handle.shutdown().await;
            tracing::info!("Stopped");
        }
    }

    Ok(())
}

fn warn_unknown(known: &[String], value: &str, what: &str) {
    if !known.is_empty() && !known.iter().any(|k| k == value) {
        tracing::warn!("⚠️ '{}' is not a known {}", value, what);
    }
}

fn print_notices(state: &mut AppState) {
    for notice in state.take_notices() {
        match notice.level {
            NoticeLevel::Success => println!("✅ {}", notice.message),
            NoticeLevel::Warning => eprintln!("⚠️ {}", notice.message),
            NoticeLevel::Error => eprintln!("❌ {}", notice.message),
        }
    }
}

fn print_reservations(reservations: &[Reservation], query: &str, convention: LocalConvention) {
    let found = search::filter_reservations(reservations, query);
    if found.is_empty() {
        println!("No reservations found.");
        return;
    }
    for r in found {
        println!(
            "{} - {} - Room {}",
            r.name,
            convention.format_local(r.reservation_time, "%Y-%m-%d %H:%M"),
            r.room
        );
    }
}
